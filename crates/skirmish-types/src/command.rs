//! The sanitized per-turn command.
//!
//! A [`Command`] only ever holds entries that were legal for the acting
//! player when validated. Raw decider output is arbitrary JSON and goes
//! through the validator in `skirmish-sim` before it becomes one of these.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{BuildingType, ResourceKind, UnitType, UpgradeId, Zone};

/// Queue `count` units of one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TrainOrder {
    /// Unit type.
    pub unit: UnitType,
    /// Number of units, at least 1.
    pub count: u32,
}

/// Construct one building in the home zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BuildOrder {
    /// Building type.
    pub building: BuildingType,
}

/// Move units between adjacent zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MoveOrder {
    /// Unit type.
    pub unit: UnitType,
    /// Number of units, at least 1.
    pub count: u32,
    /// Source zone.
    pub from: Zone,
    /// Destination zone, adjacent to `from`.
    pub to: Zone,
}

/// Research one upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResearchOrder {
    /// Upgrade key.
    pub upgrade: UpgradeId,
}

/// A sanitized command with the seven recognised fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Command {
    /// Units to queue.
    pub train: Vec<TrainOrder>,
    /// Buildings to construct.
    pub build: Vec<BuildOrder>,
    /// Unit movements.
    #[serde(rename = "move")]
    pub moves: Vec<MoveOrder>,
    /// Reserved. Combat is implicit from unit presence, so this stays empty.
    pub attack: Vec<serde_json::Value>,
    /// Advance to the next age.
    pub advance_age: bool,
    /// New villager task assignment. Empty keeps the previous one.
    pub task_villagers: BTreeMap<ResourceKind, u32>,
    /// Upgrades to research.
    pub research: Vec<ResearchOrder>,
}

impl Command {
    /// Whether the command does nothing.
    pub fn is_empty(&self) -> bool {
        self.train.is_empty()
            && self.build.is_empty()
            && self.moves.is_empty()
            && !self.advance_age
            && self.task_villagers.is_empty()
            && self.research.is_empty()
    }
}
