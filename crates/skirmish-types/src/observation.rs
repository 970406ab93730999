//! The per-player, fog-of-war limited view handed to deciders.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Age, BuildingType, PlayerId, UnitType, Zone};
use crate::structs::{LogEntry, PlayerState};

/// What one player can see of one zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ZoneView {
    /// Whether the zone is in the viewer's half or holds one of its units.
    pub visible: bool,
    /// The viewer's own units.
    pub own_units: BTreeMap<UnitType, u32>,
    /// The viewer's own buildings.
    pub own_buildings: Vec<BuildingType>,
    /// Enemy units. Always empty when not visible.
    pub enemy_units: BTreeMap<UnitType, u32>,
    /// Enemy buildings. Always empty when not visible.
    pub enemy_buildings: Vec<BuildingType>,
}

/// Everything a decider is told at the start of its turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Observation {
    /// Current turn.
    pub turn: u32,
    /// Turn limit of the match.
    pub turn_limit: u32,
    /// The acting player.
    pub you: PlayerId,
    /// The acting player's complete state.
    pub own: PlayerState,
    /// Per-zone view in canonical zone order.
    pub zones: BTreeMap<Zone, ZoneView>,
    /// Opponent's age (common knowledge).
    pub opponent_age: Age,
    /// Opponent's town center HP (common knowledge).
    pub opponent_town_center_hp: u32,
    /// Trailing slice of the event log.
    pub recent_events: Vec<LogEntry>,
}

impl Observation {
    /// View of a single zone.
    pub fn zone(&self, zone: Zone) -> Option<&ZoneView> {
        self.zones.get(&zone)
    }
}
