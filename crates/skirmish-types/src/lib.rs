//! Shared type definitions for the skirmish simulation.
//!
//! This crate is the single vocabulary used across the workspace: the
//! identifiers a decision-maker may name, the authoritative match state,
//! the sanitized command shape, the per-player observation, and the render
//! snapshot. Types that cross the render boundary derive `ts-rs` so UI
//! collaborators get matching `TypeScript` definitions.
//!
//! # Modules
//!
//! - [`ids`] -- [`MatchId`], a UUID v7 wrapper identifying one match session
//! - [`enums`] -- Closed name sets (zones, units, buildings, upgrades, ages)
//! - [`resources`] -- The three-counter [`Resources`] bundle used for ledgers and costs
//! - [`pair`] -- [`PlayerPair`], a value held once per player
//! - [`structs`] -- Player and match state, event log, render snapshot
//! - [`command`] -- The sanitized seven-field [`Command`]
//! - [`observation`] -- The fog-of-war limited [`Observation`]

pub mod command;
pub mod enums;
pub mod ids;
pub mod observation;
pub mod pair;
pub mod resources;
pub mod structs;

pub use command::{BuildOrder, Command, MoveOrder, ResearchOrder, TrainOrder};
pub use enums::{
    Age, BuildingType, MatchOutcome, PlayerId, ResourceKind, UnitClass, UnitType, UnknownName,
    UpgradeId, Zone,
};
pub use ids::MatchId;
pub use observation::{Observation, ZoneView};
pub use pair::PlayerPair;
pub use resources::Resources;
pub use structs::{EventLog, LogEntry, MatchSnapshot, MatchState, PlayerState, ProductionItem};
