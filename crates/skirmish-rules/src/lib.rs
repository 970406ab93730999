//! Static game rules for the skirmish simulation.
//!
//! Everything here is read-only after construction. The validator, economy,
//! combat resolver and observation builder all take a `&RulesCatalog`
//! instead of reaching for global tables.
//!
//! # Modules
//!
//! - [`catalog`] -- [`RulesCatalog`] with unit, building, upgrade, age and
//!   economy tables
//! - [`map`] -- [`ZoneGraph`], the fixed 8-zone adjacency graph and halves
//! - [`error`] -- [`RulesError`] for lookups a hand-built catalog cannot serve

pub mod catalog;
pub mod error;
pub mod map;

pub use catalog::{
    BuildingStats, CounterClass, EconomyRates, RulesCatalog, StartingConditions, UnitStats,
    UpgradeStats, standard_building, standard_unit, standard_upgrade,
};
pub use error::RulesError;
pub use map::ZoneGraph;
