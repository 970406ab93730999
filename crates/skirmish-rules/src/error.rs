//! Error types for the `skirmish-rules` crate.

use skirmish_types::{Age, BuildingType, UnitType, UpgradeId, Zone};

/// A rules-table lookup failed.
///
/// The standard catalog is complete, so these only surface for hand-built
/// catalogs that omit entries. Callers treat them as a rejection of the
/// single entry that triggered the lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    /// No stats for this unit type.
    #[error("no stats for unit type {0}")]
    UnknownUnit(UnitType),

    /// No stats for this building type.
    #[error("no stats for building type {0}")]
    UnknownBuilding(BuildingType),

    /// No stats for this upgrade.
    #[error("no stats for upgrade {0}")]
    UnknownUpgrade(UpgradeId),

    /// No advance cost for this target age.
    #[error("no advance cost for {0}")]
    UnknownAge(Age),

    /// The zone is not a node of the map graph.
    #[error("zone {0} is not on the map")]
    UnknownZone(Zone),
}
