//! Error types for the `skirmish-sim` crate.
//!
//! These are internal faults. Malformed or illegal commands never produce a
//! [`SimError`]; the validator reports them as per-entry rejections instead.

use skirmish_rules::RulesError;
use skirmish_types::{PlayerId, Zone};

use crate::invariants::InvariantViolation;

/// An internal fault while mutating match state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// A per-zone mapping lost its entry for a zone.
    #[error("player {player} has no {mapping} entry for zone {zone}")]
    MissingZone {
        /// The player whose state is malformed.
        player: PlayerId,
        /// The zone without an entry.
        zone: Zone,
        /// Which mapping is missing it.
        mapping: &'static str,
    },

    /// A rules-table lookup failed for an entry that had already passed
    /// validation.
    #[error("rules lookup failed: {source}")]
    Rules {
        /// The underlying lookup error.
        #[from]
        source: RulesError,
    },

    /// State checks found one or more broken invariants.
    #[error("{count} invariant violation(s)")]
    Invariants {
        /// Number of violations.
        count: usize,
        /// The violations, in detection order.
        violations: Vec<InvariantViolation>,
    },
}
