//! State operations, validation and resolution for the skirmish simulation.
//!
//! Everything here is synchronous and deterministic. The orchestrator in
//! `skirmish-core` calls into this crate in a fixed order each tick; no
//! function here awaits, spawns, or reads the clock.
//!
//! # Modules
//!
//! - [`state`] -- Match seeding, spending and villager task rescaling
//! - [`validation`] -- Two-stage decode and sanitize of untrusted commands
//! - [`economy`] -- Villager income and production queue advance
//! - [`effects`] -- Ordered application of sanitized commands
//! - [`combat`] -- Tower fire, field combat, damage distribution and siege
//! - [`scoring`] -- Turn-limit score
//! - [`invariants`] -- State sanity checks run by the orchestrator
//! - [`error`] -- [`SimError`] for internal faults

pub mod combat;
pub mod economy;
pub mod effects;
pub mod error;
pub mod invariants;
pub mod scoring;
pub mod state;
pub mod validation;

pub use combat::{CombatReport, Damage, SiegeReport, ZoneCombat, resolve_all};
pub use economy::{IncomeReport, apply_economy};
pub use effects::{EffectPhase, apply_effects};
pub use error::SimError;
pub use invariants::{InvariantViolation, check_invariants, check_task_budget};
pub use scoring::{score, scores};
pub use state::new_match;
pub use validation::{
    CommandField, DraftCommand, Rejection, ValidationReport, Verdict, VerdictOutcome, decode,
    sanitize, validate,
};
