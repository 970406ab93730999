//! Turn orchestration for the skirmish simulation.
//!
//! This crate owns the tick cycle that drives a match: economy, decision,
//! validation, effects, combat and victory. State mutation is delegated to
//! `skirmish-sim`; this crate adds the async decision plumbing and the
//! control plane around it.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `skirmish-config.yaml` into
//!   strongly-typed structs.
//! - [`control`] -- [`MatchControl`], the shared stop flag and pacing.
//! - [`decision`] -- [`Decider`] trait, stub deciders and concurrent
//!   solicitation under a timeout.
//! - [`observation`] -- Per-player observation assembly with fog of war.
//! - [`parse`] -- Recovering a command object from free-form text.
//! - [`runner`] -- [`run_match`], the loop around single ticks.
//! - [`tick`] -- [`run_tick`], one complete turn.
//! - [`victory`] -- Town center and turn-limit victory checks.
//!
//! [`MatchControl`]: control::MatchControl
//! [`Decider`]: decision::Decider
//! [`run_match`]: runner::run_match
//! [`run_tick`]: tick::run_tick

pub mod config;
pub mod control;
pub mod decision;
pub mod observation;
pub mod parse;
pub mod runner;
pub mod tick;
pub mod victory;
