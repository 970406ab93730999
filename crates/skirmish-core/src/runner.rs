//! Match loop runner with cooperative stop.
//!
//! [`run_match`] drives [`run_tick`] until victory evaluation decides the
//! match or a stop is requested through [`MatchControl`]. The stop flag is
//! checked once per tick boundary, never mid-tick. After every completed
//! tick the [`TickSink`] sees the summary and the committed state.
//!
//! [`run_tick`]: crate::tick::run_tick

use std::sync::Arc;

use tracing::{info, warn};

use skirmish_rules::RulesCatalog;
use skirmish_types::{MatchOutcome, MatchState, PlayerPair};

use crate::config::MatchSettings;
use crate::control::{MatchControl, MatchEndReason};
use crate::decision::Decider;
use crate::tick::{self, TickError, TickSummary};

/// Errors that can occur during the match run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Result of a match run.
#[derive(Debug)]
pub struct MatchResult {
    /// The reason the run ended.
    pub end_reason: MatchEndReason,
    /// The match outcome when the run ended.
    pub outcome: MatchOutcome,
    /// Number of ticks executed by this run.
    pub total_ticks: u32,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
}

/// Render/broadcast hook invoked after each tick completes.
///
/// Implementations can write snapshots, push to a UI, collect telemetry.
/// The state is the committed post-tick state.
pub trait TickSink: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, state: &MatchState);
}

/// A sink that ignores every tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

impl TickSink for NoOpSink {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &MatchState) {}
}

/// Run the match until it is decided or stopped.
///
/// A match that is already decided returns immediately with zero ticks.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick fails. The state then holds the last
/// fully committed tick and the match does not advance further.
pub async fn run_match(
    state: &mut MatchState,
    deciders: &PlayerPair<Arc<dyn Decider>>,
    rules: &RulesCatalog,
    settings: &MatchSettings,
    control: &Arc<MatchControl>,
    sink: &mut dyn TickSink,
) -> Result<MatchResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u32 = 0;

    info!(
        match_id = %state.id,
        turn = state.turn,
        turn_limit = settings.turn_limit,
        decider_a = deciders.a.name(),
        decider_b = deciders.b.name(),
        tick_interval_ms = control.tick_interval_ms(),
        "Match starting"
    );

    loop {
        // --- Already decided ---
        let outcome = state.outcome();
        if outcome.is_decided() {
            let reason = MatchEndReason::Decided(outcome);
            control.set_end_reason(reason).await;
            return Ok(MatchResult {
                end_reason: reason,
                outcome,
                total_ticks,
                final_summary: last_summary,
            });
        }

        // --- Check stop request (before tick) ---
        if control.is_stop_requested() {
            info!(turn = state.turn, "Stop requested");
            let reason = MatchEndReason::OperatorStop;
            control.set_end_reason(reason).await;
            return Ok(MatchResult {
                end_reason: reason,
                outcome,
                total_ticks,
                final_summary: last_summary,
            });
        }

        // --- Execute tick ---
        let summary = tick::run_tick(state, deciders, rules, settings).await?;
        total_ticks = total_ticks.saturating_add(1);

        // --- Notify sink ---
        sink.on_tick(&summary, state);

        if summary.outcome.is_decided() {
            info!(turn = summary.turn, outcome = %summary.outcome, "Match decided");
        }
        last_summary = Some(summary);

        // --- Sleep for tick interval ---
        let interval_ms = control.tick_interval_ms();
        if interval_ms > 0 && !state.outcome().is_decided() {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        }
    }
}

/// Log the end of a match run.
pub fn log_match_end(result: &MatchResult) {
    info!(
        reason = ?result.end_reason,
        outcome = %result.outcome,
        total_ticks = result.total_ticks,
        final_turn = result.final_summary.as_ref().map(|s| s.turn),
        "Match ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            turn = summary.turn,
            score_a = summary.scores.a,
            score_b = summary.scores.b,
            "Final scores"
        );
    } else {
        warn!("Match ended with no ticks executed");
    }
}
