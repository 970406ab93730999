//! Shared match control state.
//!
//! [`MatchControl`] is wrapped in [`Arc`](std::sync::Arc) and shared between
//! the runner and whatever drives it (a signal handler, a UI, a test). The
//! stop flag is only read at tick boundaries, so a stop never interrupts a
//! tick in progress.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use skirmish_types::MatchOutcome;

/// Why the runner stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "outcome", rename_all = "snake_case")]
pub enum MatchEndReason {
    /// Victory evaluation decided the match.
    Decided(MatchOutcome),
    /// A stop was requested before the match was decided.
    OperatorStop,
}

/// Cooperative stop flag, pacing and end bookkeeping.
#[derive(Debug)]
pub struct MatchControl {
    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Pause between ticks in milliseconds (runtime-adjustable).
    tick_interval_ms: AtomicU64,

    /// Wall-clock time the match started.
    started_at: DateTime<Utc>,

    /// Reason the match ended, if it has.
    end_reason: Mutex<Option<MatchEndReason>>,
}

impl MatchControl {
    /// Create control state with the given inter-tick pause.
    pub fn new(tick_interval_ms: u64) -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
            tick_interval_ms: AtomicU64::new(tick_interval_ms),
            started_at: Utc::now(),
            end_reason: Mutex::new(None),
        }
    }

    /// Ask the runner to stop before the next tick.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Current pause between ticks.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    /// Change the pause between ticks, returning the previous value.
    pub fn set_tick_interval_ms(&self, ms: u64) -> u64 {
        self.tick_interval_ms.swap(ms, Ordering::AcqRel)
    }

    /// Wall-clock start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Seconds since the match started.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        // Negative if the clock stepped backwards.
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    /// Record why the match ended.
    pub async fn set_end_reason(&self, reason: MatchEndReason) {
        let mut guard = self.end_reason.lock().await;
        *guard = Some(reason);
    }

    /// Why the match ended, if it has.
    pub async fn end_reason(&self) -> Option<MatchEndReason> {
        *self.end_reason.lock().await
    }
}

impl Default for MatchControl {
    fn default() -> Self {
        Self::new(0)
    }
}
