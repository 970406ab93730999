//! Decider trait, stub implementations and concurrent solicitation.
//!
//! Each tick the orchestrator hands every player's [`Decider`] its own
//! [`Observation`] and waits for a raw JSON command. The [`Decider`] trait
//! abstracts where that command comes from: a scripted bot, a remote
//! model, a human, or a test stub. Deciders are untrusted. Whatever they
//! return is validated before it touches state, and a decider that hangs,
//! errors or panics simply forfeits its turn.

use core::fmt;
use std::any::Any;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::{Value, json};
use tokio::runtime::Handle;
use tokio::sync::{Mutex, oneshot};
use tokio::time::error::Elapsed;
use tracing::debug;

use skirmish_types::{Observation, PlayerId, PlayerPair};

use crate::parse::extract_command_json;

/// Errors a decider can report instead of a command.
#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    /// The decider could not produce an answer at all.
    #[error("decider unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },

    /// The decider answered with something that is not a command.
    #[error("decider returned unusable output: {message}")]
    Malformed {
        /// Description of the output.
        message: String,
    },
}

/// A source of raw commands for one player.
pub trait Decider: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Produce a raw command for `observation`.
    ///
    /// The returned value is untrusted; it need not even be an object.
    fn decide(&self, observation: Observation) -> BoxFuture<'_, Result<Value, DecisionError>>;
}

/// How a decision call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// The decider answered in time.
    Responded(Value),
    /// The decider did not answer before the deadline.
    TimedOut,
    /// The decider returned an error or panicked.
    Failed(String),
}

impl DecisionOutcome {
    /// The tag without payload.
    pub const fn kind(&self) -> DecisionKind {
        match self {
            Self::Responded(_) => DecisionKind::Responded,
            Self::TimedOut => DecisionKind::TimedOut,
            Self::Failed(_) => DecisionKind::Failed,
        }
    }

    /// The raw command, if the decider answered.
    pub const fn response(&self) -> Option<&Value> {
        match self {
            Self::Responded(value) => Some(value),
            Self::TimedOut | Self::Failed(_) => None,
        }
    }
}

/// Payload-free tag of a [`DecisionOutcome`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    /// Answered in time.
    #[default]
    Responded,
    /// Hit the deadline.
    TimedOut,
    /// Errored or panicked.
    Failed,
}

impl fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Responded => "responded",
            Self::TimedOut => "timed_out",
            Self::Failed => "failed",
        })
    }
}

/// Ask both deciders at once, each under its own `timeout`.
///
/// Neither call can observe the other's answer, and neither can fail or
/// stall the tick: timeouts, errors and panics all come back as outcomes.
pub async fn solicit_decisions(
    deciders: &PlayerPair<Arc<dyn Decider>>,
    observations: PlayerPair<Observation>,
    timeout: Duration,
) -> PlayerPair<DecisionOutcome> {
    let PlayerPair { a: obs_a, b: obs_b } = observations;
    let (a, b) = tokio::join!(
        solicit_one(PlayerId::A, Arc::clone(&deciders.a), obs_a, timeout),
        solicit_one(PlayerId::B, Arc::clone(&deciders.b), obs_b, timeout),
    );
    PlayerPair::new(a, b)
}

/// Result a decider thread hands back: panic, deadline, or the decider's own answer.
type ThreadAnswer = Result<Result<Result<Value, DecisionError>, Elapsed>, Box<dyn Any + Send>>;

/// Run one decision on a dedicated thread and wait at most `timeout` for it.
///
/// The decider's future is driven by [`Handle::block_on`] off the runtime's
/// workers, so a decider that blocks the thread it runs on cannot hold up
/// the caller or the other seat. The same deadline is applied inside the
/// thread, which ends cooperative deciders on time. A thread still blocked
/// at the deadline is left to finish alone and its answer is dropped.
async fn solicit_one(
    seat: PlayerId,
    decider: Arc<dyn Decider>,
    observation: Observation,
    timeout: Duration,
) -> DecisionOutcome {
    let handle = Handle::current();
    let (tx, rx) = oneshot::channel::<ThreadAnswer>();
    let spawned = std::thread::Builder::new()
        .name(format!("decider-{seat}"))
        .spawn(move || {
            // The decide call itself runs inside the guard so panics raised
            // before its first await are caught too.
            let answer = std::panic::catch_unwind(AssertUnwindSafe(|| {
                handle.block_on(async { tokio::time::timeout(timeout, decider.decide(observation)).await })
            }));
            if tx.send(answer).is_err() {
                debug!(seat = %seat, "late decision discarded");
            }
        });
    if let Err(err) = spawned {
        return DecisionOutcome::Failed(format!("could not start decider thread: {err}"));
    }

    match tokio::time::timeout(timeout, rx).await {
        Err(_) | Ok(Ok(Ok(Err(_)))) => DecisionOutcome::TimedOut,
        Ok(Err(_closed)) => DecisionOutcome::Failed(String::from("decider thread exited without answering")),
        Ok(Ok(Err(panic))) => DecisionOutcome::Failed(format!("panicked: {}", panic_message(panic.as_ref()))),
        Ok(Ok(Ok(Ok(Err(err))))) => DecisionOutcome::Failed(err.to_string()),
        Ok(Ok(Ok(Ok(Ok(value))))) => DecisionOutcome::Responded(value),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| String::from("unknown panic"))
}

// ---------------------------------------------------------------------------
// Built-in deciders
// ---------------------------------------------------------------------------

/// A decider that always returns an empty command.
///
/// Every turn is effectively forfeited; economy still runs.
#[derive(Debug, Clone, Default)]
pub struct IdleDecider;

impl IdleDecider {
    /// Create a new idle decider.
    pub const fn new() -> Self {
        Self
    }
}

impl Decider for IdleDecider {
    fn name(&self) -> &str {
        "idle"
    }

    fn decide(&self, _observation: Observation) -> BoxFuture<'_, Result<Value, DecisionError>> {
        Box::pin(async { Ok(json!({})) })
    }
}

/// Replays a fixed list of responses, one per turn, then idles.
#[derive(Debug, Default)]
pub struct ScriptedDecider {
    script: Mutex<VecDeque<Result<Value, String>>>,
}

impl ScriptedDecider {
    /// Replay the given raw commands.
    pub fn new(commands: impl IntoIterator<Item = Value>) -> Self {
        Self {
            script: Mutex::new(commands.into_iter().map(Ok).collect()),
        }
    }

    /// Replay free-text responses, recovering a command from each.
    ///
    /// A response with no recoverable JSON object fails that turn.
    pub fn from_text<S: AsRef<str>>(responses: impl IntoIterator<Item = S>) -> Self {
        let script = responses
            .into_iter()
            .map(|text| {
                let text = text.as_ref();
                extract_command_json(text).ok_or_else(|| format!("no command object in {text:?}"))
            })
            .collect();
        Self {
            script: Mutex::new(script),
        }
    }

    /// Responses not yet replayed.
    pub async fn remaining(&self) -> usize {
        self.script.lock().await.len()
    }
}

impl Decider for ScriptedDecider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn decide(&self, _observation: Observation) -> BoxFuture<'_, Result<Value, DecisionError>> {
        Box::pin(async move {
            let next = self.script.lock().await.pop_front();
            match next {
                Some(Ok(value)) => Ok(value),
                Some(Err(message)) => Err(DecisionError::Malformed { message }),
                None => Ok(json!({})),
            }
        })
    }
}
