//! Tick sink that persists one JSON snapshot per completed turn.
//!
//! Files are named `turn_NNN.json` and hold the pretty-printed
//! [`MatchSnapshot`]. Write failures are logged and never stop the match.

use std::path::{Path, PathBuf};

use skirmish_core::runner::TickSink;
use skirmish_core::tick::TickSummary;
use skirmish_types::{MatchSnapshot, MatchState};
use tracing::{debug, warn};

use crate::error::EngineError;

/// Writes `turn_NNN.json` files into a directory.
#[derive(Debug)]
pub struct SnapshotWriter {
    dir: PathBuf,
}

impl SnapshotWriter {
    /// Create the writer, creating `dir` if needed.
    pub fn create(dir: &Path) -> Result<Self, EngineError> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Path of the snapshot for `turn`.
    pub fn path_for(&self, turn: u32) -> PathBuf {
        self.dir.join(format!("turn_{turn:03}.json"))
    }

    fn write(&self, snapshot: &MatchSnapshot) -> Result<PathBuf, EngineError> {
        let path = self.path_for(snapshot.turn);
        let json = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}

impl TickSink for SnapshotWriter {
    fn on_tick(&mut self, summary: &TickSummary, state: &MatchState) {
        let snapshot = MatchSnapshot::capture(state, summary.turn, summary.scores);
        match self.write(&snapshot) {
            Ok(path) => debug!(turn = summary.turn, path = %path.display(), "Snapshot written"),
            Err(error) => warn!(turn = summary.turn, error = %error, "Failed to write snapshot"),
        }
    }
}
