//! Error types for the match engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and the match run.

/// Top-level error for the match engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: skirmish_core::config::ConfigError,
    },

    /// Match runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: skirmish_core::runner::RunnerError,
    },

    /// The snapshot directory or a snapshot file could not be written.
    #[error("snapshot I/O error: {source}")]
    Snapshot {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A snapshot could not be encoded as JSON.
    #[error("snapshot encoding error: {source}")]
    SnapshotEncode {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// A seat names a strategy the engine does not ship.
    #[error("unknown strategy {name:?} (expected balanced, aggressive, economic or idle)")]
    UnknownStrategy {
        /// The configured name.
        name: String,
    },
}
