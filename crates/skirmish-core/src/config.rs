//! Configuration loading and typed config structures for a skirmish match.
//!
//! The canonical configuration lives in `skirmish-config.yaml` in the working
//! directory. Every field is defaulted, so an empty file (or no file at all)
//! yields a playable match.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Environment variable overriding `match.turn_limit`.
pub const TURN_LIMIT_ENV: &str = "SKIRMISH_TURN_LIMIT";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but cannot be used.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level match configuration.
///
/// Mirrors the structure of `skirmish-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MatchConfig {
    /// Turn limit, decision timeout and pacing.
    #[serde(default, rename = "match")]
    pub settings: MatchSettings,

    /// Logging output.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Turn snapshot output.
    #[serde(default)]
    pub output: OutputConfig,

    /// Built-in strategy for each seat.
    #[serde(default)]
    pub players: PlayersConfig,
}

impl MatchConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `SKIRMISH_TURN_LIMIT` overrides `match.turn_limit` when set to a
    /// valid integer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit, not as an empty mapping.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.settings.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject values the orchestrator cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.settings.turn_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "match.turn_limit",
                reason: String::from("must be at least 1"),
            });
        }
        if self.settings.decision_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "match.decision_timeout_ms",
                reason: String::from("must be at least 1"),
            });
        }
        Ok(())
    }
}

/// Per-match orchestration settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MatchSettings {
    /// The match is scored once this turn completes.
    #[serde(default = "default_turn_limit")]
    pub turn_limit: u32,

    /// Milliseconds each decider has to answer before its turn is a no-op.
    #[serde(default = "default_decision_timeout_ms")]
    pub decision_timeout_ms: u64,

    /// Event log entries included in each observation.
    #[serde(default = "default_recent_events")]
    pub recent_events: usize,

    /// Pause between ticks in milliseconds (0 = none).
    #[serde(default)]
    pub tick_interval_ms: u64,
}

impl MatchSettings {
    /// Decision timeout as a [`Duration`].
    pub const fn decision_timeout(&self) -> Duration {
        Duration::from_millis(self.decision_timeout_ms)
    }

    /// Apply `SKIRMISH_TURN_LIMIT` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup. Unparseable values are
    /// ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(limit) = lookup(TURN_LIMIT_ENV).and_then(|v| v.trim().parse::<u32>().ok()) {
            self.turn_limit = limit;
        }
    }
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            turn_limit: default_turn_limit(),
            decision_timeout_ms: default_decision_timeout_ms(),
            recent_events: default_recent_events(),
            tick_interval_ms: 0,
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Where per-turn snapshots go.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Directory for `turn_NNN.json` files. Unset disables snapshots.
    #[serde(default)]
    pub snapshot_dir: Option<PathBuf>,
}

/// Built-in strategy names for both seats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlayersConfig {
    /// Player A.
    #[serde(default, rename = "A")]
    pub a: SeatConfig,

    /// Player B.
    #[serde(default, rename = "B")]
    pub b: SeatConfig,
}

/// One seat's configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeatConfig {
    /// Strategy name understood by the engine binary.
    #[serde(default = "default_strategy")]
    pub strategy: String,
}

impl Default for SeatConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
        }
    }
}

const fn default_turn_limit() -> u32 {
    50
}

const fn default_decision_timeout_ms() -> u64 {
    60_000
}

const fn default_recent_events() -> usize {
    5
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_strategy() -> String {
    "balanced".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = MatchConfig::default();
        assert_eq!(config.settings.turn_limit, 50);
        assert_eq!(config.settings.recent_events, 5);
        assert_eq!(config.settings.decision_timeout(), Duration::from_secs(60));
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.output.snapshot_dir.is_none());
        assert_eq!(config.players.b.strategy, "balanced");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
match:
  turn_limit: 30
  decision_timeout_ms: 2500
  recent_events: 8
  tick_interval_ms: 250

logging:
  level: "debug"
  format: json

output:
  snapshot_dir: "game_logs"

players:
  A:
    strategy: rush
  B:
    strategy: boom
"#;
        let config = MatchConfig::parse(yaml).unwrap();
        assert_eq!(config.settings.decision_timeout_ms, 2500);
        assert_eq!(config.settings.recent_events, 8);
        assert_eq!(config.settings.tick_interval_ms, 250);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.output.snapshot_dir, Some(PathBuf::from("game_logs")));
        assert_eq!(config.players.a.strategy, "rush");
        assert_eq!(config.players.b.strategy, "boom");
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = MatchConfig::parse("players:\n  B:\n    strategy: turtle\n").unwrap();
        assert_eq!(config.players.a.strategy, "balanced");
        assert_eq!(config.players.b.strategy, "turtle");
        assert_eq!(config.settings.decision_timeout_ms, 60_000);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(MatchConfig::parse("").is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = MatchConfig::parse("match:\n  decision_timeout_ms: 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "match.decision_timeout_ms",
                ..
            }
        ));
    }

    #[test]
    fn turn_limit_override() {
        let mut settings = MatchSettings::default();
        settings.apply_overrides(|key| (key == TURN_LIMIT_ENV).then(|| String::from(" 12 ")));
        assert_eq!(settings.turn_limit, 12);

        settings.apply_overrides(|_| Some(String::from("lots")));
        assert_eq!(settings.turn_limit, 12);
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("skirmish-config.yaml");
        if path.exists() {
            let config = MatchConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
