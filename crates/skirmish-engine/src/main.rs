//! Match engine binary for the skirmish simulation.
//!
//! Wires configuration, logging, the built-in bots and the turn-snapshot
//! writer around the orchestrator, then plays one match to completion.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `skirmish-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the rules catalog and seed the match
//! 4. Create one decider per seat from `players.*.strategy`
//! 5. Create match control and hook Ctrl-C to a clean stop
//! 6. Run the match loop
//! 7. Log the result

mod bots;
mod error;
mod snapshot_writer;

use std::path::Path;
use std::sync::Arc;

use skirmish_core::config::{LogFormat, LoggingConfig, MatchConfig};
use skirmish_core::control::MatchControl;
use skirmish_core::runner::{self, NoOpSink, TickSink};
use skirmish_rules::RulesCatalog;
use skirmish_sim::new_match;
use skirmish_types::PlayerPair;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::snapshot_writer::SnapshotWriter;

/// Config file looked up in the working directory.
const CONFIG_PATH: &str = "skirmish-config.yaml";

/// Application entry point for the match engine.
///
/// # Errors
///
/// Returns an error if configuration is invalid, a strategy is unknown,
/// or a tick hits an internal fault.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet, so remember whether
    //    defaults were used and report it afterwards.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("skirmish-engine starting");
    if !from_file {
        info!("Config file not found, using defaults");
    }
    info!(
        turn_limit = config.settings.turn_limit,
        decision_timeout_ms = config.settings.decision_timeout_ms,
        recent_events = config.settings.recent_events,
        tick_interval_ms = config.settings.tick_interval_ms,
        "Configuration loaded"
    );

    // 3. Rules and initial state.
    let rules = Arc::new(RulesCatalog::standard());
    let mut state = new_match(&rules);
    info!(match_id = %state.id, "Match created");

    // 4. Deciders.
    let deciders = PlayerPair::new(
        bots::decider_for(&config.players.a.strategy, &rules)?,
        bots::decider_for(&config.players.b.strategy, &rules)?,
    );
    info!(
        player_a = deciders.a.name(),
        player_b = deciders.b.name(),
        "Deciders ready"
    );

    // 5. Match control with Ctrl-C as a cooperative stop.
    let control = Arc::new(MatchControl::new(config.settings.tick_interval_ms));
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Interrupt received, stopping after the current tick");
                    control.request_stop();
                }
                Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
            }
        });
    }

    let mut sink: Box<dyn TickSink> = match &config.output.snapshot_dir {
        Some(dir) => {
            let writer = SnapshotWriter::create(dir)?;
            info!(dir = %dir.display(), "Writing turn snapshots");
            Box::new(writer)
        }
        None => Box::new(NoOpSink),
    };

    // 6. Run the match.
    let result = runner::run_match(
        &mut state,
        &deciders,
        &rules,
        &config.settings,
        &control,
        sink.as_mut(),
    )
    .await
    .map_err(EngineError::from)?;

    // 7. Log results.
    runner::log_match_end(&result);
    if let Some(last) = state.log.entries().last() {
        info!(turn = last.turn, "{}", last.message);
    }
    info!(
        outcome = %result.outcome,
        elapsed_seconds = control.elapsed_seconds(),
        "skirmish-engine shutdown complete"
    );

    Ok(())
}

/// Load the match configuration from `skirmish-config.yaml`.
///
/// Returns the config and whether it came from the file.
fn load_config() -> Result<(MatchConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok((MatchConfig::from_file(config_path)?, true))
    } else {
        // Defaults still honour the environment overrides.
        Ok((MatchConfig::parse("")?, false))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    match logging.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}
