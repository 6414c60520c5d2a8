//! Host binary for the Driftwake event scheduler.
//!
//! Wires a [`Scheduler`] to the HTTP event catalog and a world-state file
//! written by the game, then drives it from a fixed-rate tick loop until
//! Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `driftwake-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Read the initial world-state snapshot
//! 4. Create the HTTP catalog and the scheduler
//! 5. Spawn the notification loggers and the Ctrl-C handler
//! 6. Start the scheduler and run the tick loop
//!
//! [`Scheduler`]: driftwake_core::scheduler::Scheduler

mod error;
mod world_file;

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use driftwake_catalog::HttpCatalog;
use driftwake_core::config::{DriftwakeConfig, LoggingConfig};
use driftwake_core::scheduler::{Scheduler, SchedulerControl, SchedulerEvent};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::world_file::WorldFile;

/// Configuration file looked up in the working directory.
const CONFIG_PATH: &str = "driftwake-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, the initial world snapshot or
/// scheduler startup fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(
        catalog_url = config.catalog.url,
        world_state_path = config.engine.world_state_path,
        tick_interval_ms = config.engine.tick_interval_ms,
        enabled = config.scheduler.enabled,
        "driftwake-engine starting"
    );

    // 3. Initial world snapshot.
    let mut world_file = WorldFile::new(&config.engine.world_state_path);
    let world = world_file.load()?;
    info!(path = %world_file.path().display(), wake = world.wake, "World state loaded");

    // 4. Catalog and scheduler.
    let catalog = HttpCatalog::new(&config.catalog);
    let mut scheduler = Scheduler::new(catalog);
    info!(catalog_url = scheduler.catalog().url(), "Scheduler created");

    // 5. Notification loggers and Ctrl-C handler.
    tokio::spawn(log_triggers(scheduler.subscribe_triggers()));
    tokio::spawn(log_risk_updates(scheduler.subscribe()));
    tokio::spawn(stop_on_ctrl_c(scheduler.control()));

    // 6. Start and run.
    scheduler
        .start(config.scheduler.clone(), world, now_ms())
        .map_err(EngineError::from)?;

    let tick_every = Duration::from_millis(config.engine.tick_interval_ms.max(1));
    let mut ticker = tokio::time::interval(tick_every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    while scheduler.is_running() {
        ticker.tick().await;
        let now = now_ms();

        match world_file.reload_if_changed() {
            Ok(Some(world)) => scheduler.update_game_state(world, now),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "keeping previous world state"),
        }

        if let Some(outcome) = scheduler.tick(now).await {
            debug!(
                risk = outcome.risk,
                roll = outcome.roll,
                attempted = ?outcome.attempted,
                "check complete"
            );
        }
    }

    let stats = scheduler.stats(now_ms());
    info!(
        total_checks = stats.total_checks,
        total_triggers = stats.total_triggers,
        history_len = stats.history_len,
        "driftwake-engine shutdown complete"
    );

    Ok(())
}

/// Load configuration from `driftwake-config.yaml`, or defaults if absent.
///
/// Environment overrides apply either way.
fn load_config() -> Result<DriftwakeConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok(DriftwakeConfig::from_file(config_path)?)
    } else {
        Ok(DriftwakeConfig::parse("")?)
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level; `format: json` switches to
/// JSON lines.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Current wall-clock time in epoch milliseconds.
fn now_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

/// Log every admitted event until the channel closes.
async fn log_triggers(mut rx: broadcast::Receiver<SchedulerEvent>) {
    loop {
        match rx.recv().await {
            Ok(SchedulerEvent::EventTriggered {
                event_id,
                event_type,
                triggered_at,
                ..
            }) => {
                info!(
                    event_id = %event_id,
                    event_type = %event_type,
                    triggered_at,
                    "Event triggered"
                );
            }
            Ok(SchedulerEvent::RiskUpdated(_)) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "trigger logger lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Log risk updates until the channel closes. Triggers are left to
/// [`log_triggers`].
async fn log_risk_updates(mut rx: broadcast::Receiver<SchedulerEvent>) {
    loop {
        match rx.recv().await {
            Ok(SchedulerEvent::RiskUpdated(update)) => {
                info!(
                    score = update.score,
                    level = %update.level,
                    next_check_secs = update.next_check,
                    "Risk updated"
                );
            }
            Ok(SchedulerEvent::EventTriggered { .. }) => {}
            Err(RecvError::Lagged(skipped)) => {
                debug!(skipped, "risk logger lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Stop the scheduler on Ctrl-C.
async fn stop_on_ctrl_c(control: SchedulerControl) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Ctrl-C received, stopping scheduler");
            control.stop();
        }
        Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
    }
}
