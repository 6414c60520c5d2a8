//! Error types for the Driftwake engine binary.
//!
//! [`EngineError`] wraps every failure that can stop the engine during
//! startup, so `main` can propagate with `?`.

use std::path::PathBuf;

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: driftwake_core::config::ConfigError,
    },

    /// The scheduler refused to start.
    #[error("scheduler error: {source}")]
    Scheduler {
        /// The underlying scheduler error.
        #[from]
        source: driftwake_core::scheduler::SchedulerError,
    },

    /// The world-state file could not be read.
    #[error("failed to read world state {}: {source}", path.display())]
    WorldIo {
        /// Path of the world-state file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The world-state file is not valid JSON for a world snapshot.
    #[error("failed to parse world state {}: {source}", path.display())]
    WorldParse {
        /// Path of the world-state file.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}
