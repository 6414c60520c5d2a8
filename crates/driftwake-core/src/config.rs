//! Configuration loading and typed config structures for Driftwake.
//!
//! The canonical configuration lives in `driftwake-config.yaml` next to the
//! engine binary. This module defines strongly-typed structs that mirror the
//! YAML structure and a loader that reads the file and applies environment
//! overrides. Every field has a default, so an empty file is a valid config.
//!
//! [`SchedulerConfig`] is the hot-swappable part: the host can replace it at
//! any time through `Scheduler::update_config`.

use std::collections::BTreeMap;
use std::path::Path;

use driftwake_types::{Radiation, RiskLevel, Zone};
use serde::Deserialize;

/// Errors that can occur when loading or validating configuration.
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

    /// The configuration parsed but its values are unusable.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level Driftwake configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DriftwakeConfig {
    /// Event scheduler tuning.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Where the event catalog is fetched from.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Host loop settings for the engine binary.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DriftwakeConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `CATALOG_URL` overrides `catalog.url`
    /// - `WORLD_STATE_PATH` overrides `engine.world_state_path`
    /// - `LOG_LEVEL` overrides `logging.level`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if the scheduler section fails validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string and apply env overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if the scheduler section fails validation.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        config.scheduler.validate()?;
        Ok(config)
    }

    /// Override selected values with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("CATALOG_URL") {
            self.catalog.url = val;
        }
        if let Ok(val) = std::env::var("WORLD_STATE_PATH") {
            self.engine.world_state_path = val;
        }
        if let Ok(val) = std::env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
    }
}

/// Tuning for the event scheduler.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SchedulerConfig {
    /// Master switch; a disabled scheduler ignores ticks.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Weight budget of each risk factor.
    #[serde(default)]
    pub risk_weights: RiskWeights,

    /// Raw location risk per zone. Zones missing here score 30.
    #[serde(default = "default_location_risk")]
    pub location_risk: BTreeMap<Zone, i32>,

    /// Raw risk per radiation band. Bands missing here score 0.
    #[serde(default = "default_radiation_risk")]
    pub radiation_risk: BTreeMap<Radiation, i32>,

    /// Polling interval per risk bracket, in seconds.
    #[serde(default)]
    pub check_intervals: CheckIntervals,

    /// Minimum seconds between any two admitted events.
    #[serde(default = "default_global_cooldown")]
    pub global_cooldown: u64,

    /// Minimum seconds between two events of the same type.
    #[serde(default)]
    pub event_cooldowns: BTreeMap<String, u64>,

    /// Hostile-faction pressure on the risk score.
    #[serde(default)]
    pub faction_standing_risk: FactionStandingRisk,

    /// Deadline for one catalog fetch, in milliseconds.
    #[serde(default = "default_catalog_timeout_ms")]
    pub catalog_timeout_ms: u64,

    /// Catalog trigger type the scheduler admits.
    #[serde(default = "default_trigger_type")]
    pub trigger_type: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            risk_weights: RiskWeights::default(),
            location_risk: default_location_risk(),
            radiation_risk: default_radiation_risk(),
            check_intervals: CheckIntervals::default(),
            global_cooldown: default_global_cooldown(),
            event_cooldowns: BTreeMap::new(),
            faction_standing_risk: FactionStandingRisk::default(),
            catalog_timeout_ms: default_catalog_timeout_ms(),
            trigger_type: default_trigger_type(),
        }
    }
}

impl SchedulerConfig {
    /// Parse a scheduler section on its own, e.g. for a hot swap.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] on malformed YAML or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can drive a scheduler.
    ///
    /// Every check interval must be at least one second, and intervals must
    /// not grow as the risk bracket rises.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let intervals = self.check_intervals.as_array();
        if intervals.contains(&0) {
            return Err(ConfigError::Invalid {
                reason: "check intervals must be at least 1 second".to_owned(),
            });
        }
        if intervals.windows(2).any(|pair| matches!(pair, [calm, tense] if tense > calm)) {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "check intervals must not increase with risk (got {intervals:?})"
                ),
            });
        }
        if self.trigger_type.is_empty() {
            return Err(ConfigError::Invalid {
                reason: "trigger_type must not be empty".to_owned(),
            });
        }
        Ok(())
    }

    /// Configured per-type cooldown for `event_type`, in seconds.
    pub fn cooldown_for(&self, event_type: &str) -> Option<u64> {
        self.event_cooldowns.get(event_type).copied()
    }
}

/// Weight budget of each risk factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RiskWeights {
    /// Multiplier applied directly to `wake`.
    #[serde(default = "default_wake_weight")]
    pub wake: u32,
    /// Share of the location sub-score.
    #[serde(default = "default_location_weight")]
    pub location: u32,
    /// Share of the time-in-system sub-score.
    #[serde(default = "default_time_weight")]
    pub time_in_system: u32,
    /// Share of the recent-event sub-score.
    #[serde(default = "default_recent_events_weight")]
    pub recent_events: u32,
    /// Share of the active-mission sub-score.
    #[serde(default = "default_missions_weight")]
    pub active_missions: u32,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            wake: default_wake_weight(),
            location: default_location_weight(),
            time_in_system: default_time_weight(),
            recent_events: default_recent_events_weight(),
            active_missions: default_missions_weight(),
        }
    }
}

/// Polling interval per risk bracket, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CheckIntervals {
    /// Interval while risk is LOW.
    #[serde(default = "default_low_interval")]
    pub low: u64,
    /// Interval while risk is MODERATE.
    #[serde(default = "default_moderate_interval")]
    pub moderate: u64,
    /// Interval while risk is HIGH.
    #[serde(default = "default_high_interval")]
    pub high: u64,
    /// Interval while risk is CRITICAL.
    #[serde(default = "default_critical_interval")]
    pub critical: u64,
    /// Interval while risk is EXTREME.
    #[serde(default = "default_extreme_interval")]
    pub extreme: u64,
}

impl CheckIntervals {
    /// Interval for a risk bracket.
    pub const fn for_level(&self, level: RiskLevel) -> u64 {
        match level {
            RiskLevel::Low => self.low,
            RiskLevel::Moderate => self.moderate,
            RiskLevel::High => self.high,
            RiskLevel::Critical => self.critical,
            RiskLevel::Extreme => self.extreme,
        }
    }

    /// Intervals from calmest to most dangerous bracket.
    pub const fn as_array(&self) -> [u64; 5] {
        [self.low, self.moderate, self.high, self.critical, self.extreme]
    }
}

impl Default for CheckIntervals {
    fn default() -> Self {
        Self {
            low: default_low_interval(),
            moderate: default_moderate_interval(),
            high: default_high_interval(),
            critical: default_critical_interval(),
            extreme: default_extreme_interval(),
        }
    }
}

/// Hostile-faction pressure on the risk score.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FactionStandingRisk {
    /// Whether faction standing contributes at all.
    #[serde(default)]
    pub enabled: bool,
    /// Standing below which a faction becomes hostile.
    #[serde(default)]
    pub threshold: i64,
    /// Extra risk per point of standing below the threshold.
    #[serde(default = "default_faction_multiplier")]
    pub multiplier: f64,
    /// Share of the faction sub-score.
    #[serde(default = "default_faction_weight")]
    pub weight: u32,
    /// Factions whose standing is tracked.
    #[serde(default)]
    pub factions: Vec<TrackedFaction>,
}

impl Default for FactionStandingRisk {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: 0,
            multiplier: default_faction_multiplier(),
            weight: default_faction_weight(),
            factions: Vec::new(),
        }
    }
}

/// A faction whose standing feeds the risk score.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackedFaction {
    /// Faction ID as used in `world.factionStanding`.
    pub id: String,
    /// Flat risk added once the faction turns hostile.
    #[serde(default)]
    pub base_encounter_chance: f64,
}

/// Where the event catalog is fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the events listing endpoint.
    #[serde(default = "default_catalog_url")]
    pub url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: default_catalog_url(),
        }
    }
}

/// Host loop settings for the engine binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Real-time milliseconds between scheduler ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// JSON file holding the current world state snapshot.
    #[serde(default = "default_world_state_path")]
    pub world_state_path: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            world_state_path: default_world_state_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: `"pretty"` or `"json"`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_true() -> bool {
    true
}

const fn default_wake_weight() -> u32 {
    40
}

const fn default_location_weight() -> u32 {
    30
}

const fn default_time_weight() -> u32 {
    15
}

const fn default_recent_events_weight() -> u32 {
    10
}

const fn default_missions_weight() -> u32 {
    5
}

fn default_location_risk() -> BTreeMap<Zone, i32> {
    BTreeMap::from([
        (Zone::Quiet, 10),
        (Zone::Normal, 30),
        (Zone::Dark, 50),
        (Zone::Static, 60),
        (Zone::Void, 80),
    ])
}

fn default_radiation_risk() -> BTreeMap<Radiation, i32> {
    BTreeMap::from([
        (Radiation::Low, 0),
        (Radiation::Moderate, 15),
        (Radiation::High, 30),
        (Radiation::Extreme, 50),
    ])
}

const fn default_low_interval() -> u64 {
    60
}

const fn default_moderate_interval() -> u64 {
    30
}

const fn default_high_interval() -> u64 {
    15
}

const fn default_critical_interval() -> u64 {
    5
}

const fn default_extreme_interval() -> u64 {
    2
}

const fn default_global_cooldown() -> u64 {
    30
}

const fn default_faction_multiplier() -> f64 {
    0.5
}

const fn default_faction_weight() -> u32 {
    10
}

const fn default_catalog_timeout_ms() -> u64 {
    5_000
}

fn default_trigger_type() -> String {
    "dynamic".to_owned()
}

fn default_catalog_url() -> String {
    "http://localhost:3000/api/events".to_owned()
}

const fn default_tick_interval_ms() -> u64 {
    1_000
}

fn default_world_state_path() -> String {
    "world-state.json".to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_log_format() -> String {
    "pretty".to_owned()
}
