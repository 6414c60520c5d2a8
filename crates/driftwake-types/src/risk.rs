//! Risk and scheduler payloads published to the HUD.
//!
//! These are plain data projections: the scheduler fills them in, the
//! telemetry/HUD layer renders them. They derive `ts-rs` so the dashboard
//! can share the exact shapes.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::RiskLevel;

/// Per-factor contributions to a risk score, already scaled by weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct RiskBreakdown {
    /// `wake * weights.wake`.
    pub wake: f64,
    /// Zone, radiation and proximity sub-score scaled by its weight.
    pub location: f64,
    /// Time-in-system sub-score scaled by its weight.
    pub time_in_system: f64,
    /// Recent-event pressure scaled by its weight.
    pub recent_events: f64,
    /// Active-mission risk scaled by its weight.
    pub active_missions: f64,
    /// Hostile-faction pressure scaled by its weight (zero when disabled).
    pub faction: f64,
    /// Sum of the contributions clamped to `[0, 100]`.
    pub total: f64,
}

/// Emitted whenever the scheduler recomputes its polling interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct RiskUpdate {
    /// Current risk score in `[0, 100]`.
    pub score: f64,
    /// Bracket of the score.
    pub level: RiskLevel,
    /// Color token of the bracket.
    pub color: String,
    /// Seconds until the next scheduled check.
    pub next_check: u64,
    /// Contributions that make up the score.
    pub breakdown: RiskBreakdown,
}

/// Full read-only risk picture, for on-demand HUD queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct RiskAssessment {
    /// Current risk score in `[0, 100]`.
    pub score: f64,
    /// Bracket of the score.
    pub level: RiskLevel,
    /// Upper-case bracket label.
    pub label: String,
    /// Color token of the bracket.
    pub color: String,
    /// Flavour description of the bracket.
    pub description: String,
    /// Polling interval, in seconds, this score maps to.
    pub check_interval: u64,
    /// Contributions that make up the score.
    pub breakdown: RiskBreakdown,
}

/// Scheduler counters combined with a fresh risk score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SchedulerStats {
    /// Whether the scheduler is running.
    pub running: bool,
    /// Checks performed since construction or the last reset.
    pub total_checks: u64,
    /// Events admitted since construction or the last reset.
    pub total_triggers: u64,
    /// Risk score at the time of the query.
    pub current_risk: f64,
    /// Current polling interval in seconds.
    pub current_interval: u64,
    /// Entries currently held in the scheduler's history.
    pub history_len: usize,
    /// When the last event fired, in epoch milliseconds.
    pub last_event_time: Option<u64>,
}
