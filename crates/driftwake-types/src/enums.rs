//! Enumeration types for the Driftwake event scheduler.
//!
//! Zone and radiation classify the player's current location; mission tiers
//! feed the active-mission risk factor; [`RiskLevel`] is the five-bracket
//! bucketing of the 0-100 risk score.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Location classifiers
// ---------------------------------------------------------------------------

/// Broad classification of the space the player is currently in.
///
/// Zones are unordered: conditions test membership, and risk looks the zone
/// up in a configured table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Zone {
    /// Sparse traffic, little background noise.
    Quiet,
    /// Ordinary shipping lanes.
    #[default]
    Normal,
    /// Unlit regions with poor sensor coverage.
    Dark,
    /// Heavy interference, sensors degraded.
    Static,
    /// Deep space far from any beacon.
    Void,
}

impl Zone {
    /// All zones in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Quiet,
        Self::Normal,
        Self::Dark,
        Self::Static,
        Self::Void,
    ];

    /// Wire name of the zone.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quiet => "quiet",
            Self::Normal => "normal",
            Self::Dark => "dark",
            Self::Static => "static",
            Self::Void => "void",
        }
    }
}

/// Ambient radiation band at the player's location.
///
/// Radiation is ordered `Low < Moderate < High < Extreme`; range conditions
/// compare on this order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Radiation {
    /// Background levels.
    #[default]
    Low,
    /// Noticeable exposure.
    Moderate,
    /// Shielding required.
    High,
    /// Lethal without heavy shielding.
    Extreme,
}

impl Radiation {
    /// Wire name of the radiation band.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Extreme => "extreme",
        }
    }
}

// ---------------------------------------------------------------------------
// Missions
// ---------------------------------------------------------------------------

/// Danger tier of an accepted mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum MissionTier {
    /// Courier runs and similar.
    LowRisk,
    /// Escorts, salvage in patrolled space.
    MediumRisk,
    /// Contested space, likely combat.
    HighRisk,
    /// Expected to be fatal for the unprepared.
    Deadly,
}

impl MissionTier {
    /// Raw risk points this tier contributes to the active-mission factor.
    pub const fn risk_points(self) -> u32 {
        match self {
            Self::LowRisk => 5,
            Self::MediumRisk => 15,
            Self::HighRisk => 30,
            Self::Deadly => 50,
        }
    }
}

// ---------------------------------------------------------------------------
// Risk brackets
// ---------------------------------------------------------------------------

/// Five-bracket bucketing of the 0-100 risk score.
///
/// | Level    | Score range |
/// |----------|-------------|
/// | Low      | `< 20`      |
/// | Moderate | `20..40`    |
/// | High     | `40..60`    |
/// | Critical | `60..80`    |
/// | Extreme  | `>= 80`     |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum RiskLevel {
    /// Score below 20.
    Low,
    /// Score in `[20, 40)`.
    Moderate,
    /// Score in `[40, 60)`.
    High,
    /// Score in `[60, 80)`.
    Critical,
    /// Score of 80 or more.
    Extreme,
}

impl RiskLevel {
    /// All levels from calmest to most dangerous.
    pub const ALL: [Self; 5] = [
        Self::Low,
        Self::Moderate,
        Self::High,
        Self::Critical,
        Self::Extreme,
    ];

    /// Bucket a risk score. NaN is treated as the calmest bracket.
    pub fn from_score(score: f64) -> Self {
        if score.is_nan() || score < 20.0 {
            Self::Low
        } else if score < 40.0 {
            Self::Moderate
        } else if score < 60.0 {
            Self::High
        } else if score < 80.0 {
            Self::Critical
        } else {
            Self::Extreme
        }
    }

    /// Upper-case label shown on the HUD.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Moderate => "MODERATE",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
            Self::Extreme => "EXTREME",
        }
    }

    /// Color token the HUD maps to its palette.
    pub const fn color(self) -> &'static str {
        match self {
            Self::Low => "green",
            Self::Moderate => "yellow",
            Self::High => "orange",
            Self::Critical => "red",
            Self::Extreme => "purple",
        }
    }

    /// One-line flavour description of the bracket.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Low => "Quiet space. Encounters are unlikely.",
            Self::Moderate => "Some activity on the scopes. Stay alert.",
            Self::High => "Hostile attention is building.",
            Self::Critical => "Something is hunting this sector.",
            Self::Extreme => "Every signal is a threat. Leave if you can.",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
