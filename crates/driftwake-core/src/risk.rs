//! Risk scoring: world state in, bounded 0-100 score out.
//!
//! The score is the clamped sum of six independent contributions:
//!
//! | Factor          | Raw sub-score                                            | Scaling            |
//! |-----------------|----------------------------------------------------------|--------------------|
//! | Wake            | `wake`                                                   | `* weights.wake`   |
//! | Location        | zone + radiation + 20 if hostile + 15 if derelict        | `* weight / 100`   |
//! | Time in system  | `hours * 2`                                              | `* weight / 100`   |
//! | Recent events   | `10 *` events in the last 30 minutes                     | `* weight / 100`   |
//! | Active missions | 5 / 15 / 30 / 50 per low / medium / high / deadly        | `* weight / 100`   |
//! | Faction         | base chance + distance below threshold * multiplier      | `* weight / 100`   |
//!
//! Every raw sub-score except wake is clamped to `[0, 100]` before scaling.
//! Wake is multiplied by its weight directly, so a weight of 40 lets wake
//! alone contribute up to 40 points while the other factors contribute at
//! most their weight. That asymmetry is long-standing behaviour and is
//! pinned by `wake_contribution_is_not_percentage_scaled` below.
//!
//! All functions here are pure; the caller supplies `now_ms`.

use driftwake_types::{RiskAssessment, RiskBreakdown, RiskLevel, WorldState};

use crate::config::SchedulerConfig;

/// Window in which past events count towards recent-event pressure.
pub const RECENT_EVENT_WINDOW_MS: u64 = 30 * 60 * 1000;

/// Upper bound of the score and of every raw sub-score.
pub const MAX_RISK: f64 = 100.0;

/// Location risk for zones missing from the lookup table.
const DEFAULT_ZONE_RISK: i32 = 30;

/// Radiation risk for bands missing from the lookup table.
const DEFAULT_RADIATION_RISK: i32 = 0;

/// Extra location risk when a hostile contact is near.
const NEAR_HOSTILE_RISK: f64 = 20.0;

/// Extra location risk when a derelict is near.
const NEAR_DERELICT_RISK: f64 = 15.0;

/// Raw risk per recent event.
const RECENT_EVENT_RISK: f64 = 10.0;

/// Raw risk per hour in system.
const TIME_RISK_PER_HOUR: f64 = 2.0;

/// Compute the risk score for a world state.
///
/// The result is always in `[0, 100]`.
pub fn calculate_risk_score(world: &WorldState, config: &SchedulerConfig, now_ms: u64) -> f64 {
    calculate_risk_breakdown(world, config, now_ms).total
}

/// Compute every contribution to the risk score along with the total.
pub fn calculate_risk_breakdown(
    world: &WorldState,
    config: &SchedulerConfig,
    now_ms: u64,
) -> RiskBreakdown {
    let weights = &config.risk_weights;

    let wake = unit_interval(world.wake) * f64::from(weights.wake);
    let location = scaled(location_sub_score(world, config), weights.location);
    let time_in_system = scaled(time_sub_score(world.time_in_system), weights.time_in_system);
    let recent_events = scaled(recent_event_sub_score(world, now_ms), weights.recent_events);
    let active_missions = scaled(mission_sub_score(world), weights.active_missions);
    let faction = if config.faction_standing_risk.enabled {
        scaled(
            faction_sub_score(world, config),
            config.faction_standing_risk.weight,
        )
    } else {
        0.0
    };

    let total = clamp_score(
        wake + location + time_in_system + recent_events + active_missions + faction,
    );

    RiskBreakdown {
        wake,
        location,
        time_in_system,
        recent_events,
        active_missions,
        faction,
        total,
    }
}

/// Bucket a score into its risk bracket.
pub fn risk_level(score: f64) -> RiskLevel {
    RiskLevel::from_score(score)
}

/// Polling interval, in seconds, for a score.
///
/// Non-increasing in `score` as long as the configured table is (which
/// [`SchedulerConfig::validate`] enforces).
pub fn check_interval(score: f64, config: &SchedulerConfig) -> u64 {
    config.check_intervals.for_level(risk_level(score))
}

/// Full risk picture for the HUD.
pub fn assess_risk(world: &WorldState, config: &SchedulerConfig, now_ms: u64) -> RiskAssessment {
    let breakdown = calculate_risk_breakdown(world, config, now_ms);
    let level = risk_level(breakdown.total);
    RiskAssessment {
        score: breakdown.total,
        level,
        label: level.label().to_owned(),
        color: level.color().to_owned(),
        description: level.description().to_owned(),
        check_interval: config.check_intervals.for_level(level),
        breakdown,
    }
}

// ---------------------------------------------------------------------------
// Raw sub-scores
// ---------------------------------------------------------------------------

fn location_sub_score(world: &WorldState, config: &SchedulerConfig) -> f64 {
    let location = &world.location;
    let zone = config
        .location_risk
        .get(&location.zone)
        .copied()
        .unwrap_or(DEFAULT_ZONE_RISK);
    let radiation = config
        .radiation_risk
        .get(&location.radiation)
        .copied()
        .unwrap_or(DEFAULT_RADIATION_RISK);

    let mut raw = f64::from(zone) + f64::from(radiation);
    if location.near_hostile {
        raw += NEAR_HOSTILE_RISK;
    }
    if location.near_derelict {
        raw += NEAR_DERELICT_RISK;
    }
    clamp_score(raw)
}

fn time_sub_score(hours: f64) -> f64 {
    clamp_score(non_negative(hours) * TIME_RISK_PER_HOUR)
}

fn recent_event_sub_score(world: &WorldState, now_ms: u64) -> f64 {
    let recent = world
        .event_history
        .iter()
        .filter(|record| now_ms.saturating_sub(record.timestamp) < RECENT_EVENT_WINDOW_MS)
        .count();
    let recent = u32::try_from(recent).unwrap_or(u32::MAX);
    clamp_score(f64::from(recent) * RECENT_EVENT_RISK)
}

fn mission_sub_score(world: &WorldState) -> f64 {
    let points = world
        .active_missions
        .iter()
        .fold(0_u32, |acc, mission| acc.saturating_add(mission.tier.risk_points()));
    clamp_score(f64::from(points))
}

fn faction_sub_score(world: &WorldState, config: &SchedulerConfig) -> f64 {
    let settings = &config.faction_standing_risk;
    let raw: f64 = settings
        .factions
        .iter()
        .filter_map(|tracked| {
            let standing = world.standing(&tracked.id)?;
            (standing < settings.threshold).then(|| {
                non_negative(tracked.base_encounter_chance)
                    + standing_gap(standing, settings.threshold) * settings.multiplier
            })
        })
        .sum();
    clamp_score(raw)
}

// ---------------------------------------------------------------------------
// Numeric hygiene
// ---------------------------------------------------------------------------

/// Clamp into `[0, 100]`, mapping NaN to 0.
fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, MAX_RISK)
    }
}

/// Clamp a raw sub-score and scale it by `weight / 100`.
fn scaled(sub_score: f64, weight: u32) -> f64 {
    clamp_score(sub_score) * f64::from(weight) / 100.0
}

/// Clamp into `[0, 1]`, mapping NaN to 0.
fn unit_interval(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Clamp below at 0, mapping NaN to 0.
fn non_negative(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.max(0.0) }
}

/// Absolute distance between a standing and the hostility threshold.
#[allow(clippy::cast_precision_loss)]
fn standing_gap(standing: i64, threshold: i64) -> f64 {
    standing.abs_diff(threshold) as f64
}
