//! Trigger condition interpreter.
//!
//! An event's conditions are a list of [`ConditionClause`] values. Clauses
//! that were not declared are simply absent from the list, so they pass
//! vacuously; declared clauses are ANDed and evaluation stops at the first
//! failure. The optional per-type cooldown gate runs last and only when a
//! [`CooldownSource`] is supplied.

use driftwake_types::{ConditionClause, EventDefinition, WorldState};
use tracing::trace;

/// Anything that can answer "is this event type cooling down?".
///
/// The scheduler implements this over its cooldown ledger; tests can use a
/// fixed set.
pub trait CooldownSource {
    /// Whether `event_type` is still inside its cooldown at `now_ms`.
    fn is_on_cooldown(&self, event_type: &str, now_ms: u64) -> bool;
}

/// An event that passed filtering, paired with its selection weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EligibleEvent<'a> {
    /// The catalog entry.
    pub event: &'a EventDefinition,
    /// `trigger.weight`, defaulting to 1.0.
    pub weight: f64,
}

/// Decide whether an event's declared conditions hold.
///
/// Returns `true` for an event with no conditions, whatever the world state.
pub fn evaluate_trigger_conditions(
    event: &EventDefinition,
    world: &WorldState,
    cooldowns: Option<&dyn CooldownSource>,
    now_ms: u64,
) -> bool {
    let conditions = &event.trigger.conditions;

    if let Some(failed) = conditions
        .clauses
        .iter()
        .find(|clause| !clause_holds(clause, world))
    {
        trace!(event_id = %event.id, clause = ?failed, "condition not met");
        return false;
    }

    if conditions.cooldown_seconds.is_some()
        && let Some(source) = cooldowns
        && source.is_on_cooldown(event.event_type(), now_ms)
    {
        trace!(
            event_id = %event.id,
            event_type = event.event_type(),
            "event type on cooldown"
        );
        return false;
    }

    true
}

/// Evaluate a single clause against the world state.
pub fn clause_holds(clause: &ConditionClause, world: &WorldState) -> bool {
    match clause {
        ConditionClause::WakeRange(range) => range.contains(world.wake),
        ConditionClause::ZoneSet(zones) => zones.contains(&world.location.zone),
        ConditionClause::RadiationRange(range) => range.contains(world.location.radiation),
        ConditionClause::TimeRange(range) => range.contains(world.time_in_system),
        ConditionClause::FactionRange(requirement) => world
            .standing(&requirement.faction)
            .is_some_and(|standing| standing_in_range(standing, requirement)),
        ConditionClause::PoiTypeSet(types) => world
            .location
            .poi_type
            .as_ref()
            .is_some_and(|poi| types.contains(poi)),
        ConditionClause::ActionEquals(action) => world.action.as_deref() == Some(action.as_str()),
        ConditionClause::NotRecent(ids) => !ids.iter().any(|id| world.has_seen(id)),
    }
}

/// Filter a catalog down to the events that may fire right now.
///
/// An event is eligible when its trigger type matches exactly, it is not
/// explicitly disabled, and its conditions hold.
pub fn get_eligible_events<'a>(
    catalog: &'a [EventDefinition],
    trigger_type: &str,
    world: &WorldState,
    cooldowns: Option<&dyn CooldownSource>,
    now_ms: u64,
) -> Vec<EligibleEvent<'a>> {
    catalog
        .iter()
        .filter(|event| event.trigger.trigger_type == trigger_type)
        .filter(|event| event.is_enabled())
        .filter(|event| evaluate_trigger_conditions(event, world, cooldowns, now_ms))
        .map(|event| EligibleEvent {
            event,
            weight: event.weight(),
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn standing_in_range(standing: i64, requirement: &driftwake_types::FactionRange) -> bool {
    requirement.range().contains(standing as f64)
}
