//! The event scheduler: adaptive polling, trigger rolls and admission gates.
//!
//! The host owns a [`Scheduler`] value and drives it with [`Scheduler::tick`]
//! from whatever loop it already has; the scheduler has no timers or tasks
//! of its own. Each tick that falls due runs one check:
//!
//! 1. Compute the risk score of the current world.
//! 2. Roll an integer in `[0, 100)`; a roll strictly below the risk attempts
//!    a trigger.
//! 3. A trigger attempt is rejected inside the global cooldown or while
//!    another attempt is in flight. Otherwise the catalog is fetched under a
//!    deadline, filtered, and one event is drawn by weight.
//! 4. The polling interval is recomputed from the risk bracket and a
//!    [`SchedulerEvent::RiskUpdated`] is published.
//!
//! Notifications go out on a [`broadcast`] channel; subscribe with
//! [`Scheduler::subscribe`], or [`Scheduler::subscribe_triggers`] for
//! admissions alone. A [`SchedulerControl`] handle lets other tasks
//! stop the scheduler while a catalog fetch is outstanding; an attempt that
//! resolves after a stop discards its outcome.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use driftwake_types::{
    EventDefinition, EventRecord, RiskAssessment, RiskUpdate, SchedulerStats, WorldState,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::sync::broadcast;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::catalog::{CatalogError, EventCatalog};
use crate::conditions::{CooldownSource, get_eligible_events};
use crate::config::{CheckIntervals, ConfigError, SchedulerConfig};
use crate::cooldown::{CooldownLedger, remaining_after};
use crate::risk::{assess_risk, calculate_risk_breakdown, risk_level};
use crate::selection::select_weighted_event;

/// Capacity of the notification channel.
///
/// A subscriber that falls further behind receives
/// [`broadcast::error::RecvError::Lagged`] and skips ahead.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Exclusive upper bound of the trigger roll.
const ROLL_CEILING: u32 = 100;

/// Errors returned by scheduler lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The supplied configuration failed validation.
    #[error("scheduler configuration rejected: {source}")]
    Configuration {
        /// The validation failure.
        #[from]
        source: ConfigError,
    },
}

/// A notification published by the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerEvent {
    /// An event was selected and admitted.
    EventTriggered {
        /// Catalog ID of the event.
        event_id: String,
        /// Event type used for cooldown bookkeeping.
        event_type: String,
        /// The full catalog entry.
        event: EventDefinition,
        /// Epoch milliseconds of the admission.
        triggered_at: u64,
    },
    /// The risk score or polling interval was recomputed.
    RiskUpdated(RiskUpdate),
}

/// Result of one trigger attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// An event was admitted and published.
    Triggered {
        /// Catalog ID of the admitted event.
        event_id: String,
    },
    /// Rejected: the previous event is too recent.
    GlobalCooldown,
    /// Rejected: another attempt is still waiting on the catalog.
    InFlight,
    /// The scheduler is not running, or was stopped during the fetch.
    Stopped,
    /// The catalog fetch failed or timed out.
    CatalogUnavailable,
    /// Nothing in the catalog may fire right now.
    NoEligibleEvents,
}

/// Result of one event check.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    /// Risk score the roll was compared against.
    pub risk: f64,
    /// The roll, in `[0, 100)`.
    pub roll: u32,
    /// The trigger attempt, if the roll came in under the risk.
    pub attempted: Option<TriggerOutcome>,
}

/// Cloneable handle to a scheduler's run state.
///
/// Shares atomics with the scheduler so a different task can stop it, or
/// observe whether a catalog fetch is outstanding, without borrowing it.
#[derive(Debug, Clone, Default)]
pub struct SchedulerControl {
    running: Arc<AtomicBool>,
    in_flight: Arc<AtomicBool>,
}

impl SchedulerControl {
    /// Stop the scheduler. Ticks become no-ops and an outstanding attempt
    /// discards its outcome.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Whether the scheduler is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Whether a trigger attempt is waiting on the catalog.
    pub fn is_trigger_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn set_running(&self) {
        self.running.store(true, Ordering::Release);
    }

    /// Claim the in-flight slot, or `None` if it is taken.
    fn try_begin_trigger(&self) -> Option<InFlightGuard> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard {
                flag: Arc::clone(&self.in_flight),
            })
    }
}

/// Clears the in-flight flag when dropped, including when the attempt's
/// future is dropped mid-fetch.
#[derive(Debug)]
struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Adaptive, risk-driven event scheduler over an [`EventCatalog`].
#[derive(Debug)]
pub struct Scheduler<C> {
    catalog: C,
    config: Option<SchedulerConfig>,
    world: Option<WorldState>,
    control: SchedulerControl,
    events: broadcast::Sender<SchedulerEvent>,
    /// Admissions only, so risk chatter cannot push them out.
    triggers: broadcast::Sender<SchedulerEvent>,
    rng: SmallRng,
    ledger: CooldownLedger,
    /// Epoch milliseconds of the last check; zero means "never".
    last_check_time: u64,
    last_event_time: Option<u64>,
    /// Current polling interval in seconds.
    current_interval: u64,
    total_checks: u64,
    total_triggers: u64,
}

impl<C> Scheduler<C> {
    /// Create a stopped scheduler with an entropy-seeded RNG.
    pub fn new(catalog: C) -> Self {
        Self::with_rng(catalog, SmallRng::from_rng(&mut rand::rng()))
    }

    /// Create a stopped scheduler with a deterministic RNG.
    pub fn with_seed(catalog: C, seed: u64) -> Self {
        Self::with_rng(catalog, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(catalog: C, rng: SmallRng) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (triggers, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            catalog,
            config: None,
            world: None,
            control: SchedulerControl::default(),
            events,
            triggers,
            rng,
            ledger: CooldownLedger::new(),
            last_check_time: 0,
            last_event_time: None,
            current_interval: CheckIntervals::default().low,
            total_checks: 0,
            total_triggers: 0,
        }
    }

    /// Subscribe to trigger and risk notifications.
    ///
    /// Risk updates go out on every world or config change, so a slow
    /// receiver can lag past admitted events here. Use
    /// [`Self::subscribe_triggers`] when every admission matters.
    pub fn subscribe(&self) -> broadcast::Receiver<SchedulerEvent> {
        self.events.subscribe()
    }

    /// Subscribe to [`SchedulerEvent::EventTriggered`] notifications only.
    ///
    /// At most one event is admitted per global cooldown, so this channel
    /// only lags if a receiver stops reading altogether.
    pub fn subscribe_triggers(&self) -> broadcast::Receiver<SchedulerEvent> {
        self.triggers.subscribe()
    }

    /// A handle that can stop the scheduler from another task.
    pub fn control(&self) -> SchedulerControl {
        self.control.clone()
    }

    /// The catalog this scheduler fetches from.
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    /// The active configuration, once started.
    pub const fn config(&self) -> Option<&SchedulerConfig> {
        self.config.as_ref()
    }

    /// The latest world snapshot, once supplied.
    pub const fn world(&self) -> Option<&WorldState> {
        self.world.as_ref()
    }

    /// Whether the scheduler is running.
    pub fn is_running(&self) -> bool {
        self.control.is_running()
    }

    /// Current polling interval in seconds.
    pub const fn current_interval(&self) -> u64 {
        self.current_interval
    }

    /// When the last event was admitted, in epoch milliseconds.
    pub const fn last_event_time(&self) -> Option<u64> {
        self.last_event_time
    }

    /// Validate `config` and start running against `world`.
    ///
    /// The first tick after starting runs a check immediately. A config
    /// with `enabled: false` is accepted, but ticks do nothing until a
    /// config that enables the scheduler is swapped in.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Configuration`] if `config` fails
    /// validation; the scheduler stays stopped.
    pub fn start(
        &mut self,
        config: SchedulerConfig,
        world: WorldState,
        now_ms: u64,
    ) -> Result<(), SchedulerError> {
        if let Err(source) = config.validate() {
            warn!(error = %source, "refusing to start scheduler");
            self.control.stop();
            return Err(SchedulerError::Configuration { source });
        }

        if !config.enabled {
            info!("scheduler started but disabled by configuration");
        }
        self.config = Some(config);
        self.world = Some(world);
        self.control.set_running();
        self.refresh_interval(now_ms);
        info!(interval_secs = self.current_interval, "scheduler started");
        Ok(())
    }

    /// Stop the scheduler.
    pub fn stop(&self) {
        self.control.stop();
        info!(
            total_checks = self.total_checks,
            total_triggers = self.total_triggers,
            "scheduler stopped"
        );
    }

    /// Replace the world snapshot and republish the risk.
    pub fn update_game_state(&mut self, world: WorldState, now_ms: u64) {
        self.world = Some(world);
        self.refresh_interval(now_ms);
    }

    /// Hot-swap the configuration and republish the risk.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Configuration`] if `config` fails
    /// validation; the previous configuration stays in effect.
    pub fn update_config(
        &mut self,
        config: SchedulerConfig,
        now_ms: u64,
    ) -> Result<(), SchedulerError> {
        if let Err(source) = config.validate() {
            warn!(error = %source, "keeping previous scheduler configuration");
            return Err(SchedulerError::Configuration { source });
        }
        self.config = Some(config);
        self.refresh_interval(now_ms);
        debug!(interval_secs = self.current_interval, "scheduler configuration updated");
        Ok(())
    }

    /// Append a firing to the history and start its type's cooldown.
    pub fn record_event(&mut self, event_id: &str, timestamp: u64, event_type: &str) {
        self.ledger
            .record(EventRecord::new(event_id, event_type, timestamp));
    }

    /// Whether `event_type` is inside its configured cooldown at `now_ms`.
    ///
    /// Types without an entry in `event_cooldowns` never cool down.
    pub fn is_on_cooldown(&self, event_type: &str, now_ms: u64) -> bool {
        self.ledger
            .is_on_cooldown(event_type, self.configured_cooldown(event_type), now_ms)
    }

    /// Time left in `event_type`'s cooldown; zero when free.
    pub fn cooldown_remaining(&self, event_type: &str, now_ms: u64) -> Duration {
        self.ledger
            .cooldown_remaining(event_type, self.configured_cooldown(event_type), now_ms)
    }

    /// Time left before any event may be admitted again; zero when free.
    pub fn global_cooldown_remaining(&self, now_ms: u64) -> Duration {
        match (self.last_event_time, self.config.as_ref()) {
            (Some(last), Some(config)) => remaining_after(last, config.global_cooldown, now_ms),
            _ => Duration::ZERO,
        }
    }

    /// Recorded history, oldest first. At most
    /// [`HISTORY_CAPACITY`](crate::cooldown::HISTORY_CAPACITY) entries.
    pub fn event_history(&self) -> impl ExactSizeIterator<Item = &EventRecord> + '_ {
        self.ledger.history()
    }

    /// Counters combined with a fresh risk score.
    pub fn stats(&self, now_ms: u64) -> SchedulerStats {
        SchedulerStats {
            running: self.is_running(),
            total_checks: self.total_checks,
            total_triggers: self.total_triggers,
            current_risk: self.current_risk(now_ms),
            current_interval: self.current_interval,
            history_len: self.ledger.len(),
            last_event_time: self.last_event_time,
        }
    }

    /// Full risk picture of the current world, if one has been supplied.
    pub fn risk_assessment(&self, now_ms: u64) -> Option<RiskAssessment> {
        let (world, config) = self.world.as_ref().zip(self.config.as_ref())?;
        Some(assess_risk(world, config, now_ms))
    }

    /// Clear cooldowns, history, counters and timing.
    ///
    /// Configuration, world and run state are kept; the next tick checks
    /// immediately.
    pub fn reset(&mut self, now_ms: u64) {
        self.ledger.clear();
        self.last_check_time = 0;
        self.last_event_time = None;
        self.total_checks = 0;
        self.total_triggers = 0;
        self.current_interval = CheckIntervals::default().low;
        self.refresh_interval(now_ms);
        info!("scheduler reset");
    }

    fn configured_cooldown(&self, event_type: &str) -> Option<u64> {
        self.config
            .as_ref()
            .and_then(|config| config.cooldown_for(event_type))
    }

    fn current_risk(&self, now_ms: u64) -> f64 {
        self.world
            .as_ref()
            .zip(self.config.as_ref())
            .map_or(0.0, |(world, config)| {
                calculate_risk_breakdown(world, config, now_ms).total
            })
    }

    /// Ticks act only while running, enabled and supplied with a world.
    fn is_active(&self) -> bool {
        self.is_running()
            && self.world.is_some()
            && self.config.as_ref().is_some_and(|config| config.enabled)
    }

    /// Recompute the polling interval and publish a risk update.
    fn refresh_interval(&mut self, now_ms: u64) {
        let Some((world, config)) = self.world.as_ref().zip(self.config.as_ref()) else {
            return;
        };
        let breakdown = calculate_risk_breakdown(world, config, now_ms);
        let level = risk_level(breakdown.total);
        self.current_interval = config.check_intervals.for_level(level);

        let update = RiskUpdate {
            score: breakdown.total,
            level,
            color: level.color().to_owned(),
            next_check: self.current_interval,
            breakdown,
        };
        debug!(
            score = update.score,
            level = %level,
            next_check_secs = update.next_check,
            "risk updated"
        );
        self.publish(SchedulerEvent::RiskUpdated(update));
    }

    fn publish(&self, event: SchedulerEvent) {
        // No subscribers is not an error.
        if matches!(event, SchedulerEvent::EventTriggered { .. }) {
            self.triggers.send(event.clone()).unwrap_or(0);
        }
        self.events.send(event).unwrap_or(0);
    }
}

impl<C: EventCatalog> Scheduler<C> {
    /// Advance the scheduler to `now_ms`.
    ///
    /// Runs a check when the polling interval has elapsed since the last
    /// one and returns its outcome; returns `None` when nothing was due or
    /// the scheduler is inactive.
    pub async fn tick(&mut self, now_ms: u64) -> Option<CheckOutcome> {
        if !self.is_active() {
            return None;
        }
        let interval_ms = self.current_interval.saturating_mul(1000);
        if now_ms.saturating_sub(self.last_check_time) < interval_ms {
            return None;
        }

        let outcome = self.perform_event_check(now_ms).await;
        self.last_check_time = now_ms;
        self.refresh_interval(now_ms);
        Some(outcome)
    }

    /// Run a check now, ignoring the polling interval.
    pub async fn force_check(&mut self, now_ms: u64) -> CheckOutcome {
        info!("forced event check");
        let outcome = self.perform_event_check(now_ms).await;
        self.last_check_time = now_ms;
        self.refresh_interval(now_ms);
        outcome
    }

    /// Roll against the current risk and attempt a trigger on success.
    pub async fn perform_event_check(&mut self, now_ms: u64) -> CheckOutcome {
        self.total_checks = self.total_checks.saturating_add(1);
        let risk = self.current_risk(now_ms);
        let roll: u32 = self.rng.random_range(0..ROLL_CEILING);

        let attempted = if f64::from(roll) < risk {
            Some(self.attempt_trigger_event(now_ms).await)
        } else {
            None
        };
        debug!(
            check = self.total_checks,
            risk,
            roll,
            attempted = attempted.is_some(),
            "event check"
        );
        CheckOutcome {
            risk,
            roll,
            attempted,
        }
    }

    /// Try to admit one event at `now_ms`.
    ///
    /// Catalog failures are logged and reported as
    /// [`TriggerOutcome::CatalogUnavailable`]; no state changes in that case.
    pub async fn attempt_trigger_event(&mut self, now_ms: u64) -> TriggerOutcome {
        if !self.is_running() {
            return TriggerOutcome::Stopped;
        }

        let remaining = self.global_cooldown_remaining(now_ms);
        if !remaining.is_zero() {
            debug!(?remaining, "global cooldown active");
            return TriggerOutcome::GlobalCooldown;
        }

        let Some(_guard) = self.control.try_begin_trigger() else {
            debug!("trigger attempt already in flight");
            return TriggerOutcome::InFlight;
        };

        let timeout_ms = self
            .config
            .as_ref()
            .map_or_else(default_catalog_timeout_ms, |config| config.catalog_timeout_ms);
        let catalog = match timeout(
            Duration::from_millis(timeout_ms),
            self.catalog.fetch_events(),
        )
        .await
        {
            Ok(Ok(events)) => events,
            Ok(Err(error)) => {
                warn!(%error, "catalog fetch failed, skipping check");
                return TriggerOutcome::CatalogUnavailable;
            }
            Err(_) => {
                let error = CatalogError::Timeout { timeout_ms };
                warn!(%error, "catalog fetch failed, skipping check");
                return TriggerOutcome::CatalogUnavailable;
            }
        };

        if !self.is_running() {
            info!("scheduler stopped during catalog fetch, discarding outcome");
            return TriggerOutcome::Stopped;
        }

        let (Some(world), Some(config)) = (self.world.as_ref(), self.config.as_ref()) else {
            return TriggerOutcome::Stopped;
        };
        let eligible = get_eligible_events(
            &catalog,
            &config.trigger_type,
            world,
            Some(&*self as &dyn CooldownSource),
            now_ms,
        );
        if eligible.is_empty() {
            info!(catalog_size = catalog.len(), "no eligible events");
            return TriggerOutcome::NoEligibleEvents;
        }

        let Some(event) = select_weighted_event(&eligible, &mut self.rng).cloned() else {
            info!(candidates = eligible.len(), "no candidate carries weight");
            return TriggerOutcome::NoEligibleEvents;
        };

        let event_id = event.id.clone();
        let event_type = event.event_type().to_owned();
        self.total_triggers = self.total_triggers.saturating_add(1);
        self.last_event_time = Some(now_ms);
        info!(
            event_id = %event_id,
            event_type = %event_type,
            candidates = eligible.len(),
            "event triggered"
        );
        self.publish(SchedulerEvent::EventTriggered {
            event_id: event_id.clone(),
            event_type: event_type.clone(),
            event,
            triggered_at: now_ms,
        });
        self.record_event(&event_id, now_ms, &event_type);

        TriggerOutcome::Triggered { event_id }
    }
}

impl<C> CooldownSource for Scheduler<C> {
    fn is_on_cooldown(&self, event_type: &str, now_ms: u64) -> bool {
        Self::is_on_cooldown(self, event_type, now_ms)
    }
}

fn default_catalog_timeout_ms() -> u64 {
    SchedulerConfig::default().catalog_timeout_ms
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use driftwake_types::{
        ConditionClause, Conditions, Location, Mission, MissionTier, NumericRange, Radiation,
        RiskLevel, Zone,
    };
    use tokio::sync::Notify;

    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::cooldown::HISTORY_CAPACITY;

    const T0: u64 = 1_700_000_000_000;

    /// A catalog that always fails.
    struct FailingCatalog;

    impl EventCatalog for FailingCatalog {
        async fn fetch_events(&self) -> Result<Vec<EventDefinition>, CatalogError> {
            Err(CatalogError::Unsuccessful)
        }
    }

    /// A catalog that never answers within any reasonable deadline.
    struct SlowCatalog;

    impl EventCatalog for SlowCatalog {
        async fn fetch_events(&self) -> Result<Vec<EventDefinition>, CatalogError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(vec![hazard("late")])
        }
    }

    /// A catalog that answers only once its gate is opened.
    struct GatedCatalog {
        gate: Arc<Notify>,
        events: Vec<EventDefinition>,
    }

    impl EventCatalog for GatedCatalog {
        async fn fetch_events(&self) -> Result<Vec<EventDefinition>, CatalogError> {
            self.gate.notified().await;
            Ok(self.events.clone())
        }
    }

    fn hazard(id: &str) -> EventDefinition {
        EventDefinition::new(id, "dynamic").with_tag("hazard")
    }

    fn config() -> SchedulerConfig {
        let mut config = SchedulerConfig::default();
        config.event_cooldowns.insert("hazard".to_owned(), 60);
        config
    }

    /// A world whose every factor saturates, so the score is 100.
    fn dangerous_world() -> WorldState {
        WorldState {
            wake: 1.0,
            location: Location {
                zone: Zone::Void,
                radiation: Radiation::Extreme,
                near_hostile: true,
                near_derelict: true,
                poi_type: None,
            },
            time_in_system: 100.0,
            event_history: (0..10)
                .map(|i| EventRecord::new(format!("old_{i}"), "combat", T0 - 1_000))
                .collect(),
            active_missions: vec![
                Mission {
                    tier: MissionTier::Deadly,
                },
                Mission {
                    tier: MissionTier::Deadly,
                },
            ],
            ..WorldState::default()
        }
    }

    fn started<C>(catalog: C) -> Scheduler<C> {
        let mut scheduler = Scheduler::with_seed(catalog, 7);
        scheduler.start(config(), dangerous_world(), T0).unwrap();
        scheduler
    }

    fn risk_update(rx: &mut broadcast::Receiver<SchedulerEvent>) -> Option<RiskUpdate> {
        match rx.try_recv() {
            Ok(SchedulerEvent::RiskUpdated(update)) => Some(update),
            _ => None,
        }
    }

    fn triggers(rx: &mut broadcast::Receiver<SchedulerEvent>) -> Vec<String> {
        let mut ids = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let SchedulerEvent::EventTriggered { event_id, .. } = event {
                ids.push(event_id);
            }
        }
        ids
    }

    #[test]
    fn record_event_starts_configured_cooldown() {
        let mut scheduler = started(StaticCatalog::default());
        scheduler.record_event("hazard_01", T0, "hazard");

        assert!(scheduler.is_on_cooldown("hazard", T0 + 30_000));
        assert_eq!(
            scheduler.cooldown_remaining("hazard", T0 + 30_000),
            Duration::from_secs(30)
        );
        assert!(!scheduler.is_on_cooldown("hazard", T0 + 61_000));
        // No configured duration, no cooldown.
        scheduler.record_event("ambush_01", T0, "combat");
        assert!(!scheduler.is_on_cooldown("combat", T0 + 1));
    }

    #[test]
    fn history_is_bounded() {
        let mut scheduler = started(StaticCatalog::default());
        for i in 0..25_u64 {
            scheduler.record_event(&format!("event_{i}"), T0 + i, "hazard");
        }
        let ids: Vec<&str> = scheduler.event_history().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), HISTORY_CAPACITY);
        assert_eq!(ids.first(), Some(&"event_5"));
        assert_eq!(ids.last(), Some(&"event_24"));
    }

    #[test]
    fn invalid_config_keeps_scheduler_stopped() {
        let mut scheduler = Scheduler::with_seed(StaticCatalog::default(), 1);
        let mut bad = SchedulerConfig::default();
        bad.check_intervals.low = 0;

        let result = scheduler.start(bad, WorldState::default(), T0);
        assert!(matches!(result, Err(SchedulerError::Configuration { .. })));
        assert!(!scheduler.is_running());
        assert!(scheduler.config().is_none());
    }

    #[test]
    fn start_publishes_risk_update() {
        let mut scheduler = Scheduler::with_seed(StaticCatalog::default(), 1);
        let mut rx = scheduler.subscribe();
        scheduler.start(config(), dangerous_world(), T0).unwrap();

        let update = risk_update(&mut rx).unwrap();
        assert!((update.score - 100.0).abs() < f64::EPSILON);
        assert_eq!(update.level, RiskLevel::Extreme);
        assert_eq!(update.next_check, 2);
        assert_eq!(scheduler.current_interval(), 2);
    }

    #[test]
    fn update_game_state_recomputes_interval() {
        let mut scheduler = started(StaticCatalog::default());
        let mut rx = scheduler.subscribe();

        scheduler.update_game_state(WorldState::default(), T0);
        let update = risk_update(&mut rx).unwrap();
        // Default world: normal zone (30) scaled by 30% gives 9.
        assert_eq!(update.level, RiskLevel::Low);
        assert_eq!(scheduler.current_interval(), 60);
    }

    #[test]
    fn rejected_config_update_keeps_previous() {
        let mut scheduler = started(StaticCatalog::default());
        let mut bad = config();
        bad.check_intervals.extreme = 90;

        assert!(scheduler.update_config(bad, T0).is_err());
        assert_eq!(scheduler.config(), Some(&config()));
    }

    #[tokio::test]
    async fn attempt_admits_and_records() {
        let mut scheduler = started(StaticCatalog::new(vec![hazard("hazard_01")]));
        let mut rx = scheduler.subscribe();

        let outcome = scheduler.attempt_trigger_event(T0).await;
        assert_eq!(
            outcome,
            TriggerOutcome::Triggered {
                event_id: "hazard_01".to_owned()
            }
        );
        assert_eq!(triggers(&mut rx), vec!["hazard_01"]);
        assert_eq!(scheduler.last_event_time(), Some(T0));
        assert_eq!(scheduler.stats(T0).total_triggers, 1);
        assert!(scheduler.is_on_cooldown("hazard", T0 + 1_000));
    }

    #[tokio::test]
    async fn trigger_channel_survives_risk_backlog() {
        let mut scheduler = started(StaticCatalog::new(vec![hazard("hazard_01")]));
        let mut all = scheduler.subscribe();
        let mut admitted = scheduler.subscribe_triggers();

        assert!(matches!(
            scheduler.attempt_trigger_event(T0).await,
            TriggerOutcome::Triggered { .. }
        ));
        for _ in 0..=EVENT_CHANNEL_CAPACITY {
            scheduler.update_game_state(dangerous_world(), T0);
        }

        assert!(matches!(
            all.try_recv(),
            Err(broadcast::error::TryRecvError::Lagged(_))
        ));
        assert!(triggers(&mut all).is_empty());
        assert_eq!(triggers(&mut admitted), vec!["hazard_01"]);
    }

    #[tokio::test]
    async fn global_cooldown_blocks_second_event() {
        let catalog = StaticCatalog::new(vec![
            hazard("hazard_01"),
            EventDefinition::new("ambush_01", "dynamic").with_tag("combat"),
        ]);
        let mut scheduler = started(catalog);
        let mut rx = scheduler.subscribe();

        assert!(matches!(
            scheduler.attempt_trigger_event(T0).await,
            TriggerOutcome::Triggered { .. }
        ));
        assert_eq!(
            scheduler.attempt_trigger_event(T0 + 10_000).await,
            TriggerOutcome::GlobalCooldown
        );
        assert_eq!(triggers(&mut rx).len(), 1);
        assert_eq!(
            scheduler.global_cooldown_remaining(T0 + 10_000),
            Duration::from_secs(20)
        );
    }

    #[tokio::test]
    async fn type_cooldown_filters_gated_events() {
        let gated = hazard("hazard_02").with_conditions(Conditions::new().with_cooldown(60.0));
        let mut scheduler = started(StaticCatalog::new(vec![gated]));
        scheduler.record_event("hazard_01", T0, "hazard");

        assert_eq!(
            scheduler.attempt_trigger_event(T0 + 30_000).await,
            TriggerOutcome::NoEligibleEvents
        );
        assert!(matches!(
            scheduler.attempt_trigger_event(T0 + 61_000).await,
            TriggerOutcome::Triggered { .. }
        ));
    }

    #[tokio::test]
    async fn unmet_conditions_abort_quietly() {
        let picky = hazard("calm_only").with_conditions(
            Conditions::new().with(ConditionClause::WakeRange(NumericRange::new(None, Some(0.1)))),
        );
        let mut scheduler = started(StaticCatalog::new(vec![picky]));

        assert_eq!(
            scheduler.attempt_trigger_event(T0).await,
            TriggerOutcome::NoEligibleEvents
        );
        assert_eq!(scheduler.stats(T0).total_triggers, 0);
        assert_eq!(scheduler.last_event_time(), None);
    }

    #[tokio::test]
    async fn catalog_failure_leaves_state_untouched() {
        let mut scheduler = started(FailingCatalog);
        let mut rx = scheduler.subscribe();

        assert_eq!(
            scheduler.attempt_trigger_event(T0).await,
            TriggerOutcome::CatalogUnavailable
        );
        assert!(triggers(&mut rx).is_empty());
        assert_eq!(scheduler.event_history().len(), 0);
        assert_eq!(scheduler.last_event_time(), None);
        assert!(!scheduler.control().is_trigger_in_flight());
    }

    #[tokio::test(start_paused = true)]
    async fn catalog_timeout_is_a_soft_failure() {
        let mut scheduler = started(SlowCatalog);
        let mut config = config();
        config.catalog_timeout_ms = 50;
        scheduler.update_config(config, T0).unwrap();

        assert_eq!(
            scheduler.attempt_trigger_event(T0).await,
            TriggerOutcome::CatalogUnavailable
        );
        assert_eq!(scheduler.stats(T0).total_triggers, 0);
        assert!(!scheduler.control().is_trigger_in_flight());
    }

    #[tokio::test]
    async fn stop_during_fetch_discards_outcome() {
        let gate = Arc::new(Notify::new());
        let catalog = GatedCatalog {
            gate: Arc::clone(&gate),
            events: vec![hazard("hazard_01")],
        };
        let mut scheduler = started(catalog);
        let mut rx = scheduler.subscribe();
        let control = scheduler.control();

        let (outcome, ()) = tokio::join!(scheduler.attempt_trigger_event(T0), async {
            while !control.is_trigger_in_flight() {
                tokio::task::yield_now().await;
            }
            control.stop();
            gate.notify_one();
        });

        assert_eq!(outcome, TriggerOutcome::Stopped);
        assert!(triggers(&mut rx).is_empty());
        assert_eq!(scheduler.event_history().len(), 0);
        assert!(!control.is_trigger_in_flight());
    }

    #[tokio::test]
    async fn second_attempt_in_flight_is_rejected() {
        let mut scheduler = started(StaticCatalog::new(vec![hazard("hazard_01")]));
        let control = scheduler.control();

        let guard = control.try_begin_trigger().unwrap();
        assert!(control.is_trigger_in_flight());
        assert_eq!(
            scheduler.attempt_trigger_event(T0).await,
            TriggerOutcome::InFlight
        );

        drop(guard);
        assert!(!control.is_trigger_in_flight());
        assert!(matches!(
            scheduler.attempt_trigger_event(T0).await,
            TriggerOutcome::Triggered { .. }
        ));
    }

    #[tokio::test]
    async fn tick_respects_interval() {
        let mut scheduler = started(StaticCatalog::new(vec![hazard("hazard_01")]));

        // First tick always checks.
        let first = scheduler.tick(T0).await.unwrap();
        assert!(matches!(
            first.attempted,
            Some(TriggerOutcome::Triggered { .. })
        ));
        // Extreme risk polls every 2 seconds.
        assert!(scheduler.tick(T0 + 1_999).await.is_none());
        assert!(scheduler.tick(T0 + 2_000).await.is_some());
        assert_eq!(scheduler.stats(T0 + 2_000).total_checks, 2);
    }

    #[tokio::test]
    async fn tick_is_inert_when_stopped_or_disabled() {
        let mut scheduler = Scheduler::with_seed(StaticCatalog::default(), 3);
        assert!(scheduler.tick(T0).await.is_none());

        let mut disabled = config();
        disabled.enabled = false;
        scheduler.start(disabled, dangerous_world(), T0).unwrap();
        assert!(scheduler.is_running());
        assert!(scheduler.tick(T0).await.is_none());

        scheduler.update_config(config(), T0).unwrap();
        assert!(scheduler.tick(T0).await.is_some());

        scheduler.stop();
        assert!(scheduler.tick(T0 + 60_000).await.is_none());
        assert_eq!(
            scheduler.attempt_trigger_event(T0 + 60_000).await,
            TriggerOutcome::Stopped
        );
    }

    #[tokio::test]
    async fn low_risk_rolls_never_attempt() {
        let mut scheduler = Scheduler::with_seed(StaticCatalog::new(vec![hazard("h")]), 11);
        let mut calm = config();
        calm.risk_weights.location = 0;
        scheduler.start(calm, WorldState::default(), T0).unwrap();

        for i in 0..50_u64 {
            let outcome = scheduler.force_check(T0 + i).await;
            assert!(outcome.risk.abs() < f64::EPSILON);
            assert!(outcome.roll < 100);
            assert!(outcome.attempted.is_none());
        }
        assert_eq!(scheduler.stats(T0).total_checks, 50);
    }

    #[tokio::test]
    async fn reset_clears_counters_and_cooldowns() {
        let mut scheduler = started(StaticCatalog::new(vec![hazard("hazard_01")]));
        let _ = scheduler.force_check(T0).await;
        assert_eq!(scheduler.stats(T0).total_triggers, 1);

        scheduler.reset(T0 + 1);
        let stats = scheduler.stats(T0 + 1);
        assert_eq!(stats.total_checks, 0);
        assert_eq!(stats.total_triggers, 0);
        assert_eq!(stats.history_len, 0);
        assert_eq!(stats.last_event_time, None);
        assert!(stats.running);
        assert!(!scheduler.is_on_cooldown("hazard", T0 + 1));
        assert_eq!(scheduler.global_cooldown_remaining(T0 + 1), Duration::ZERO);
        assert!(scheduler.tick(T0 + 1).await.is_some());
    }

    #[test]
    fn risk_assessment_needs_world_and_config() {
        let scheduler = Scheduler::with_seed(StaticCatalog::default(), 5);
        assert!(scheduler.risk_assessment(T0).is_none());
        assert!(scheduler.stats(T0).current_risk.abs() < f64::EPSILON);

        let scheduler = started(StaticCatalog::default());
        let assessment = scheduler.risk_assessment(T0).unwrap();
        assert_eq!(assessment.label, "EXTREME");
        assert_eq!(assessment.check_interval, 2);
    }
}
