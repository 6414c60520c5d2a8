//! Per-type cooldown ledger and bounded event history.
//!
//! The ledger remembers when each event type last fired and keeps the
//! most recent [`HISTORY_CAPACITY`] records in firing order. Durations are
//! looked up by the caller (they live in the scheduler config and can be
//! hot-swapped), so every query takes the configured cooldown in seconds.

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use driftwake_types::EventRecord;

/// Number of records the history retains.
pub const HISTORY_CAPACITY: usize = 20;

/// Last-fired timestamps per event type plus a bounded history.
#[derive(Debug, Clone, Default)]
pub struct CooldownLedger {
    /// Epoch milliseconds of the latest firing per event type.
    last_fired: BTreeMap<String, u64>,
    /// Most recent records, oldest first.
    history: VecDeque<EventRecord>,
}

impl CooldownLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a firing.
    ///
    /// The record is appended to the history (evicting the oldest entry
    /// once full) and the type's timestamp is advanced. A record older than
    /// the stored timestamp still enters the history but never moves the
    /// cooldown backwards.
    pub fn record(&mut self, record: EventRecord) {
        let last = self
            .last_fired
            .entry(record.event_type.clone())
            .or_insert(record.timestamp);
        *last = (*last).max(record.timestamp);

        while self.history.len() >= HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(record);
    }

    /// When `event_type` last fired, if ever.
    pub fn last_fired(&self, event_type: &str) -> Option<u64> {
        self.last_fired.get(event_type).copied()
    }

    /// Whether `event_type` is still cooling down at `now_ms`.
    ///
    /// A type without a configured cooldown, or one that never fired, is
    /// never on cooldown.
    pub fn is_on_cooldown(&self, event_type: &str, cooldown_secs: Option<u64>, now_ms: u64) -> bool {
        !self
            .cooldown_remaining(event_type, cooldown_secs, now_ms)
            .is_zero()
    }

    /// Time left before `event_type` may fire again; zero when free.
    pub fn cooldown_remaining(
        &self,
        event_type: &str,
        cooldown_secs: Option<u64>,
        now_ms: u64,
    ) -> Duration {
        let (Some(secs), Some(last)) = (cooldown_secs, self.last_fired(event_type)) else {
            return Duration::ZERO;
        };
        remaining_after(last, secs, now_ms)
    }

    /// Recorded history, oldest first.
    pub fn history(&self) -> impl ExactSizeIterator<Item = &EventRecord> + '_ {
        self.history.iter()
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether nothing has been recorded since construction or the last clear.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Forget all timestamps and history.
    pub fn clear(&mut self) {
        self.last_fired.clear();
        self.history.clear();
    }
}

/// Time left in a window of `window_secs` that opened at `since_ms`.
///
/// A `since_ms` in the future counts as zero elapsed time.
pub fn remaining_after(since_ms: u64, window_secs: u64, now_ms: u64) -> Duration {
    let window_ms = window_secs.saturating_mul(1000);
    let elapsed = now_ms.saturating_sub(since_ms);
    Duration::from_millis(window_ms.saturating_sub(elapsed))
}
