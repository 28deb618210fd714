//! Per-client window counters.
//!
//! # Responsibilities
//! - Hold one `WindowCounter` per client identity
//! - Provide atomic read-modify-write per key
//! - Drop counters whose window has elapsed (housekeeping only)
//!
//! # Design Decisions
//! - Narrow trait so a shared backing store can replace the in-memory map
//! - Counters are process-local in `MemoryStore`; several processes without
//!   a shared store each enforce their own limit

use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Submission count for one client within the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCounter {
    pub window_start: Instant,
    pub count: u32,
}

impl WindowCounter {
    /// Returns true once `now` has reached the end of the window.
    pub fn is_expired(&self, now: Instant, window: Duration) -> bool {
        now >= self.window_start + window
    }

    /// Time left until the window ends, zero if already elapsed.
    pub fn remaining_window(&self, now: Instant, window: Duration) -> Duration {
        (self.window_start + window).saturating_duration_since(now)
    }
}

/// Storage for window counters keyed by client identity.
pub trait CounterStore: Send + Sync {
    /// Current counter for `identity`, expired or not.
    fn get(&self, identity: &str) -> Option<WindowCounter>;

    /// Start a fresh window `{now, 1}` when there is no counter or the
    /// existing one has expired. Returns the new counter if one was started.
    fn set_if_absent_or_expired(
        &self,
        identity: &str,
        now: Instant,
        window: Duration,
    ) -> Option<WindowCounter>;

    /// Increment the counter and return its updated value.
    fn increment(&self, identity: &str) -> Option<WindowCounter>;

    /// Remove expired counters, returning how many were dropped.
    fn sweep_expired(&self, now: Instant, window: Duration) -> usize;

    /// Number of tracked identities.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory store on a sharded concurrent map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    counters: DashMap<String, WindowCounter>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CounterStore for MemoryStore {
    fn get(&self, identity: &str) -> Option<WindowCounter> {
        self.counters.get(identity).map(|entry| *entry)
    }

    fn set_if_absent_or_expired(
        &self,
        identity: &str,
        now: Instant,
        window: Duration,
    ) -> Option<WindowCounter> {
        let fresh = WindowCounter {
            window_start: now,
            count: 1,
        };

        // The entry guard holds the shard lock, so check-and-reset is atomic.
        let mut entry = self
            .counters
            .entry(identity.to_string())
            .or_insert_with(|| WindowCounter {
                window_start: now,
                count: 0,
            });

        if entry.count == 0 || entry.is_expired(now, window) {
            *entry = fresh;
            Some(fresh)
        } else {
            None
        }
    }

    fn increment(&self, identity: &str) -> Option<WindowCounter> {
        self.counters.get_mut(identity).map(|mut entry| {
            entry.count = entry.count.saturating_add(1);
            *entry
        })
    }

    fn sweep_expired(&self, now: Instant, window: Duration) -> usize {
        let before = self.counters.len();
        self.counters.retain(|_, counter| !counter.is_expired(now, window));
        before.saturating_sub(self.counters.len())
    }

    fn len(&self) -> usize {
        self.counters.len()
    }
}
