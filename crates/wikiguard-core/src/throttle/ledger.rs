//! In-memory failure counters, keyed by [`TrackingKey`].
//!
//! The ledger is not synchronized. It is owned by exactly one
//! [`ThrottleActor`](super::ThrottleActor), which serializes every access.

use super::key::TrackingKey;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Failure count and time of the most recent failure for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureRecord {
    pub count: u32,
    pub last_failure: Instant,
}

#[derive(Debug, Default)]
pub struct FailureLedger {
    records: HashMap<TrackingKey, FailureRecord>,
}

impl FailureLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of failures recorded for `key`, 0 if there is no record.
    pub fn count(&self, key: &TrackingKey) -> u32 {
        self.records.get(key).map_or(0, |r| r.count)
    }

    pub fn get(&self, key: &TrackingKey) -> Option<&FailureRecord> {
        self.records.get(key)
    }

    /// Record one failed attempt at `now`, creating the record on first use.
    pub fn record_failure(&mut self, key: &TrackingKey, now: Instant) {
        let record = self
            .records
            .entry(key.clone())
            .or_insert(FailureRecord {
                count: 0,
                last_failure: now,
            });
        record.count = record.count.saturating_add(1);
        record.last_failure = now;
    }

    /// Remove every record whose last failure is more than `drop_after` before `now`.
    ///
    /// Returns the number of removed records.
    pub fn drop_stale(&mut self, now: Instant, drop_after: Duration) -> usize {
        let before = self.records.len();
        self.records
            .retain(|_, record| now.saturating_duration_since(record.last_failure) <= drop_after);
        before - self.records.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
