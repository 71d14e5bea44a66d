//! Clock abstraction for testable time handling

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// A clock that provides the current time
pub trait Clock: Clone + Send + Sync {
    fn now(&self) -> Instant;
    fn epoch_ms(&self) -> u64;

    /// ISO-8601 rendering of the current time (for durable records).
    fn iso8601(&self) -> String {
        match DateTime::<Utc>::from_timestamp_millis(self.epoch_ms() as i64) {
            Some(dt) => dt.to_rfc3339(),
            None => String::new(),
        }
    }
}

/// `YYYYMMDD_HHMMSS` rendering of an epoch-ms value (checkpoint and archive ids).
pub fn compact_timestamp(epoch_ms: u64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(epoch_ms as i64) {
        Some(dt) => dt.format("%Y%m%d_%H%M%S").to_string(),
        None => "00000000_000000".to_string(),
    }
}

/// `YYYYMMDD` rendering of an epoch-ms value (objective slugs).
pub fn compact_date(epoch_ms: u64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(epoch_ms as i64) {
        Some(dt) => dt.format("%Y%m%d").to_string(),
        None => "00000000".to_string(),
    }
}

/// Real system clock
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Fake clock for testing with controllable time
#[derive(Clone)]
pub struct FakeClock {
    inner: Arc<Mutex<FakeNow>>,
}

struct FakeNow {
    instant: Instant,
    epoch_ms: u64,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeNow {
                instant: Instant::now(),
                epoch_ms: 1_700_000_000_000,
            })),
        }
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut now = self.inner.lock();
        now.instant += duration;
        now.epoch_ms += duration.as_millis() as u64;
    }

    /// Set the epoch milliseconds value
    pub fn set_epoch_ms(&self, ms: u64) {
        self.inner.lock().epoch_ms = ms;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.inner.lock().instant
    }

    fn epoch_ms(&self) -> u64 {
        self.inner.lock().epoch_ms
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
