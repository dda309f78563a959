//! Wall-clock source for the poll engine.
//!
//! Every time-dependent decision in the engine (is this poll active, has it
//! expired, where does a new window end) reads the current instant through
//! [`Clock`]. Production uses [`SystemClock`]; tests drive a
//! [`ManualClock`] so expiry can be exercised without sleeping.
//!
//! All instants are milliseconds since the Unix epoch.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// A source of the current instant.
pub trait Clock: Send + Sync + core::fmt::Debug {
    /// Current time in milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// Reads the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Create a clock frozen at `start_millis`.
    pub const fn new(start_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(start_millis),
        }
    }

    /// Move forward by `millis` (saturating).
    pub fn advance_millis(&self, millis: i64) {
        let current = self.now.load(Ordering::Acquire);
        self.now
            .store(current.saturating_add(millis), Ordering::Release);
    }

    /// Move forward by whole seconds (saturating).
    pub fn advance_secs(&self, secs: i64) {
        self.advance_millis(secs.saturating_mul(1000));
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::Acquire)
    }
}
