// ABOUTME: Time source for token expiry, in whole epoch seconds.
// ABOUTME: SystemClock reads chrono's UTC clock; ManualClock is set explicitly by tests.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// A source of the current time in epoch seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// Wall-clock time, rounded up to the next whole second.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        let now = Utc::now();
        let seconds = now.timestamp();
        if now.timestamp_subsec_nanos() > 0 {
            seconds + 1
        } else {
            seconds
        }
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
