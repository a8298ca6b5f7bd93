//! Injected time source.
//!
//! Every staleness, grace-window, and expiry decision in the SDK compares
//! against a [`Clock`] rather than calling `Utc::now()` directly, so the
//! whole resolution state machine is testable at fixed instants.

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// A source of "now".
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The production clock: wall time from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A manually-driven clock for tests.
///
/// Exported from the crate proper (not behind `cfg(test)`) so downstream
/// crates can drive it in their own integration tests.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock frozen at the given instant.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Creates a clock frozen at an epoch-seconds timestamp.
    ///
    /// # Panics
    /// Panics if the timestamp is out of chrono's representable range.
    #[must_use]
    pub fn at_epoch(secs: i64) -> Self {
        Self::new(DateTime::from_timestamp(secs, 0).expect("timestamp in range"))
    }

    /// Moves the clock to an absolute instant.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    /// Advances the clock by a duration (negative durations move it back).
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
