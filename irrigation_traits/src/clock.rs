use chrono::NaiveDate;
use std::time::Instant;

/// Monotonic clock abstraction for session timing across the stack.
///
/// - now(): returns a monotonic Instant
/// - today(): calendar date used to stamp history records
pub trait Clock {
    fn now(&self) -> Instant;

    /// Local calendar date.
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Default, real-time monotonic clock backed by std::time::Instant.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_clock {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Deterministic test clock whose time can be advanced manually.
    ///
    /// now() = origin + offset
    #[derive(Debug, Clone)]
    pub struct TestClock {
        origin: Instant,
        offset: Arc<Mutex<Duration>>,
        date: Arc<Mutex<NaiveDate>>,
    }

    impl Default for TestClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                offset: Arc::new(Mutex::new(Duration::ZERO)),
                date: Arc::new(Mutex::new(NaiveDate::default())),
            }
        }

        /// Clock pinned to a calendar date.
        pub fn on(date: NaiveDate) -> Self {
            let clock = Self::new();
            clock.set_date(date);
            clock
        }

        /// Advance the clock by the given duration.
        pub fn advance(&self, d: Duration) {
            if let Ok(mut off) = self.offset.lock() {
                *off = off.saturating_add(d);
            }
        }

        /// Advance by fractional seconds.
        pub fn advance_secs(&self, secs: f64) {
            self.advance(Duration::from_secs_f64(secs));
        }

        /// Set the absolute offset relative to origin (useful for tests).
        pub fn set_offset(&self, d: Duration) {
            if let Ok(mut off) = self.offset.lock() {
                *off = d;
            }
        }

        pub fn set_date(&self, date: NaiveDate) {
            if let Ok(mut d) = self.date.lock() {
                *d = date;
            }
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Instant {
            let off = self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO);
            self.origin + off
        }

        fn today(&self) -> NaiveDate {
            self.date.lock().map(|g| *g).unwrap_or_default()
        }
    }

}
