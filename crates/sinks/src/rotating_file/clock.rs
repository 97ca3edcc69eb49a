//! Wall-clock sources for rotation decisions

use std::fmt;

use chrono::{Local, NaiveDateTime};

/// Source of the local wall-clock time used for naming and boundaries
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current local date and time
    fn now(&self) -> NaiveDateTime;
}

/// Reads the system clock in the local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[cfg(any(test, feature = "test-util"))]
pub use manual::ManualClock;

#[cfg(any(test, feature = "test-util"))]
mod manual {
    use chrono::{NaiveDateTime, TimeDelta};
    use parking_lot::Mutex;

    use super::Clock;

    /// Clock that only moves when told to
    ///
    /// Used to drive rotation across boundaries without sleeping.
    #[derive(Debug)]
    pub struct ManualClock {
        now: Mutex<NaiveDateTime>,
    }

    impl ManualClock {
        pub fn new(start: NaiveDateTime) -> Self {
            Self {
                now: Mutex::new(start),
            }
        }

        /// Jump to an absolute instant
        pub fn set(&self, now: NaiveDateTime) {
            *self.now.lock() = now;
        }

        /// Move forward (or backward, for negative deltas)
        pub fn advance(&self, delta: TimeDelta) {
            let mut now = self.now.lock();
            *now += delta;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> NaiveDateTime {
            *self.now.lock()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};

    #[test]
    fn test_manual_clock_set_and_advance() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(TimeDelta::minutes(31));
        assert_eq!(clock.now(), start + TimeDelta::minutes(31));

        clock.set(start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
