//! Time sources.
//!
//! Timestamps throughout the crate are real-valued seconds since the Unix
//! epoch. The [`Clock`] trait lets hosts supply wall-clock time while tests
//! drive a [`ManualClock`].

use std::cell::Cell;

use chrono::Utc;

/// Supplies the current time as seconds since the Unix epoch.
pub trait Clock {
    fn now(&self) -> f64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

/// Wall-clock time from the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[expect(
        clippy::cast_precision_loss,
        reason = "epoch milliseconds fit in f64 mantissa for any realistic date"
    )]
    fn now(&self) -> f64 {
        Utc::now().timestamp_millis() as f64 / 1000.0
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub const fn new(start: f64) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Moves the clock to an absolute timestamp.
    pub fn set(&self, timestamp: f64) {
        self.now.set(timestamp);
    }

    /// Moves the clock forward (or backward, for negative values).
    pub fn advance(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[expect(clippy::float_cmp, reason = "manual clock values are exact")]
    fn manual_clock_moves_only_when_told() {
        let clock = ManualClock::new(100.0);
        assert_eq!(clock.now(), 100.0);
        clock.advance(30.5);
        assert_eq!(clock.now(), 130.5);
        clock.set(10.0);
        assert_eq!(clock.now(), 10.0);
    }

    #[test]
    fn system_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now() > 1_577_836_800.0);
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "manual clock values are exact")]
    fn clock_works_through_reference() {
        fn read<C: Clock>(clock: C) -> f64 {
            clock.now()
        }

        let clock = ManualClock::new(5.0);
        assert_eq!(read(&clock), 5.0);
    }
}
