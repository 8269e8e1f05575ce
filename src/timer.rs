use std::time::Duration;

/// Represents a timer inside of the chip
/// infrastruture, it will count down to
/// zero from what ever number it was given.
///
/// The timer does not know anything about time itself, every call to
/// [`tick`](Timer::tick) is a single 60Hz period.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    value: u8,
}

impl Timer {
    /// Will create a new timer with the given value.
    pub fn new(value: u8) -> Self {
        Self { value }
    }

    /// Will set the value from which the timer shall count down from.
    pub fn set_value(&mut self, value: u8) {
        self.value = value;
    }

    /// Will get the value that the counter is currently at.
    pub fn get_value(&self) -> u8 {
        self.value
    }

    /// Counts down by one, stays at zero.
    pub fn tick(&mut self) {
        self.value = self.value.saturating_sub(1);
    }

    pub fn is_active(&self) -> bool {
        self.value > 0
    }
}

/// Turns elapsed wall-clock time into a whole number of fixed-rate
/// events. The part of the elapsed time that does not fill a whole
/// interval is kept for the next call.
///
/// A single call never returns more than one second's worth of events,
/// anything above that is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    interval: Duration,
    accumulated: Duration,
    max_due: u32,
}

impl Pacer {
    /// Creates a pacer firing `hertz` times per second.
    ///
    /// # Example
    /// ```rust
    /// # use chip::timer::Pacer;
    /// # use std::time::Duration;
    /// let mut pacer = Pacer::from_hertz(60);
    /// assert_eq!(pacer.advance(Duration::from_millis(10)), 0);
    /// assert_eq!(pacer.advance(Duration::from_millis(10)), 1);
    /// ```
    pub fn from_hertz(hertz: u64) -> Self {
        assert!(hertz > 0, "A pacer needs a frequency above zero.");
        Self::new(Duration::from_nanos(1_000_000_000 / hertz))
    }

    pub fn new(interval: Duration) -> Self {
        assert!(!interval.is_zero(), "A pacer needs an interval above zero.");
        let per_second = Duration::from_secs(1).as_nanos() / interval.as_nanos();
        Self {
            interval,
            accumulated: Duration::ZERO,
            max_due: per_second.clamp(1, u32::MAX as u128) as u32,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The most events a single [`advance`](Pacer::advance) returns.
    pub fn max_due(&self) -> u32 {
        self.max_due
    }

    /// Adds the elapsed time and returns how many intervals are due.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        let accumulated = self.accumulated.saturating_add(elapsed).as_nanos();
        let interval = self.interval.as_nanos();

        let due = accumulated / interval;
        if due > self.max_due as u128 {
            log::debug!(
                "pacer fell behind by {} intervals, dropping {}",
                due,
                due - self.max_due as u128
            );
            self.accumulated = Duration::ZERO;
            return self.max_due;
        }

        // the remainder is smaller than the interval
        let rest = accumulated % interval;
        self.accumulated = Duration::new(
            (rest / 1_000_000_000) as u64,
            (rest % 1_000_000_000) as u32,
        );
        due as u32
    }

    /// Time until the next interval is due.
    pub fn remaining(&self) -> Duration {
        self.interval - self.accumulated
    }

    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
    }
}
