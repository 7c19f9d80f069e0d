//! Fixed-period tick scheduling for hosting the controller in real time.
//!
//! Deadlines are absolute, so sleep jitter does not accumulate. When the
//! caller falls behind by more than a period the schedule re-anchors at the
//! current instant instead of firing a burst of catch-up ticks.

use std::time::{Duration, Instant};

/// Periodic deadline generator.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    next_deadline: Instant,
}

impl Ticker {
    /// First deadline is one period from now.
    pub fn every(period: Duration) -> Self {
        Self::starting_at(period, Instant::now())
    }

    /// First deadline is one period after `start`.
    pub fn starting_at(period: Duration, start: Instant) -> Self {
        Self {
            period,
            next_deadline: start + period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Change the period. The pending deadline is kept; later ones use the new period.
    pub fn set_period(&mut self, period: Duration) {
        if period != self.period {
            log::debug!("[ticker] period {:?} -> {period:?}", self.period);
            self.period = period;
        }
    }

    /// Compute how long to wait from `now` and advance to the following deadline.
    ///
    /// Returns `(wait, missed)`: `missed` counts whole deadlines that already
    /// passed before `now` and were skipped.
    pub fn advance_from(&mut self, now: Instant) -> (Duration, u32) {
        if now <= self.next_deadline {
            let wait = self.next_deadline - now;
            self.next_deadline += self.period;
            return (wait, 0);
        }

        let late = now - self.next_deadline;
        let missed = if self.period.is_zero() {
            0
        } else {
            u32::try_from(late.as_nanos() / self.period.as_nanos()).unwrap_or(u32::MAX)
        };
        self.next_deadline = now + self.period;
        (Duration::ZERO, missed)
    }

    /// Block until the next deadline. Returns the number of skipped deadlines.
    pub fn next(&mut self) -> u32 {
        let (wait, missed) = self.advance_from(Instant::now());
        if missed > 0 {
            log::debug!("[ticker] behind schedule, skipped {missed} tick(s)");
        }
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }
        missed
    }
}
