//! Trailing-edge debouncing.
//!
//! Every [`Debouncer::submit`] replaces the pending value and pushes the
//! deadline to `now + delay`. The caller schedules a wake-up at the returned
//! deadline; when a wake-up arrives, [`Debouncer::fire`] yields the value only
//! if no later submission has moved the deadline past `now`. Stale wake-ups
//! therefore fall through, and only the last value of a burst is released,
//! once.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    deadline: Option<Instant>,
    pending: Option<T>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Supersede any pending value with `value`.
    ///
    /// Returns the instant at which the caller should call [`Self::fire`].
    pub fn submit(&mut self, value: T, now: Instant) -> Instant {
        let deadline = now + self.delay;
        self.pending = Some(value);
        self.deadline = Some(deadline);
        deadline
    }

    /// Release the pending value if its quiescence window has elapsed.
    pub fn fire(&mut self, now: Instant) -> Option<T> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }

    /// Drop the pending value without releasing it.
    pub fn cancel(&mut self) -> Option<T> {
        self.deadline = None;
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}
