//! Wall clock and one-shot timer for deferred teardown.
//!
//! The controller never sleeps. It arms a [`Timer`] against a [`Clock`] and
//! checks it whenever the front end calls `poll`. Tests inject a
//! [`ManualClock`] and move time forward explicitly.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic time source.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Real monotonic time.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Clock whose origin is the moment of creation.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock advanced by hand. Clones share the same time.
///
/// ```rust
/// use std::time::Duration;
/// use resona_core::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// handle.advance(Duration::from_millis(250));
/// assert_eq!(clock.now(), Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// Clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        self.nanos
            .fetch_add(by.as_nanos() as u64, Ordering::AcqRel);
    }

    /// Jump to an absolute time.
    pub fn set(&self, to: Duration) {
        self.nanos.store(to.as_nanos() as u64, Ordering::Release);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::Acquire))
    }
}

/// One-shot deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    deadline: Option<Duration>,
}

impl Timer {
    /// Disarmed timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `after` from `now`, replacing any earlier deadline.
    pub fn arm(&mut self, now: Duration, after: Duration) {
        self.deadline = Some(now + after);
    }

    /// Disarm.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether a deadline is set.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Whether the deadline has been reached.
    pub fn expired(&self, now: Duration) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    /// Time left, zero once expired, `None` when disarmed.
    pub fn remaining(&self, now: Duration) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_sub(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_fires_at_deadline_not_before() {
        let clock = ManualClock::new();
        let mut timer = Timer::new();
        assert!(!timer.expired(clock.now()));

        timer.arm(clock.now(), Duration::from_secs(2));
        clock.advance(Duration::from_millis(1999));
        assert!(!timer.expired(clock.now()));
        assert_eq!(
            timer.remaining(clock.now()),
            Some(Duration::from_millis(1))
        );

        clock.advance(Duration::from_millis(1));
        assert!(timer.expired(clock.now()));
        assert_eq!(timer.remaining(clock.now()), Some(Duration::ZERO));
    }

    #[test]
    fn cancel_disarms() {
        let mut timer = Timer::new();
        timer.arm(Duration::ZERO, Duration::from_secs(1));
        timer.cancel();
        assert!(!timer.is_armed());
        assert!(!timer.expired(Duration::from_secs(5)));
        assert_eq!(timer.remaining(Duration::ZERO), None);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
