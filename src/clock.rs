//! Time sources for buckets and authorities.
//!
//! All bucket arithmetic runs on opaque monotonic nanoseconds obtained from a
//! [`Clock`]. Injecting the clock keeps the refill math deterministic under
//! test and lets an embedding choose its own time source. Two implementations
//! ship with the crate:
//!
//! - [`MonotonicClock`] reads the operating system monotonic clock and sleeps
//!   on the tokio timer. This is the clock production code should use.
//! - [`ManualClock`] is a virtual clock driven explicitly by the test that
//!   owns it. Sleeping advances virtual time instead of blocking, and every
//!   sleep is recorded for later inspection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;

use crate::types::Nanos;

/// A sleep was cut short before its duration elapsed.
///
/// Raised by [`Clock::sleep`] implementations that support cancellation, for
/// example a clock whose sleeps race against a shutdown signal. It propagates
/// out of blocking operations as
/// [`GridError::Interrupted`](crate::GridError::Interrupted), which keeps the
/// caller's "stop waiting" request distinguishable from a rate limit denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("sleep interrupted before completion")]
pub struct Interrupted;

/// Monotonic time source with an interruptible sleep.
///
/// `now` values are only meaningful relative to other values from the same
/// clock instance. Implementations must never let `now` decrease.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Returns the current time in nanoseconds since this clock's origin.
    fn now(&self) -> Nanos;

    /// Suspends the caller for `duration`.
    ///
    /// Returns `Err(Interrupted)` if the sleep was abandoned early. An
    /// implementation that cannot be interrupted simply always returns `Ok`.
    async fn sleep(&self, duration: Duration) -> Result<(), Interrupted>;
}

/// Clamps a [`Duration`] into the nanosecond range the bucket operates on.
pub(crate) fn saturating_nanos(duration: Duration) -> Nanos {
    Nanos::try_from(duration.as_nanos()).unwrap_or(Nanos::MAX)
}

/// Production clock backed by [`Instant`] and the tokio timer.
///
/// The origin is fixed at construction, so `now` starts near zero and grows
/// with process uptime. Sleeps are plain `tokio::time::sleep` calls and are
/// never interrupted.
#[derive(Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for MonotonicClock {
    fn now(&self) -> Nanos {
        saturating_nanos(self.origin.elapsed())
    }

    async fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        tokio::time::sleep(duration).await;
        Ok(())
    }
}

/// Virtual clock for deterministic tests.
///
/// Time starts at zero and only moves when [`advance`](ManualClock::advance)
/// is called or a sleep completes. A sleep never blocks: it records the
/// requested duration and advances virtual time by exactly that amount, which
/// is how a waiting bucket observes time passing without any real delay.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use rate_guard_grid::ManualClock;
/// use rate_guard_grid::Clock;
///
/// let clock = ManualClock::new();
/// assert_eq!(clock.now(), 0);
///
/// clock.advance(Duration::from_millis(250));
/// assert_eq!(clock.now(), 250_000_000);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    /// Creates a clock frozen at time zero.
    pub fn new() -> Self {
        ManualClock {
            now: AtomicU64::new(0),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    /// Moves virtual time forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        self.now
            .fetch_add(saturating_nanos(duration), Ordering::SeqCst);
    }

    /// Returns every sleep requested so far, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns how many sleeps have been requested so far.
    pub fn sleep_count(&self) -> usize {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Nanos {
        self.now.load(Ordering::SeqCst)
    }

    async fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
        self.advance(duration);
        Ok(())
    }
}
