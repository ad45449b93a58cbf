//! Client-side bucket configuration.
//!
//! A [`BucketConfiguration`] captures the bucket's shape (capacity and refill
//! rate) plus the clock the client side runs on. It is validated up front:
//! a configuration that would make the refill arithmetic meaningless is
//! rejected at construction instead of misbehaving later.

use std::sync::Arc;
use std::time::Duration;

use crate::clock::{saturating_nanos, Clock, MonotonicClock};
use crate::error::{GridError, GridResult};
use crate::state::BucketState;
use crate::types::{Nanos, Tokens};

/// Validated parameters for creating a bucket.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use rate_guard_grid::BucketConfiguration;
///
/// // Capacity 100, refilling 5 tokens every 10 milliseconds
/// let configuration = BucketConfiguration::new(100, Duration::from_millis(10), 5).unwrap();
/// assert_eq!(configuration.capacity(), 100);
///
/// // Misconfigurations fail fast
/// assert!(BucketConfiguration::new(0, Duration::from_millis(10), 5).is_err());
/// assert!(BucketConfiguration::new(100, Duration::ZERO, 5).is_err());
/// assert!(BucketConfiguration::new(100, Duration::from_millis(10), 0).is_err());
/// assert!(BucketConfiguration::new(100, Duration::from_secs(u64::MAX), 5).is_err());
/// ```
#[derive(Clone)]
pub struct BucketConfiguration {
    capacity: Tokens,
    refill_interval: Duration,
    refill_amount: Tokens,
    clock: Arc<dyn Clock>,
}

impl BucketConfiguration {
    /// Creates a configuration with the default [`MonotonicClock`].
    ///
    /// # Parameters
    ///
    /// * `capacity` - Maximum number of tokens the bucket can hold
    /// * `refill_interval` - Time between refill events
    /// * `refill_amount` - Tokens added per refill event
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Configuration`] if any parameter is zero or the
    /// interval does not fit in 64-bit nanoseconds.
    pub fn new(
        capacity: Tokens,
        refill_interval: Duration,
        refill_amount: Tokens,
    ) -> GridResult<Self> {
        if capacity == 0 {
            return Err(GridError::Configuration(
                "capacity must be greater than 0".to_string(),
            ));
        }
        if refill_interval.is_zero() {
            return Err(GridError::Configuration(
                "refill_interval must be greater than 0".to_string(),
            ));
        }
        if Nanos::try_from(refill_interval.as_nanos()).is_err() {
            return Err(GridError::Configuration(
                "refill_interval exceeds the representable nanosecond range".to_string(),
            ));
        }
        if refill_amount == 0 {
            return Err(GridError::Configuration(
                "refill_amount must be greater than 0".to_string(),
            ));
        }

        Ok(BucketConfiguration {
            capacity,
            refill_interval,
            refill_amount,
            clock: Arc::new(MonotonicClock::new()),
        })
    }

    /// Replaces the clock, usually with a [`ManualClock`](crate::ManualClock)
    /// in tests.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Maximum number of tokens the bucket can hold.
    pub fn capacity(&self) -> Tokens {
        self.capacity
    }

    /// Time between refill events.
    pub fn refill_interval(&self) -> Duration {
        self.refill_interval
    }

    /// Tokens added per refill event.
    pub fn refill_amount(&self) -> Tokens {
        self.refill_amount
    }

    /// The clock this configuration's bucket will run on.
    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    /// Builds the initial state for this configuration: a full bucket with
    /// its refill schedule anchored at `now`.
    pub fn initial_state(&self, now: Nanos) -> BucketState {
        BucketState::new(
            self.capacity,
            saturating_nanos(self.refill_interval),
            self.refill_amount,
            now,
        )
    }
}
