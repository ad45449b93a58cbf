//! The client-side bucket facade.
//!
//! A [`Bucket`] holds no token state of its own. Every operation builds one
//! [`Command`], hands it to the [`ExecutionProxy`], and interprets the scalar
//! outcome; the authoritative [`BucketState`] never leaves the authority
//! except as an explicit snapshot. The facade is cheap to clone and share:
//! it is two `Arc`s.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::clock::{saturating_nanos, Clock};
use crate::command::{Command, CommandOutcome};
use crate::config::BucketConfiguration;
use crate::error::{GridError, GridResult};
use crate::execution_proxy::ExecutionProxy;
use crate::state::BucketState;
use crate::types::{Nanos, Tokens};

/// Client-side handle to one distributed token bucket.
///
/// All capacity decisions happen on the authority side, atomically per
/// command, so any number of `Bucket` handles (in any number of processes)
/// can share one bucket without double-spending tokens. A denied request is
/// an ordinary answer, not an error; the `Err` channel is reserved for
/// transport and protocol failures.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
/// use rate_guard_grid::{Bucket, BucketConfiguration, MonotonicClock};
/// use rate_guard_grid::proxies::InProcessProxy;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> rate_guard_grid::GridResult<()> {
/// let clock = Arc::new(MonotonicClock::new());
/// let configuration = BucketConfiguration::new(100, Duration::from_millis(10), 5)?
///     .with_clock(clock.clone());
/// let proxy = Arc::new(InProcessProxy::new(clock));
/// let bucket = Bucket::new(configuration, proxy).await?;
///
/// // The bucket starts full
/// assert!(bucket.try_consume(100).await?);
/// assert!(!bucket.try_consume(1).await?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Bucket {
    proxy: Arc<dyn ExecutionProxy>,
    clock: Arc<dyn Clock>,
}

impl Bucket {
    /// Creates a bucket and installs its initial state on the authority.
    ///
    /// The initial state is a full bucket stamped with the configuration
    /// clock's current time. Fails with
    /// [`GridError::AlreadyInitialized`] if the authority already holds
    /// state, or with a transport error if it cannot be reached.
    pub async fn new(
        configuration: BucketConfiguration,
        proxy: Arc<dyn ExecutionProxy>,
    ) -> GridResult<Self> {
        let clock = configuration.clock();
        let initial = configuration.initial_state(clock.now());
        proxy.set_initial_state(initial).await?;
        Ok(Bucket { proxy, clock })
    }

    /// Creates a bucket from a previously captured state.
    ///
    /// `state` is installed verbatim; when it was snapshotted under a clock
    /// other than `clock`, [`BucketState::rebase`] it to `clock.now()` first,
    /// otherwise its refill schedule is anchored to a foreign origin.
    pub async fn restore(
        state: BucketState,
        clock: Arc<dyn Clock>,
        proxy: Arc<dyn ExecutionProxy>,
    ) -> GridResult<Self> {
        proxy.set_initial_state(state).await?;
        Ok(Bucket { proxy, clock })
    }

    /// Consumes whatever is available, up to `limit`, and returns the amount
    /// actually consumed.
    ///
    /// Never denied: an empty bucket yields `Ok(0)`. Pass [`Tokens::MAX`] to
    /// drain the bucket completely.
    pub async fn consume_as_much_as_possible(&self, limit: Tokens) -> GridResult<Tokens> {
        let outcome = self
            .proxy
            .execute(Command::ConsumeAsMuchAsPossible { limit })
            .await?;
        match outcome {
            CommandOutcome::Consumed(consumed) => Ok(consumed),
            other => Err(unexpected("Consumed", &other)),
        }
    }

    /// Consumes exactly `tokens` if available, without waiting.
    ///
    /// Returns `Ok(true)` on admission, `Ok(false)` on denial. Consuming zero
    /// tokens always succeeds; requesting more than capacity always fails.
    pub async fn try_consume(&self, tokens: Tokens) -> GridResult<bool> {
        let outcome = self.proxy.execute(Command::TryConsume { tokens }).await?;
        match outcome {
            CommandOutcome::Admitted(admitted) => Ok(admitted),
            other => Err(unexpected("Admitted", &other)),
        }
    }

    /// Consumes exactly `tokens`, waiting for refills when they are not yet
    /// available.
    ///
    /// With `wait_limit = None` the call waits as long as it takes. With
    /// `Some(limit)`, the call gives up with `Ok(false)` once admission
    /// within `limit` (measured from the start of the call) is no longer
    /// possible; it never oversleeps the limit just to discover a denial.
    ///
    /// A request larger than the bucket's capacity can never be admitted and
    /// answers `Ok(false)` immediately, without sleeping, whatever the limit.
    ///
    /// Waiting happens on the bucket's [`Clock`]. If the clock abandons a
    /// sleep, the call fails with [`GridError::Interrupted`]; interruption is
    /// never folded into a `false` denial.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use std::time::Duration;
    /// use rate_guard_grid::{Bucket, BucketConfiguration, ManualClock};
    /// use rate_guard_grid::proxies::InProcessProxy;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> rate_guard_grid::GridResult<()> {
    /// let clock = Arc::new(ManualClock::new());
    /// let configuration = BucketConfiguration::new(10, Duration::from_millis(100), 1)?
    ///     .with_clock(clock.clone());
    /// let proxy = Arc::new(InProcessProxy::new(clock.clone()));
    /// let bucket = Bucket::new(configuration, proxy).await?;
    ///
    /// // Drain the bucket, then wait out one refill interval for a token
    /// assert_eq!(bucket.consume_as_much_as_possible(u64::MAX).await?, 10);
    /// assert!(bucket.consume_or_await(1, None).await?);
    /// assert_eq!(clock.sleeps(), vec![Duration::from_millis(100)]);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn consume_or_await(
        &self,
        tokens: Tokens,
        wait_limit: Option<Duration>,
    ) -> GridResult<bool> {
        let command = Command::ConsumeOrCalculateTimeToCloseDeficit { tokens };
        // The start time only matters when the wait is bounded
        let deadline = wait_limit.map(|limit| (self.clock.now(), saturating_nanos(limit)));

        loop {
            let wait = match self.proxy.execute(command.clone()).await? {
                CommandOutcome::TimeToCloseDeficit(wait) => wait,
                other => return Err(unexpected("TimeToCloseDeficit", &other)),
            };

            if wait == 0 {
                return Ok(true);
            }
            if wait == Nanos::MAX {
                debug!(tokens, "request exceeds capacity, deficit can never close");
                return Ok(false);
            }

            if let Some((started, limit)) = deadline {
                let waited = self.clock.now().saturating_sub(started);
                if waited >= limit {
                    debug!(tokens, waited, limit, "wait limit exhausted");
                    return Ok(false);
                }
                // Never start a sleep that would overshoot the limit
                if wait >= limit - waited {
                    debug!(tokens, wait, remaining = limit - waited, "deficit outlasts the wait limit");
                    return Ok(false);
                }
            }

            trace!(tokens, wait, "sleeping until the deficit closes");
            self.clock.sleep(Duration::from_nanos(wait)).await?;
        }
    }

    /// Captures the bucket's current state for persistence or migration.
    ///
    /// The authority settles pending refills, encodes its state as versioned
    /// bytes, and the facade decodes them back into a [`BucketState`]. Taking
    /// a snapshot consumes nothing; under a frozen clock it is idempotent.
    pub async fn create_snapshot(&self) -> GridResult<BucketState> {
        let outcome = self.proxy.execute(Command::CreateSnapshot).await?;
        match outcome {
            CommandOutcome::Snapshot(bytes) => BucketState::from_snapshot_bytes(&bytes),
            other => Err(unexpected("Snapshot", &other)),
        }
    }
}

fn unexpected(expected: &'static str, actual: &CommandOutcome) -> GridError {
    GridError::UnexpectedOutcome {
        expected,
        actual: actual.kind(),
    }
}
