use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::trace;

use crate::clock::Clock;
use crate::command::{Command, CommandOutcome};
use crate::error::{GridError, GridResult};
use crate::execution_proxy::ExecutionProxy;
use crate::state::BucketState;

/// Local execution authority holding the bucket state in this process.
///
/// The state lives behind an async mutex, which serializes the command stream
/// exactly as the [`ExecutionProxy`] contract requires: a command holds the
/// lock from refill settlement through its answer, so concurrent callers can
/// never observe or produce a torn decision.
///
/// The proxy carries its own [`Clock`]. In production that is the shared
/// [`MonotonicClock`](crate::MonotonicClock); tests hand the same
/// [`ManualClock`](crate::ManualClock) to the proxy and the bucket so both
/// sides observe the same virtual time.
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
/// assert!(bucket.try_consume(20).await?);
/// # Ok(())
/// # }
/// ```
pub struct InProcessProxy {
    /// Authoritative state; `None` until `set_initial_state`
    state: Mutex<Option<BucketState>>,
    /// The authority's own time source
    clock: Arc<dyn Clock>,
}

impl InProcessProxy {
    /// Creates an uninitialized authority running on `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        InProcessProxy {
            state: Mutex::new(None),
            clock,
        }
    }
}

#[async_trait]
impl ExecutionProxy for InProcessProxy {
    async fn set_initial_state(&self, state: BucketState) -> GridResult<()> {
        let mut slot = self.state.lock().await;
        if slot.is_some() {
            return Err(GridError::AlreadyInitialized);
        }
        trace!(available = state.available(), capacity = state.capacity(), "installing initial state");
        *slot = Some(state);
        Ok(())
    }

    async fn execute(&self, command: Command) -> GridResult<CommandOutcome> {
        let mut slot = self.state.lock().await;
        let state = slot.as_mut().ok_or(GridError::Uninitialized)?;
        let now = self.clock.now();
        let outcome = command.apply(state, now)?;
        trace!(?command, ?outcome, now, "applied command");
        Ok(outcome)
    }
}
