//! A distributed token bucket rate limiter for Rust applications.
//!
//! This library splits the classic token bucket into a thin client-side
//! facade and an authoritative state holder that may live anywhere: in the
//! same process, on a remote node, or inside a data grid. The two halves talk
//! through a small closed command protocol, and every capacity decision is
//! made atomically next to the state, so any number of clients can share one
//! bucket without double-spending tokens.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use rate_guard_grid::{Bucket, BucketConfiguration, MonotonicClock};
//! use rate_guard_grid::proxies::InProcessProxy;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> rate_guard_grid::GridResult<()> {
//! // A bucket holding 100 tokens, refilling 10 tokens every 50 milliseconds
//! let clock = Arc::new(MonotonicClock::new());
//! let configuration = BucketConfiguration::new(100, Duration::from_millis(50), 10)?
//!     .with_clock(clock.clone());
//! let proxy = Arc::new(InProcessProxy::new(clock));
//! let bucket = Bucket::new(configuration, proxy).await?;
//!
//! // Take 20 tokens right now, or be told no
//! if bucket.try_consume(20).await? {
//!     println!("request allowed");
//! }
//!
//! // Take 5 tokens, waiting up to 200ms for refills if necessary
//! if bucket.consume_or_await(5, Some(Duration::from_millis(200))).await? {
//!     println!("request allowed after waiting");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Components
//!
//! ## [`Bucket`]
//! The client-side facade. Holds no token state; every operation becomes one
//! command executed at the authority:
//! - [`try_consume`](Bucket::try_consume) - all-or-nothing, never waits
//! - [`consume_as_much_as_possible`](Bucket::consume_as_much_as_possible) -
//!   best effort, never denied
//! - [`consume_or_await`](Bucket::consume_or_await) - all-or-nothing, waits
//!   for refills under an optional time limit
//! - [`create_snapshot`](Bucket::create_snapshot) - captures the state for
//!   persistence or migration
//!
//! ## [`Command`] and [`CommandOutcome`]
//! The closed wire vocabulary between facade and authority. Both enums are
//! serde serializable; outcomes are scalars, never state for client-side
//! decisions.
//!
//! ## [`ExecutionProxy`]
//! The distribution seam. The crate ships
//! [`InProcessProxy`](proxies::InProcessProxy); a networked deployment
//! implements this trait over its own transport and reuses everything else.
//!
//! ## [`BucketState`]
//! The authoritative entity: capacity, refill rate, balance, and the last
//! refill boundary. Refill is lazy and settled at the start of every command.
//!
//! # Core Concepts
//!
//! ## Time
//! All arithmetic runs on monotonic nanoseconds from an injected [`Clock`].
//! Production code uses [`MonotonicClock`]; tests drive a [`ManualClock`] and
//! get fully deterministic refill and waiting behavior.
//!
//! ## Denial Is Not an Error
//! `try_consume` and `consume_or_await` answer `Ok(false)` when the bucket
//! refuses. The `Err` channel ([`GridError`]) is reserved for misuse of the
//! lifecycle, transport failures, malformed snapshots, and interrupted waits.
//!
//! ## Waiting
//! [`consume_or_await`](Bucket::consume_or_await) retries the consume command
//! and sleeps exactly the authority's wait estimate between rounds. With a
//! wait limit it checks the remaining budget before every sleep and gives up
//! early rather than oversleep; a request beyond the bucket's capacity is
//! answered `false` immediately, without sleeping at all.

pub mod bucket;
pub mod clock;
pub mod command;
pub mod config;
pub mod error;
pub mod execution_proxy;
pub mod proxies;
pub mod state;
pub mod types;

pub use bucket::Bucket;
pub use clock::{Clock, Interrupted, ManualClock, MonotonicClock};
pub use command::{Command, CommandOutcome};
pub use config::BucketConfiguration;
pub use error::{GridError, GridResult};
pub use execution_proxy::ExecutionProxy;
pub use state::{BucketState, SNAPSHOT_VERSION};
pub use types::{Nanos, Tokens};
