//! Execution proxy implementations.
//!
//! This module contains the [`ExecutionProxy`](crate::ExecutionProxy)
//! implementations that ship with the crate.
//!
//! - **[`InProcessProxy`]** - Holds the authoritative state behind an async
//!   mutex in the local process. The reference implementation of the proxy
//!   contract, and the workhorse for tests and single-process deployments.
//!
//! Networked proxies (gRPC, Redis scripts, a data grid entry processor) live
//! outside this crate: they only need to move [`Command`](crate::Command) and
//! [`CommandOutcome`](crate::CommandOutcome) values, both of which are serde
//! serializable, and apply commands under their backend's atomicity primitive.

pub mod in_process;
pub use in_process::InProcessProxy;
