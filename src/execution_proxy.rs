//! The boundary between a bucket facade and its state authority.
//!
//! [`ExecutionProxy`] is the only seam the crate defines for distribution.
//! The facade side builds [`Command`]s and interprets [`CommandOutcome`]s; a
//! proxy implementation carries them to wherever the [`BucketState`] actually
//! lives. The crate ships [`InProcessProxy`](crate::proxies::InProcessProxy)
//! for single-process use and tests; networked deployments implement this
//! trait over their own transport.

use async_trait::async_trait;

use crate::command::{Command, CommandOutcome};
use crate::error::GridResult;
use crate::state::BucketState;

/// Executes commands against an authoritative [`BucketState`].
///
/// # Contract
///
/// * Commands are applied atomically, with no interleaving between
///   concurrently submitted commands. Every implementation must serialize its
///   command stream against the state it owns.
/// * `now` passed to [`Command::apply`] comes from the authority's own clock,
///   never from a caller.
/// * Transport failures surface as
///   [`GridError::Transport`](crate::GridError::Transport). The caller must
///   assume the command may or may not have been applied.
#[async_trait]
pub trait ExecutionProxy: Send + Sync {
    /// Installs the bucket's initial state.
    ///
    /// Succeeds exactly once per authority. A second call answers
    /// [`GridError::AlreadyInitialized`](crate::GridError::AlreadyInitialized)
    /// and leaves the existing state untouched.
    ///
    /// The state is stored verbatim. When it originates from a snapshot taken
    /// under a different clock, [`BucketState::rebase`] it first.
    async fn set_initial_state(&self, state: BucketState) -> GridResult<()>;

    /// Applies one command to the authoritative state and returns its outcome.
    ///
    /// Answers [`GridError::Uninitialized`](crate::GridError::Uninitialized)
    /// if no initial state has been installed yet.
    async fn execute(&self, command: Command) -> GridResult<CommandOutcome>;
}
