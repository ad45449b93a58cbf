//! error.rs
//! Error and result types for bucket construction and command execution.
//!
//! Denied consumption is never an error: every capacity decision comes back
//! as a regular command outcome. The variants here cover what can go wrong
//! around the protocol itself, misuse of the bucket lifecycle, transport
//! failures, malformed snapshots, and interrupted waits.

use thiserror::Error;

use crate::clock::Interrupted;

/// Error type for bucket construction and command execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// The bucket configuration is invalid (zero capacity, zero refill, ...).
    #[error("invalid bucket configuration: {0}")]
    Configuration(String),

    /// `set_initial_state` was called on an authority that already holds state.
    #[error("bucket state has already been initialized")]
    AlreadyInitialized,

    /// A command was executed before the authority received its initial state.
    #[error("bucket state has not been initialized")]
    Uninitialized,

    /// The command could not reach the authority, or the reply was lost.
    ///
    /// The command may or may not have been applied; callers must treat the
    /// attempt as failed without assuming anything about remote state.
    #[error("transport failure while executing command: {0}")]
    Transport(String),

    /// The authority answered with an outcome shape the command never produces.
    #[error("authority returned {actual} where {expected} was expected")]
    UnexpectedOutcome {
        expected: &'static str,
        actual: &'static str,
    },

    /// A snapshot could not be serialized.
    #[error("failed to encode bucket snapshot: {0}")]
    SnapshotEncode(String),

    /// Snapshot bytes were malformed or violated a state invariant.
    #[error("failed to decode bucket snapshot: {0}")]
    SnapshotDecode(String),

    /// Snapshot bytes carry a version this build does not understand.
    #[error("unsupported snapshot version {0}")]
    UnsupportedSnapshotVersion(u8),

    /// A blocked wait was interrupted before the tokens became available.
    ///
    /// Distinct from an `Ok(false)` denial: the caller asked to stop waiting,
    /// the bucket did not refuse.
    #[error("wait interrupted: {0}")]
    Interrupted(#[from] Interrupted),
}

/// Result type for all fallible bucket operations.
pub type GridResult<T> = Result<T, GridError>;
