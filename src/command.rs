//! The command vocabulary executed against authoritative bucket state.
//!
//! Every bucket operation is expressed as one of four [`Command`]s. A command
//! travels to wherever the [`BucketState`] lives, is applied there as a single
//! atomic step, and answers with a small scalar [`CommandOutcome`]. State
//! never travels back for client-side decisions, so two clients hammering the
//! same bucket can never double-spend a token.
//!
//! The vocabulary is closed: authorities match exhaustively and adding a
//! variant is a compile-visible protocol change.

use serde::{Deserialize, Serialize};

use crate::error::GridResult;
use crate::state::BucketState;
use crate::types::{Nanos, Tokens};

/// A single atomic instruction for the bucket authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Consume whatever is available, up to `limit`, and report the amount.
    ///
    /// Never fails on capacity grounds: an empty bucket consumes 0.
    ConsumeAsMuchAsPossible { limit: Tokens },

    /// Consume exactly `tokens`, or nothing at all.
    TryConsume { tokens: Tokens },

    /// Consume exactly `tokens` if possible; otherwise estimate the wait.
    ///
    /// Answers [`CommandOutcome::TimeToCloseDeficit`] with `0` when the tokens
    /// were consumed, [`Nanos::MAX`] when the request can never be satisfied
    /// (it exceeds capacity), and otherwise the minimum nanoseconds until
    /// enough refills land, assuming nobody else consumes meanwhile.
    ConsumeOrCalculateTimeToCloseDeficit { tokens: Tokens },

    /// Capture the current state as versioned snapshot bytes.
    ///
    /// Pending refills are settled first, so the snapshot reflects the balance
    /// an immediately following command would see.
    CreateSnapshot,
}

/// The scalar answer to one [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandOutcome {
    /// Tokens actually consumed by [`Command::ConsumeAsMuchAsPossible`].
    Consumed(Tokens),
    /// Whether [`Command::TryConsume`] took the tokens.
    Admitted(bool),
    /// Wait estimate from [`Command::ConsumeOrCalculateTimeToCloseDeficit`];
    /// `0` means the tokens were consumed.
    TimeToCloseDeficit(Nanos),
    /// Snapshot bytes from [`Command::CreateSnapshot`].
    Snapshot(Vec<u8>),
}

impl CommandOutcome {
    /// Variant name, used in protocol mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            CommandOutcome::Consumed(_) => "Consumed",
            CommandOutcome::Admitted(_) => "Admitted",
            CommandOutcome::TimeToCloseDeficit(_) => "TimeToCloseDeficit",
            CommandOutcome::Snapshot(_) => "Snapshot",
        }
    }
}

impl Command {
    /// Applies this command to `state` at time `now` on the authority's clock.
    ///
    /// This is the only place authoritative state changes. Authorities must
    /// call it under whatever mechanism serializes their command stream, and
    /// must pass a `now` from the same clock that stamped the state.
    ///
    /// Refills elapsed since the previous command are settled before the
    /// command acts, whichever variant it is.
    pub fn apply(&self, state: &mut BucketState, now: Nanos) -> GridResult<CommandOutcome> {
        state.refill(now);
        match *self {
            Command::ConsumeAsMuchAsPossible { limit } => {
                Ok(CommandOutcome::Consumed(state.consume_up_to(limit)))
            }
            Command::TryConsume { tokens } => {
                Ok(CommandOutcome::Admitted(state.try_consume(tokens)))
            }
            Command::ConsumeOrCalculateTimeToCloseDeficit { tokens } => {
                if state.try_consume(tokens) {
                    Ok(CommandOutcome::TimeToCloseDeficit(0))
                } else {
                    Ok(CommandOutcome::TimeToCloseDeficit(
                        state.time_to_close_deficit(tokens, now),
                    ))
                }
            }
            Command::CreateSnapshot => Ok(CommandOutcome::Snapshot(state.to_snapshot_bytes()?)),
        }
    }
}
