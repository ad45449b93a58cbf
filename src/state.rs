//! Authoritative token bucket state and its snapshot wire format.
//!
//! [`BucketState`] is the single entity the execution authority owns. It
//! bundles the bucket's configured shape (capacity and refill rate) with its
//! mutable position (available tokens and the last refill boundary), because
//! commands are evaluated wherever the state lives and must find everything
//! they need inside it.
//!
//! Refill is lazy: nothing ticks in the background. Each command first settles
//! the refills that elapsed since the previous command, then acts on the
//! settled balance.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};
use crate::types::{Nanos, Tokens};

/// Version written as the first byte of every snapshot.
///
/// Decoding rejects any other value with
/// [`GridError::UnsupportedSnapshotVersion`], so the payload layout behind a
/// given version can never be reinterpreted.
pub const SNAPSHOT_VERSION: u8 = 1;

/// Complete state of one token bucket.
///
/// All fields are plain `u64` values, which keeps the snapshot encoding
/// fixed-width and byte-stable. Time fields are nanoseconds on the owning
/// authority's monotonic clock; they are not meaningful under a different
/// clock unless the state is [`rebase`](BucketState::rebase)d first.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use rate_guard_grid::{BucketConfiguration, BucketState};
///
/// let configuration = BucketConfiguration::new(100, Duration::from_millis(10), 5).unwrap();
/// let state = configuration.initial_state(0);
/// assert_eq!(state.available(), 100);
///
/// // Snapshots round-trip exactly
/// let bytes = state.to_snapshot_bytes().unwrap();
/// let restored = BucketState::from_snapshot_bytes(&bytes).unwrap();
/// assert_eq!(restored, state);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketState {
    /// Maximum number of tokens the bucket can hold
    capacity: Tokens,
    /// Nanoseconds between refill events
    refill_interval: Nanos,
    /// Tokens added per refill event
    refill_amount: Tokens,
    /// Tokens currently available
    available: Tokens,
    /// Time of the last settled refill boundary
    last_refill: Nanos,
}

impl BucketState {
    /// Builds the state of a freshly created bucket: full, with the refill
    /// schedule anchored at `now`.
    ///
    /// Callers validate the parameters first; see
    /// [`BucketConfiguration`](crate::BucketConfiguration).
    pub(crate) fn new(
        capacity: Tokens,
        refill_interval: Nanos,
        refill_amount: Tokens,
        now: Nanos,
    ) -> Self {
        BucketState {
            capacity,
            refill_interval,
            refill_amount,
            available: capacity, // Bucket starts full
            last_refill: now,
        }
    }

    /// Maximum number of tokens the bucket can hold.
    pub fn capacity(&self) -> Tokens {
        self.capacity
    }

    /// Nanoseconds between refill events.
    pub fn refill_interval(&self) -> Nanos {
        self.refill_interval
    }

    /// Tokens added per refill event.
    pub fn refill_amount(&self) -> Tokens {
        self.refill_amount
    }

    /// Tokens available as of the last applied command.
    pub fn available(&self) -> Tokens {
        self.available
    }

    /// Time of the last settled refill boundary.
    pub fn last_refill(&self) -> Nanos {
        self.last_refill
    }

    /// Credits every refill interval that fully elapsed between `last_refill`
    /// and `now`, capping the balance at capacity.
    ///
    /// `last_refill` advances only by whole intervals, so partial progress
    /// toward the next refill is never lost between commands.
    pub(crate) fn refill(&mut self, now: Nanos) {
        // A zero interval never refills
        if self.refill_interval == 0 {
            return;
        }

        // Clamp regressions to zero elapsed instead of rejecting them
        let elapsed = now.saturating_sub(self.last_refill);
        let refill_times = elapsed / self.refill_interval;
        if refill_times == 0 {
            return;
        }

        let total_refilled = refill_times.saturating_mul(self.refill_amount);
        self.available = self.available.saturating_add(total_refilled).min(self.capacity);

        // Advance to the boundary of the last settled interval
        self.last_refill = self
            .last_refill
            .saturating_add(refill_times.saturating_mul(self.refill_interval));
    }

    /// Removes up to `limit` tokens and returns how many were removed.
    pub(crate) fn consume_up_to(&mut self, limit: Tokens) -> Tokens {
        let consumed = limit.min(self.available);
        self.available -= consumed;
        consumed
    }

    /// Removes exactly `tokens` if the balance allows it.
    ///
    /// Zero tokens always succeeds; a request above capacity always fails
    /// because `available` can never exceed capacity.
    pub(crate) fn try_consume(&mut self, tokens: Tokens) -> bool {
        if tokens <= self.available {
            self.available -= tokens;
            true
        } else {
            false
        }
    }

    /// Minimum time until `tokens` could be available, assuming no further
    /// consumption.
    ///
    /// Callers settle refills first. Returns `0` when the balance already
    /// covers the request and [`Nanos::MAX`] when it never can (the request
    /// exceeds capacity, or nothing ever refills).
    pub(crate) fn time_to_close_deficit(&self, tokens: Tokens, now: Nanos) -> Nanos {
        if tokens > self.capacity {
            return Nanos::MAX;
        }
        if tokens <= self.available {
            return 0;
        }
        if self.refill_amount == 0 {
            return Nanos::MAX;
        }

        // Whole refills needed to cover the shortfall
        let deficit = tokens - self.available;
        let refills_needed =
            deficit.saturating_add(self.refill_amount - 1) / self.refill_amount;

        // The k-th refill lands at last_refill + k * interval. Waits beyond
        // the representable range collapse into the never-closes marker.
        match refills_needed.checked_mul(self.refill_interval) {
            Some(target) => target.saturating_sub(now.saturating_sub(self.last_refill)),
            None => Nanos::MAX,
        }
    }

    /// Re-anchors the refill schedule at `now`, keeping the token balance.
    ///
    /// Required before installing a snapshot under a clock other than the one
    /// that produced it: `last_refill` is only meaningful relative to the
    /// originating clock's origin. Partial progress toward the next refill is
    /// discarded.
    pub fn rebase(mut self, now: Nanos) -> Self {
        self.last_refill = now;
        self
    }

    /// Encodes the state as versioned, byte-stable snapshot bytes.
    ///
    /// Equal states always produce identical bytes: the payload is the five
    /// `u64` fields in fixed-width little-endian order behind a leading
    /// version byte.
    pub fn to_snapshot_bytes(&self) -> GridResult<Vec<u8>> {
        let payload =
            bincode::serialize(self).map_err(|e| GridError::SnapshotEncode(e.to_string()))?;
        let mut bytes = Vec::with_capacity(1 + payload.len());
        bytes.push(SNAPSHOT_VERSION);
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    /// Decodes snapshot bytes produced by [`to_snapshot_bytes`](Self::to_snapshot_bytes).
    ///
    /// Rejects unknown versions, malformed payloads, and payloads that decode
    /// to a state violating the bucket invariants.
    pub fn from_snapshot_bytes(bytes: &[u8]) -> GridResult<Self> {
        let (version, payload) = bytes
            .split_first()
            .ok_or_else(|| GridError::SnapshotDecode("snapshot is empty".to_string()))?;
        if *version != SNAPSHOT_VERSION {
            return Err(GridError::UnsupportedSnapshotVersion(*version));
        }

        let state: BucketState =
            bincode::deserialize(payload).map_err(|e| GridError::SnapshotDecode(e.to_string()))?;
        state.validate()?;
        Ok(state)
    }

    fn validate(&self) -> GridResult<()> {
        if self.capacity == 0 {
            return Err(GridError::SnapshotDecode("capacity is zero".to_string()));
        }
        if self.refill_interval == 0 {
            return Err(GridError::SnapshotDecode("refill interval is zero".to_string()));
        }
        if self.refill_amount == 0 {
            return Err(GridError::SnapshotDecode("refill amount is zero".to_string()));
        }
        if self.available > self.capacity {
            return Err(GridError::SnapshotDecode(format!(
                "available {} exceeds capacity {}",
                self.available, self.capacity
            )));
        }
        Ok(())
    }
}
