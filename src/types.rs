//! Scalar type aliases shared by the command plane.
//!
//! Every quantity that crosses the execution boundary is a plain unsigned
//! integer so that command and outcome payloads stay trivially serializable
//! and byte-stable across versions. Both aliases are pinned to [`u64`]:
//! widening them would silently change the snapshot wire format.

/// Number of tokens, used for capacities, refill amounts, and consume requests.
pub type Tokens = u64;

/// A point in time or a span of time, in nanoseconds on a monotonic clock.
///
/// At nanosecond resolution a `u64` covers roughly 584 years, far beyond any
/// realistic process lifetime or wait duration. `Nanos::MAX` is reserved as
/// the "deficit can never close" marker and never denotes a real duration.
pub type Nanos = u64;
