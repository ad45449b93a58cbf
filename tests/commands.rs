use std::time::Duration;

use rate_guard_grid::{BucketConfiguration, BucketState, Command, CommandOutcome};

const MS: u64 = 1_000_000; // nanoseconds per millisecond

fn new_state(capacity: u64, interval_ms: u64, amount: u64) -> BucketState {
    BucketConfiguration::new(capacity, Duration::from_millis(interval_ms), amount)
        .unwrap()
        .initial_state(0)
}

#[test]
fn test_try_consume_all_or_nothing() {
    let mut state = new_state(10, 100, 1);

    // Bucket starts full with 10 tokens
    assert_eq!(
        Command::TryConsume { tokens: 7 }.apply(&mut state, 0),
        Ok(CommandOutcome::Admitted(true))
    );
    // Only 3 left, 5 must be denied without consuming anything
    assert_eq!(
        Command::TryConsume { tokens: 5 }.apply(&mut state, 0),
        Ok(CommandOutcome::Admitted(false))
    );
    assert_eq!(state.available(), 3);
    // The remaining 3 are still there
    assert_eq!(
        Command::TryConsume { tokens: 3 }.apply(&mut state, 0),
        Ok(CommandOutcome::Admitted(true))
    );
    assert_eq!(state.available(), 0);
}

#[test]
fn test_try_consume_zero_tokens_always_succeeds() {
    let mut state = new_state(10, 100, 1);

    // Drain the bucket first
    assert_eq!(
        Command::ConsumeAsMuchAsPossible { limit: u64::MAX }.apply(&mut state, 0),
        Ok(CommandOutcome::Consumed(10))
    );
    assert_eq!(
        Command::TryConsume { tokens: 0 }.apply(&mut state, 0),
        Ok(CommandOutcome::Admitted(true))
    );
}

#[test]
fn test_try_consume_beyond_capacity_fails_even_when_full() {
    let mut state = new_state(10, 100, 1);
    assert_eq!(
        Command::TryConsume { tokens: 11 }.apply(&mut state, 0),
        Ok(CommandOutcome::Admitted(false))
    );
    assert_eq!(state.available(), 10);
}

#[test]
fn test_consume_as_much_as_possible() {
    let mut state = new_state(100, 10, 5);

    // A zero limit consumes nothing and leaves all 100 in place
    assert_eq!(
        Command::ConsumeAsMuchAsPossible { limit: 0 }.apply(&mut state, 0),
        Ok(CommandOutcome::Consumed(0))
    );
    assert_eq!(state.available(), 100);

    // Take 30 of 100
    assert_eq!(
        Command::ConsumeAsMuchAsPossible { limit: 30 }.apply(&mut state, 0),
        Ok(CommandOutcome::Consumed(30))
    );
    // Ask for 200, get the remaining 70
    assert_eq!(
        Command::ConsumeAsMuchAsPossible { limit: 200 }.apply(&mut state, 0),
        Ok(CommandOutcome::Consumed(70))
    );
    // Empty bucket consumes 0, not an error
    assert_eq!(
        Command::ConsumeAsMuchAsPossible { limit: 5 }.apply(&mut state, 0),
        Ok(CommandOutcome::Consumed(0))
    );
}

#[test]
fn test_refill_credits_whole_intervals_only() {
    let mut state = new_state(100, 10, 5); // refill 5 tokens every 10ms

    // Use all tokens
    assert_eq!(
        Command::ConsumeAsMuchAsPossible { limit: u64::MAX }.apply(&mut state, 0),
        Ok(CommandOutcome::Consumed(100))
    );

    // Mid-interval, nothing has refilled yet
    assert_eq!(
        Command::TryConsume { tokens: 1 }.apply(&mut state, 5 * MS),
        Ok(CommandOutcome::Admitted(false))
    );

    // At the interval boundary, 5 tokens land: consume all 5
    assert_eq!(
        Command::TryConsume { tokens: 5 }.apply(&mut state, 10 * MS),
        Ok(CommandOutcome::Admitted(true))
    );
    assert_eq!(
        Command::TryConsume { tokens: 1 }.apply(&mut state, 10 * MS),
        Ok(CommandOutcome::Admitted(false))
    );
}

#[test]
fn test_refill_credits_multiple_elapsed_intervals() {
    let mut state = new_state(100, 10, 5);

    assert_eq!(
        Command::ConsumeAsMuchAsPossible { limit: u64::MAX }.apply(&mut state, 0),
        Ok(CommandOutcome::Consumed(100))
    );

    // 30ms = 3 intervals = 15 tokens refilled
    assert_eq!(
        Command::TryConsume { tokens: 15 }.apply(&mut state, 30 * MS),
        Ok(CommandOutcome::Admitted(true))
    );
    assert_eq!(
        Command::TryConsume { tokens: 1 }.apply(&mut state, 30 * MS),
        Ok(CommandOutcome::Admitted(false))
    );
}

#[test]
fn test_refill_caps_at_capacity() {
    let mut state = new_state(100, 10, 20); // refill 20, capacity only 100

    // available = 100 - 30 = 70
    assert_eq!(
        Command::TryConsume { tokens: 30 }.apply(&mut state, 0),
        Ok(CommandOutcome::Admitted(true))
    );

    // available = min(70 + 20, 100) = 90, consume 90: available = 0
    assert_eq!(
        Command::TryConsume { tokens: 90 }.apply(&mut state, 10 * MS),
        Ok(CommandOutcome::Admitted(true))
    );

    // Long idle refills back to capacity, never beyond
    // available = min(0 + 20 * 100, 100) = 100
    assert_eq!(
        Command::TryConsume { tokens: 100 }.apply(&mut state, 1010 * MS),
        Ok(CommandOutcome::Admitted(true))
    );
    assert_eq!(
        Command::TryConsume { tokens: 1 }.apply(&mut state, 1010 * MS),
        Ok(CommandOutcome::Admitted(false))
    );
}

#[test]
fn test_refill_boundary_alignment() {
    let mut state = new_state(100, 10, 5);

    // Drain mid-interval at 5ms; last_refill stays at 0
    assert_eq!(
        Command::ConsumeAsMuchAsPossible { limit: u64::MAX }.apply(&mut state, 5 * MS),
        Ok(CommandOutcome::Consumed(100))
    );
    assert_eq!(state.last_refill(), 0);

    // At 12ms: one whole interval since 0, refill 5, boundary moves to 10ms
    assert_eq!(
        Command::TryConsume { tokens: 5 }.apply(&mut state, 12 * MS),
        Ok(CommandOutcome::Admitted(true))
    );
    assert_eq!(state.last_refill(), 10 * MS);

    // At 22ms: one whole interval since 10ms, refill 5, boundary moves to 20ms
    assert_eq!(
        Command::TryConsume { tokens: 5 }.apply(&mut state, 22 * MS),
        Ok(CommandOutcome::Admitted(true))
    );
    assert_eq!(state.last_refill(), 20 * MS);
    assert_eq!(
        Command::TryConsume { tokens: 1 }.apply(&mut state, 22 * MS),
        Ok(CommandOutcome::Admitted(false))
    );
}

#[test]
fn test_clock_regression_is_clamped() {
    // State anchored at 100ms, command arriving "earlier" at 50ms
    let mut state = BucketConfiguration::new(100, Duration::from_millis(10), 5)
        .unwrap()
        .initial_state(100 * MS);

    assert_eq!(
        Command::TryConsume { tokens: 1 }.apply(&mut state, 50 * MS),
        Ok(CommandOutcome::Admitted(true))
    );
    // No refill was credited and the boundary did not move
    assert_eq!(state.available(), 99);
    assert_eq!(state.last_refill(), 100 * MS);
}

#[test]
fn test_create_snapshot_settles_pending_refills() {
    let mut state = new_state(100, 10, 5);

    assert_eq!(
        Command::ConsumeAsMuchAsPossible { limit: u64::MAX }.apply(&mut state, 0),
        Ok(CommandOutcome::Consumed(100))
    );

    // At 25ms two intervals have elapsed: available = 10, boundary = 20ms
    let outcome = Command::CreateSnapshot.apply(&mut state, 25 * MS).unwrap();
    let bytes = match outcome {
        CommandOutcome::Snapshot(bytes) => bytes,
        other => panic!("expected Snapshot, got {:?}", other),
    };
    let decoded = BucketState::from_snapshot_bytes(&bytes).unwrap();
    assert_eq!(decoded.available(), 10);
    assert_eq!(decoded.last_refill(), 20 * MS);
    assert_eq!(decoded, state);
}

#[test]
fn test_saturating_arithmetic_on_extreme_values() {
    let mut state = new_state(u64::MAX, 1, u64::MAX);

    assert_eq!(
        Command::TryConsume { tokens: u64::MAX - 1 }.apply(&mut state, 0),
        Ok(CommandOutcome::Admitted(true))
    );

    // A huge time jump must refill to capacity without overflowing
    assert_eq!(
        Command::TryConsume { tokens: u64::MAX }.apply(&mut state, u64::MAX),
        Ok(CommandOutcome::Admitted(true))
    );
}
