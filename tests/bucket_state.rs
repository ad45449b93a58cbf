use std::time::Duration;

use rate_guard_grid::{
    BucketConfiguration, BucketState, Command, CommandOutcome, GridError, SNAPSHOT_VERSION,
};

const MS: u64 = 1_000_000; // nanoseconds per millisecond

fn state_at(now: u64) -> BucketState {
    // capacity 100, refilling 5 tokens every 10ms
    BucketConfiguration::new(100, Duration::from_millis(10), 5)
        .unwrap()
        .initial_state(now)
}

#[test]
fn test_initial_state_starts_full() {
    let state = state_at(7 * MS);
    assert_eq!(state.capacity(), 100);
    assert_eq!(state.refill_interval(), 10 * MS);
    assert_eq!(state.refill_amount(), 5);
    assert_eq!(state.available(), 100);
    assert_eq!(state.last_refill(), 7 * MS);
}

#[test]
fn test_snapshot_round_trip() {
    let state = state_at(0);
    let bytes = state.to_snapshot_bytes().unwrap();
    let restored = BucketState::from_snapshot_bytes(&bytes).unwrap();
    assert_eq!(restored, state);
}

#[test]
fn test_snapshot_layout_is_stable() {
    let state = state_at(3 * MS);
    let bytes = state.to_snapshot_bytes().unwrap();

    // One version byte followed by five fixed-width u64 fields
    assert_eq!(bytes[0], SNAPSHOT_VERSION);
    assert_eq!(bytes.len(), 1 + 5 * 8);

    // Equal states encode to identical bytes
    assert_eq!(state_at(3 * MS).to_snapshot_bytes().unwrap(), bytes);
}

#[test]
fn test_snapshot_round_trip_after_mutation() {
    let mut state = state_at(0);

    // Consume 30, then let one refill settle: available = 100 - 30 + 5 = 75
    let outcome = Command::TryConsume { tokens: 30 }.apply(&mut state, 0).unwrap();
    assert_eq!(outcome, CommandOutcome::Admitted(true));
    let outcome = Command::TryConsume { tokens: 0 }.apply(&mut state, 10 * MS).unwrap();
    assert_eq!(outcome, CommandOutcome::Admitted(true));
    assert_eq!(state.available(), 75);

    let bytes = state.to_snapshot_bytes().unwrap();
    let restored = BucketState::from_snapshot_bytes(&bytes).unwrap();
    assert_eq!(restored.available(), 75);
    assert_eq!(restored.last_refill(), 10 * MS);
    assert_eq!(restored, state);
}

#[test]
fn test_decode_rejects_empty_input() {
    match BucketState::from_snapshot_bytes(&[]) {
        Err(GridError::SnapshotDecode(_)) => {}
        other => panic!("expected SnapshotDecode, got {:?}", other),
    }
}

#[test]
fn test_decode_rejects_unknown_version() {
    let mut bytes = state_at(0).to_snapshot_bytes().unwrap();
    bytes[0] = SNAPSHOT_VERSION + 1;
    assert_eq!(
        BucketState::from_snapshot_bytes(&bytes),
        Err(GridError::UnsupportedSnapshotVersion(SNAPSHOT_VERSION + 1))
    );
}

#[test]
fn test_decode_rejects_truncated_payload() {
    let bytes = state_at(0).to_snapshot_bytes().unwrap();
    match BucketState::from_snapshot_bytes(&bytes[..bytes.len() - 3]) {
        Err(GridError::SnapshotDecode(_)) => {}
        other => panic!("expected SnapshotDecode, got {:?}", other),
    }
}

#[test]
fn test_decode_rejects_balance_above_capacity() {
    let mut bytes = state_at(0).to_snapshot_bytes().unwrap();

    // Payload field order: capacity, refill_interval, refill_amount,
    // available, last_refill. available sits at offset 1 + 3*8 = 25.
    for byte in &mut bytes[25..33] {
        *byte = 0xFF;
    }
    match BucketState::from_snapshot_bytes(&bytes) {
        Err(GridError::SnapshotDecode(message)) => {
            assert!(message.contains("exceeds capacity"), "message: {}", message);
        }
        other => panic!("expected SnapshotDecode, got {:?}", other),
    }
}

#[test]
fn test_decode_rejects_zero_refill_interval() {
    let mut bytes = state_at(0).to_snapshot_bytes().unwrap();

    // refill_interval sits at offset 1 + 8 = 9
    for byte in &mut bytes[9..17] {
        *byte = 0;
    }
    match BucketState::from_snapshot_bytes(&bytes) {
        Err(GridError::SnapshotDecode(message)) => {
            assert!(message.contains("interval"), "message: {}", message);
        }
        other => panic!("expected SnapshotDecode, got {:?}", other),
    }
}

#[test]
fn test_rebase_moves_schedule_and_keeps_balance() {
    let mut state = state_at(0);
    assert_eq!(
        Command::TryConsume { tokens: 30 }.apply(&mut state, 0).unwrap(),
        CommandOutcome::Admitted(true)
    );

    // Re-anchor under a clock whose "now" is 500ms
    let rebased = state.rebase(500 * MS);
    assert_eq!(rebased.last_refill(), 500 * MS);
    assert_eq!(rebased.available(), 70);
    assert_eq!(rebased.capacity(), 100);
    assert_eq!(rebased.refill_interval(), 10 * MS);
    assert_eq!(rebased.refill_amount(), 5);
}
