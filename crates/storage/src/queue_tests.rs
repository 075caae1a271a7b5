// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    first = { 0, 1 },
    second = { 1, 5 },
    third = { 2, 25 },
    fourth = { 3, 125 },
    fifth = { 4, 625 },
)]
fn backoff_grows_as_powers_of_five(attempt: u32, minutes: i64) {
    assert_eq!(backoff_delay_with(attempt, 0.5), Duration::minutes(minutes));
}

#[test]
fn backoff_caps_at_forty_eight_hours() {
    // 5^5 minutes is past the cap; zero jitter offset at 0.5.
    assert_eq!(backoff_delay_with(5, 0.5), Duration::hours(48));
}

#[test]
fn capped_backoff_jitters_within_six_hours() {
    let low = backoff_delay_with(9, 0.0);
    let high = backoff_delay_with(9, 0.999_999);
    assert_eq!(low, Duration::hours(42));
    assert!(high > Duration::hours(53));
    assert!(high <= Duration::hours(54));
}

#[test]
fn huge_attempts_do_not_overflow() {
    let delay = backoff_delay(u32::MAX);
    assert!(delay >= Duration::hours(42));
    assert!(delay <= Duration::hours(54));
}

#[test]
fn poison_and_pool_queue_names() {
    assert_eq!(poison_queue_name(FILE_CHANGES_QUEUE), "file-changes-poison");
    let id = PoolId::nil();
    assert_eq!(pool_queue_name(id), format!("pool-{}", id));
}

#[test]
fn queue_message_decode() {
    let message = QueueMessage {
        message_id: Uuid::new_v4(),
        body: serde_json::to_vec(&serde_json::json!({"n": 7})).unwrap(),
        dequeue_count: 1,
    };
    let value: serde_json::Value = message.decode().unwrap();
    assert_eq!(value["n"], 7);
}
