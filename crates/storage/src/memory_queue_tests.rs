// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fg_core::FakeClock;

fn queues() -> (FakeClock, MemoryQueues) {
    let clock = FakeClock::new();
    let queues = MemoryQueues::new(Arc::new(clock.clone()));
    (clock, queues)
}

#[tokio::test]
async fn fifo_at_enqueue() {
    let (_, queues) = queues();
    queues.create_queue("work").await.unwrap();
    queues.enqueue("work", b"first".to_vec(), None).await.unwrap();
    queues.enqueue("work", b"second".to_vec(), None).await.unwrap();

    let message = queues.pop("work").await.unwrap().unwrap();
    assert_eq!(message.body, b"first");
}

#[tokio::test]
async fn enqueue_to_missing_queue_fails() {
    let (_, queues) = queues();
    let result = queues.enqueue("missing", b"x".to_vec(), None).await;
    assert!(matches!(result, Err(QueueError::NotFound(_))));
}

#[tokio::test]
async fn popped_message_is_invisible_until_timeout() {
    let (clock, queues) = queues();
    queues.create_queue("work").await.unwrap();
    queues.enqueue("work", b"m".to_vec(), None).await.unwrap();

    let first = queues.pop("work").await.unwrap().unwrap();
    assert!(queues.pop("work").await.unwrap().is_none());

    clock.advance(Duration::seconds(DEFAULT_VISIBILITY_TIMEOUT_SECS + 1));
    let second = queues.pop("work").await.unwrap().unwrap();
    assert_eq!(second.message_id, first.message_id);
    assert_eq!(second.dequeue_count, 2);
}

#[tokio::test]
async fn delete_commits_consumption() {
    let (clock, queues) = queues();
    queues.create_queue("work").await.unwrap();
    queues.enqueue("work", b"m".to_vec(), None).await.unwrap();

    let message = queues.pop("work").await.unwrap().unwrap();
    queues.delete_message("work", message.message_id).await.unwrap();

    clock.advance(Duration::seconds(DEFAULT_VISIBILITY_TIMEOUT_SECS + 1));
    assert!(queues.pop("work").await.unwrap().is_none());
}

#[tokio::test]
async fn visibility_delay_defers_first_delivery() {
    let (clock, queues) = queues();
    queues.create_queue("work").await.unwrap();
    queues
        .enqueue("work", b"later".to_vec(), Some(Duration::minutes(5)))
        .await
        .unwrap();

    assert!(queues.pop("work").await.unwrap().is_none());
    clock.advance(Duration::minutes(6));
    assert!(queues.pop("work").await.unwrap().is_some());
}

#[tokio::test]
async fn sixth_dequeue_lands_in_poison_queue() {
    let (clock, queues) = queues();
    queues.create_queue("file-changes").await.unwrap();
    queues.enqueue("file-changes", b"bad".to_vec(), None).await.unwrap();

    // Five deliveries without deletion.
    for _ in 0..MAX_DEQUEUE_COUNT {
        let message = queues.pop("file-changes").await.unwrap();
        assert!(message.is_some());
        clock.advance(Duration::seconds(DEFAULT_VISIBILITY_TIMEOUT_SECS + 1));
    }

    // The sixth attempt finds nothing; the message moved to poison.
    assert!(queues.pop("file-changes").await.unwrap().is_none());
    let dead = queues.pop("file-changes-poison").await.unwrap().unwrap();
    assert_eq!(dead.body, b"bad");
}

#[tokio::test]
async fn delete_queue_removes_poison_twin() {
    let (_, queues) = queues();
    queues.create_queue("work").await.unwrap();
    queues.delete_queue("work").await.unwrap();
    assert!(matches!(queues.pop("work").await, Err(QueueError::NotFound(_))));
    assert!(matches!(queues.pop("work-poison").await, Err(QueueError::NotFound(_))));
}

#[tokio::test]
async fn grant_consumer_issues_expiring_handle() {
    let (clock, queues) = queues();
    queues.create_queue("pool-q").await.unwrap();

    let handle = queues.grant_consumer("pool-q", Duration::hours(24)).await.unwrap();
    assert_eq!(handle.queue_name, "pool-q");
    assert_eq!(handle.expires, clock.now() + Duration::hours(24));
    assert!(handle.permissions.contains(&QueuePermission::Process));
    assert!(!handle.token.is_empty());
}
