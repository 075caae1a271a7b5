// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::context::TestContext;
use crate::test_helpers::{reload_node, reload_task, seed_job, seed_node, seed_pool, seed_task};
use fg_core::{NodeState, TaskState};

async fn setup_queues(tc: &TestContext) {
    tc.ctx.queues.create_queue(NODE_HEARTBEAT_QUEUE).await.unwrap();
    tc.ctx.queues.create_queue(TASK_HEARTBEAT_QUEUE).await.unwrap();
}

#[tokio::test]
async fn node_heartbeats_stamp_the_node() {
    let tc = TestContext::new();
    setup_queues(&tc).await;
    let pool = seed_pool(&tc).await;
    let node = seed_node(&tc, &pool, NodeState::Busy).await;
    assert!(node.heartbeat.is_none());

    let entry = NodeHeartbeatEntry { machine_id: node.machine_id };
    tc.ctx
        .queues
        .enqueue(NODE_HEARTBEAT_QUEUE, serde_json::to_vec(&entry).unwrap(), None)
        .await
        .unwrap();

    assert_eq!(drain_node_heartbeats(&tc.ctx).await.unwrap(), 1);
    assert_eq!(reload_node(&tc, &node).await.heartbeat, Some(tc.now()));
    // The queue is drained.
    assert_eq!(drain_node_heartbeats(&tc.ctx).await.unwrap(), 0);
}

#[tokio::test]
async fn task_heartbeats_stamp_the_task() {
    let tc = TestContext::new();
    setup_queues(&tc).await;
    let pool = seed_pool(&tc).await;
    let job = seed_job(&tc).await;
    let task = seed_task(&tc, &job, &pool, TaskState::Running).await;
    let node = seed_node(&tc, &pool, NodeState::Busy).await;

    let entry = TaskHeartbeatEntry {
        job_id: job.job_id,
        task_id: task.task_id,
        machine_id: node.machine_id,
    };
    tc.ctx
        .queues
        .enqueue(TASK_HEARTBEAT_QUEUE, serde_json::to_vec(&entry).unwrap(), None)
        .await
        .unwrap();

    assert_eq!(drain_task_heartbeats(&tc.ctx).await.unwrap(), 1);
    assert_eq!(reload_task(&tc, &task).await.heartbeat, Some(tc.now()));
}

#[tokio::test]
async fn malformed_and_unknown_heartbeats_are_discarded() {
    let tc = TestContext::new();
    setup_queues(&tc).await;

    tc.ctx
        .queues
        .enqueue(NODE_HEARTBEAT_QUEUE, b"not json".to_vec(), None)
        .await
        .unwrap();
    let unknown = NodeHeartbeatEntry { machine_id: MachineId::new() };
    tc.ctx
        .queues
        .enqueue(NODE_HEARTBEAT_QUEUE, serde_json::to_vec(&unknown).unwrap(), None)
        .await
        .unwrap();

    assert_eq!(drain_node_heartbeats(&tc.ctx).await.unwrap(), 0);
    // Both messages were consumed rather than poisoning the queue.
    assert!(tc.queues.is_empty(NODE_HEARTBEAT_QUEUE));
}

#[tokio::test]
async fn missing_queue_is_not_an_error() {
    let tc = TestContext::new();
    assert_eq!(drain_node_heartbeats(&tc.ctx).await.unwrap(), 0);
    assert_eq!(drain_task_heartbeats(&tc.ctx).await.unwrap(), 0);
}
