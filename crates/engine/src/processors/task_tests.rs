// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::context::TestContext;
use crate::test_helpers::{reload_task, seed_job, seed_node, seed_pool, seed_task};
use fg_core::{JobState, NodeTaskState};

#[tokio::test]
async fn init_provisions_queue_then_waits() {
    let tc = TestContext::new();
    let pool = seed_pool(&tc).await;
    let job = seed_job(&tc).await;
    let task = seed_task(&tc, &job, &pool, TaskState::Init).await;

    TaskProcessor::new(&tc.ctx)
        .process_state_update(task.clone())
        .await
        .unwrap();

    let loaded = reload_task(&tc, &task).await;
    assert_eq!(loaded.state, TaskState::Waiting);
    // The task's private queue exists and accepts messages.
    tc.ctx.queues.enqueue(&task.queue_name(), b"ping".to_vec(), None).await.unwrap();
}

#[tokio::test]
async fn stopping_task_messages_each_node_then_stops_when_released() {
    let tc = TestContext::new();
    let pool = seed_pool(&tc).await;
    let job = seed_job(&tc).await;
    let task = seed_task(&tc, &job, &pool, TaskState::Init).await;
    let processor = TaskProcessor::new(&tc.ctx);
    processor.process_state_update(task.clone()).await.unwrap();

    let node = seed_node(&tc, &pool, fg_core::NodeState::Busy).await;
    tc.ctx
        .node_tasks()
        .upsert(node.machine_id, task.task_id, job.job_id, NodeTaskState::Running)
        .await
        .unwrap();

    let mut task = reload_task(&tc, &task).await;
    tc.ctx.tasks().mark_stopping(&mut task).await.unwrap();
    processor.process_state_update(task.clone()).await.unwrap();

    // Still stopping: the node has not released the task yet, but it
    // has been told to.
    assert_eq!(reload_task(&tc, &task).await.state, TaskState::Stopping);
    let pending = tc.ctx.messages().get_pending(node.machine_id).await.unwrap().unwrap();
    assert_eq!(
        pending.message,
        NodeCommand::StopTask(StopTaskCommand { task_id: task.task_id })
    );

    let row = tc.ctx.node_tasks().get(node.machine_id, task.task_id).await.unwrap().unwrap();
    tc.ctx.node_tasks().delete(&row).await.unwrap();

    let task = reload_task(&tc, &task).await;
    processor.process_state_update(task.clone()).await.unwrap();
    assert_eq!(reload_task(&tc, &task).await.state, TaskState::Stopped);
}

#[tokio::test]
async fn repeated_stopping_ticks_do_not_duplicate_messages() {
    let tc = TestContext::new();
    let pool = seed_pool(&tc).await;
    let job = seed_job(&tc).await;
    let task = seed_task(&tc, &job, &pool, TaskState::Stopping).await;
    let node = seed_node(&tc, &pool, fg_core::NodeState::Busy).await;
    tc.ctx
        .node_tasks()
        .upsert(node.machine_id, task.task_id, job.job_id, NodeTaskState::Running)
        .await
        .unwrap();

    let processor = TaskProcessor::new(&tc.ctx);
    for _ in 0..3 {
        let task = reload_task(&tc, &task).await;
        processor.process_state_update(task).await.unwrap();
    }
    assert_eq!(tc.ctx.messages().get_all(node.machine_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn running_task_without_heartbeat_times_out() {
    let tc = TestContext::new();
    let pool = seed_pool(&tc).await;
    let job = seed_job(&tc).await;
    let task = seed_task(&tc, &job, &pool, TaskState::Running).await;

    let processor = TaskProcessor::new(&tc.ctx);
    processor.check_timeouts().await.unwrap();
    assert_eq!(reload_task(&tc, &task).await.state, TaskState::Running);

    tc.clock.advance(chrono::Duration::minutes(31));
    processor.check_timeouts().await.unwrap();

    let loaded = reload_task(&tc, &task).await;
    assert_eq!(loaded.state, TaskState::Stopping);
    let fault = loaded.error.unwrap();
    assert_eq!(fault.code, fg_core::ErrorCode::TaskFailed);
    assert_eq!(fault.errors, vec!["task heartbeat timed out"]);
}

#[tokio::test]
async fn fresh_heartbeat_keeps_the_task_alive() {
    let tc = TestContext::new();
    let pool = seed_pool(&tc).await;
    let job = seed_job(&tc).await;
    let mut task = seed_task(&tc, &job, &pool, TaskState::Running).await;

    tc.clock.advance(chrono::Duration::minutes(29));
    task.heartbeat = Some(tc.now());
    tc.ctx.tasks().save(&mut task).await.unwrap();
    tc.clock.advance(chrono::Duration::minutes(15));

    TaskProcessor::new(&tc.ctx).check_timeouts().await.unwrap();
    assert_eq!(reload_task(&tc, &task).await.state, TaskState::Running);
}

#[tokio::test]
async fn wait_job_task_follows_a_stopping_job() {
    let tc = TestContext::new();
    let pool = seed_pool(&tc).await;
    let mut job = seed_job(&tc).await;
    let task = seed_task(&tc, &job, &pool, TaskState::WaitJob).await;

    let processor = TaskProcessor::new(&tc.ctx);
    processor.check_timeouts().await.unwrap();
    assert_eq!(reload_task(&tc, &task).await.state, TaskState::WaitJob);

    tc.ctx.jobs().set_state(&mut job, JobState::Stopping).await.unwrap();
    processor.check_timeouts().await.unwrap();
    assert_eq!(reload_task(&tc, &task).await.state, TaskState::Stopping);
}

#[tokio::test]
async fn expired_task_is_stopped() {
    let tc = TestContext::new();
    let pool = seed_pool(&tc).await;
    let job = seed_job(&tc).await;
    let task = seed_task(&tc, &job, &pool, TaskState::Scheduled).await;

    tc.clock.advance(chrono::Duration::hours(25));
    TaskProcessor::new(&tc.ctx).check_timeouts().await.unwrap();
    assert_eq!(reload_task(&tc, &task).await.state, TaskState::Stopping);
}
