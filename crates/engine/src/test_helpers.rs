// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for engine tests: seed entities through the repos so
//! version stamps and events behave exactly as in production.

use crate::context::TestContext;
use fg_core::{
    Job, JobId, MachineId, Node, NodeState, Pool, PoolId, PoolName, Scaleset, ScalesetId,
    ScalesetState, Task, TaskConfig, TaskContainer, TaskId, TaskKind, TaskPool, TaskState,
};

pub async fn seed_pool(tc: &TestContext) -> Pool {
    seed_pool_named(tc, "default-pool").await
}

pub async fn seed_pool_named(tc: &TestContext, name: &str) -> Pool {
    let mut pool = Pool::builder().pool_id(PoolId::new()).name(name).build();
    tc.ctx.pools().insert(&mut pool).await.unwrap();
    tc.ctx.queues.create_queue(&pool.queue_name()).await.unwrap();
    pool
}

pub async fn seed_job(tc: &TestContext) -> Job {
    let mut job = Job::builder().job_id(JobId::new()).build();
    job.created = tc.now();
    job.end_time = Some(job.created + chrono::Duration::hours(job.config.duration_hours as i64));
    tc.ctx.jobs().insert(&mut job).await.unwrap();
    job
}

pub fn task_config(pool_name: &PoolName, count: u64) -> TaskConfig {
    TaskConfig {
        kind: TaskKind::LibfuzzerFuzz,
        pool: TaskPool { pool_name: pool_name.clone(), count },
        containers: vec![TaskContainer {
            kind: fg_core::ContainerKind::Setup,
            name: "setup".to_string(),
        }],
        prereq_tasks: Vec::new(),
        duration_hours: Some(24),
        colocate: false,
        reboot_after_setup: false,
        debug: Vec::new(),
    }
}

pub async fn seed_task(tc: &TestContext, job: &Job, pool: &Pool, state: TaskState) -> Task {
    let mut task = Task::builder()
        .job_id(job.job_id)
        .task_id(TaskId::new())
        .state(state)
        .config(task_config(&pool.name, 1))
        .build();
    task.created = tc.now();
    task.end_time = Some(task.created + chrono::Duration::hours(24));
    tc.ctx.tasks().insert(&mut task).await.unwrap();
    task
}

pub async fn seed_node(tc: &TestContext, pool: &Pool, state: NodeState) -> Node {
    let mut node = Node::builder()
        .machine_id(MachineId::new())
        .pool_name(pool.name.clone())
        .pool_id(pool.pool_id)
        .state(state)
        .build();
    tc.ctx.nodes().insert(&mut node).await.unwrap();
    node
}

pub async fn seed_scaleset(
    tc: &TestContext,
    pool: &Pool,
    size: u64,
    state: ScalesetState,
) -> Scaleset {
    let mut scaleset = Scaleset::builder()
        .scaleset_id(ScalesetId::new())
        .pool_name(pool.name.clone())
        .size(size)
        .state(state)
        .build();
    tc.ctx.scalesets().insert(&mut scaleset).await.unwrap();
    scaleset
}

/// Reload helpers keep assertions honest: always check what the store
/// holds, not the copy a test mutated.
pub async fn reload_task(tc: &TestContext, task: &Task) -> Task {
    tc.ctx.tasks().get(task.job_id, task.task_id).await.unwrap().unwrap()
}

pub async fn reload_job(tc: &TestContext, job: &Job) -> Job {
    tc.ctx.jobs().get(job.job_id).await.unwrap().unwrap()
}

pub async fn reload_node(tc: &TestContext, node: &Node) -> Node {
    tc.ctx.nodes().get_by_machine_id(node.machine_id).await.unwrap().unwrap()
}
