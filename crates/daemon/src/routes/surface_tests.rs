// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handler-level tests for the user control surface: each test drives
//! a handler function directly with in-memory collaborators.

use super::*;
use crate::app::AppContext;
use crate::auth::{Authenticated, Scope};
use crate::error::ApiError;
use axum::extract::{Query, State};
use axum::Json;
use fg_core::{
    Architecture, ErrorCode, JobConfig, JobState, Os, PoolState, ScalesetState, TaskState,
};
use fg_engine::TestContext;
use fg_wire::{
    JobGetRequest, JobSearchRequest, NodeSearchRequest, PoolCreateRequest, PoolSearchRequest,
    ScalesetCreateRequest, ScalesetUpdateRequest, TaskCreateRequest, TaskSearchRequest,
};
use std::sync::Arc;

fn app(tc: &TestContext) -> AppContext {
    AppContext::new(Arc::new(tc.ctx.clone()), crate::config::DaemonConfig::default())
}

fn as_user() -> Authenticated {
    Authenticated { scope: Scope::User, principal: "dev@example.com".to_string() }
}

fn as_admin() -> Authenticated {
    Authenticated { scope: Scope::Admin, principal: "ops@example.com".to_string() }
}

fn job_config() -> JobConfig {
    JobConfig {
        project: "proj".to_string(),
        name: "fuzz".to_string(),
        build: "1".to_string(),
        duration_hours: 24,
        logs: None,
    }
}

fn pool_request(name: &str) -> PoolCreateRequest {
    PoolCreateRequest {
        name: name.into(),
        os: Os::Linux,
        arch: Architecture::X86_64,
        managed: true,
        object_id: None,
        client_id: None,
    }
}

async fn make_running_pool(tc: &TestContext, name: &str) -> fg_core::Pool {
    let application = app(tc);
    let Json(pool) = pools::create(State(application), as_admin(), Json(pool_request(name)))
        .await
        .unwrap();
    // The pool processor provisions the queue and starts it running.
    let processed = fg_engine::processors::pool::PoolProcessor::new(&tc.ctx)
        .process_state_update(pool)
        .await
        .unwrap();
    tc.ctx.pools().get(processed.pool_id).await.unwrap().unwrap()
}

#[tokio::test]
async fn job_create_stamps_identity_and_starts_init() {
    let tc = TestContext::new();
    let Json(job) = jobs::create(State(app(&tc)), as_user(), Json(job_config())).await.unwrap();

    assert_eq!(job.state, JobState::Init);
    assert_eq!(job.user_info.unwrap().upn.as_deref(), Some("dev@example.com"));
    assert!(job.end_time.is_some());
}

#[tokio::test]
async fn job_create_rejects_zero_duration() {
    let tc = TestContext::new();
    let mut config = job_config();
    config.duration_hours = 0;
    let err = jobs::create(State(app(&tc)), as_user(), Json(config)).await.unwrap_err();
    assert_eq!(err.0.code, ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn job_requires_user_scope() {
    let tc = TestContext::new();
    let agent = Authenticated { scope: Scope::Agent, principal: "agent".to_string() };
    assert!(jobs::create(State(app(&tc)), agent, Json(job_config())).await.is_err());
}

#[tokio::test]
async fn first_task_enables_the_job() {
    let tc = TestContext::new();
    let pool = make_running_pool(&tc, "linux-pool").await;
    let Json(job) = jobs::create(State(app(&tc)), as_user(), Json(job_config())).await.unwrap();

    let request =
        TaskCreateRequest { job_id: job.job_id, config: task_config(&pool.name) };
    let Json(task) = tasks::create(State(app(&tc)), as_user(), Json(request)).await.unwrap();

    assert_eq!(task.state, TaskState::Init);
    assert_eq!(task.os, Os::Linux);
    let job = tc.ctx.jobs().get(job.job_id).await.unwrap().unwrap();
    assert_eq!(job.state, JobState::Enabled);
}

fn task_config(pool_name: &fg_core::PoolName) -> fg_core::TaskConfig {
    fg_core::TaskConfig {
        kind: fg_core::TaskKind::LibfuzzerFuzz,
        pool: fg_core::TaskPool { pool_name: pool_name.clone(), count: 1 },
        containers: vec![fg_core::TaskContainer {
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

#[tokio::test]
async fn task_create_rejects_stopping_job() {
    let tc = TestContext::new();
    let pool = make_running_pool(&tc, "linux-pool").await;
    let Json(job) = jobs::create(State(app(&tc)), as_user(), Json(job_config())).await.unwrap();
    jobs::stop(State(app(&tc)), as_user(), Json(JobGetRequest { job_id: job.job_id }))
        .await
        .unwrap();

    let request =
        TaskCreateRequest { job_id: job.job_id, config: task_config(&pool.name) };
    let err = tasks::create(State(app(&tc)), as_user(), Json(request)).await.unwrap_err();
    assert_eq!(err.0.code, ErrorCode::UnableToAddTaskToJob);
}

#[tokio::test]
async fn task_create_rejects_missing_prereq() {
    let tc = TestContext::new();
    let pool = make_running_pool(&tc, "linux-pool").await;
    let Json(job) = jobs::create(State(app(&tc)), as_user(), Json(job_config())).await.unwrap();

    let mut config = task_config(&pool.name);
    config.prereq_tasks = vec![fg_core::TaskId::new()];
    let request = TaskCreateRequest { job_id: job.job_id, config };
    let err = tasks::create(State(app(&tc)), as_user(), Json(request)).await.unwrap_err();
    assert_eq!(err.0.code, ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn pool_create_rejects_duplicate_names() {
    let tc = TestContext::new();
    pools::create(State(app(&tc)), as_admin(), Json(pool_request("linux-pool"))).await.unwrap();
    let err = pools::create(State(app(&tc)), as_admin(), Json(pool_request("linux-pool")))
        .await
        .unwrap_err();
    assert_eq!(err.0.code, ErrorCode::UnableToCreate);
}

#[tokio::test]
async fn pool_mutations_require_admin() {
    let tc = TestContext::new();
    let err = pools::create(State(app(&tc)), as_user(), Json(pool_request("linux-pool")))
        .await
        .unwrap_err();
    assert_eq!(err.0.code, ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn scaleset_create_requires_a_managed_pool() {
    let tc = TestContext::new();
    let mut request = pool_request("byo-pool");
    request.managed = false;
    pools::create(State(app(&tc)), as_admin(), Json(request)).await.unwrap();

    let err = scalesets::create(
        State(app(&tc)),
        as_admin(),
        Json(scaleset_request("byo-pool")),
    )
    .await
    .unwrap_err();
    assert_eq!(err.0.code, ErrorCode::InvalidRequest);
}

fn scaleset_request(pool: &str) -> ScalesetCreateRequest {
    ScalesetCreateRequest {
        pool_name: pool.into(),
        region: "eastus".to_string(),
        vm_sku: "Standard_D2s_v3".to_string(),
        image: "Canonical:UbuntuServer:22_04-lts:latest".to_string(),
        size: 2,
        spot_instances: false,
        ephemeral_os_disks: false,
        tags: Default::default(),
    }
}

#[tokio::test]
async fn concurrent_scaleset_resizes_conflict() {
    let tc = TestContext::new();
    make_running_pool(&tc, "linux-pool").await;
    let Json(scaleset) =
        scalesets::create(State(app(&tc)), as_admin(), Json(scaleset_request("linux-pool")))
            .await
            .unwrap();

    // Both writers hold the same version stamp.
    let mut first = tc.ctx.scalesets().get(scaleset.scaleset_id).await.unwrap().unwrap();
    let mut second = first.clone();
    first.state = ScalesetState::Resize;

    first.size = 5;
    tc.ctx.scalesets().save(&mut first).await.unwrap();

    second.size = 3;
    let err = tc.ctx.scalesets().save(&mut second).await.unwrap_err();
    let api: ApiError = err.into();
    assert_eq!(api.0.code, ErrorCode::UnableToUpdate);
    assert_eq!(api.status(), axum::http::StatusCode::CONFLICT);

    // The winner's size is what the store holds.
    let stored = tc.ctx.scalesets().get(scaleset.scaleset_id).await.unwrap().unwrap();
    assert_eq!(stored.size, 5);
}

#[tokio::test]
async fn scaleset_resize_moves_to_resize_state() {
    let tc = TestContext::new();
    make_running_pool(&tc, "linux-pool").await;
    let Json(created) =
        scalesets::create(State(app(&tc)), as_admin(), Json(scaleset_request("linux-pool")))
            .await
            .unwrap();
    // Pretend provisioning finished.
    let mut stored = tc.ctx.scalesets().get(created.scaleset_id).await.unwrap().unwrap();
    tc.ctx.scalesets().set_state(&mut stored, ScalesetState::Running).await.unwrap();

    let request = ScalesetUpdateRequest { scaleset_id: created.scaleset_id, size: Some(5) };
    let Json(updated) =
        scalesets::update(State(app(&tc)), as_admin(), Json(request)).await.unwrap();
    assert_eq!(updated.size, 5);
    assert_eq!(updated.state, ScalesetState::Resize);
}

#[tokio::test]
async fn searches_cover_empty_stores() {
    let tc = TestContext::new();
    let Json(jobs) =
        jobs::search(State(app(&tc)), as_user(), Query(JobSearchRequest::default()))
            .await
            .unwrap();
    assert!(jobs.is_empty());

    let Json(tasks) =
        tasks::search(State(app(&tc)), as_user(), Query(TaskSearchRequest::default()))
            .await
            .unwrap();
    assert!(tasks.is_empty());

    let Json(pools) =
        pools::search(State(app(&tc)), as_user(), Query(PoolSearchRequest::default()))
            .await
            .unwrap();
    assert!(pools.is_empty());

    let Json(nodes) =
        nodes::search(State(app(&tc)), as_user(), Query(NodeSearchRequest::default()))
            .await
            .unwrap();
    assert!(nodes.is_empty());
}

#[tokio::test]
async fn pool_search_by_state() {
    let tc = TestContext::new();
    make_running_pool(&tc, "a-pool").await;
    let query = PoolSearchRequest { state: Some(PoolState::Running), ..Default::default() };
    let Json(found) = pools::search(State(app(&tc)), as_user(), Query(query)).await.unwrap();
    assert_eq!(found.len(), 1);
}
