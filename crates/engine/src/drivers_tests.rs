// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::context::TestContext;
use crate::test_helpers::{reload_job, reload_task, seed_job, seed_pool, seed_scaleset, seed_task};
use fg_core::{ProxyForward, ScalesetState, TaskState, UserInfo};

#[tokio::test]
async fn proxy_tick_expires_stale_forwards() {
    let tc = TestContext::new();
    let scaleset = seed_scaleset(&tc, &seed_pool(&tc).await, 1, ScalesetState::Running).await;

    let mut forward = ProxyForward {
        region: "eastus".to_string(),
        port: 28000,
        scaleset_id: scaleset.scaleset_id,
        machine_id: fg_core::MachineId::new(),
        proxy_id: None,
        dst_port: 22,
        dst_ip: None,
        end_time: tc.now() + chrono::Duration::hours(1),
        version: 0,
    };
    tc.ctx.proxy_forwards().insert(&mut forward).await.unwrap();

    proxy_tick(&tc.ctx).await.unwrap();
    assert_eq!(tc.ctx.proxy_forwards().search_expired(tc.now() + chrono::Duration::hours(2)).await.unwrap().len(), 1);

    tc.clock.advance(chrono::Duration::hours(2));
    proxy_tick(&tc.ctx).await.unwrap();
    assert!(tc
        .ctx
        .proxy_forwards()
        .search_expired(tc.now() + chrono::Duration::hours(2))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn daily_tick_flags_scalesets_with_drifted_config() {
    let tc = TestContext::new();
    let pool = seed_pool(&tc).await;
    let mut scaleset = seed_scaleset(&tc, &pool, 1, ScalesetState::Running).await;
    scaleset.config_hash = Some(crate::processors::scaleset::pool_config_hash(&pool));
    tc.ctx.scalesets().save(&mut scaleset).await.unwrap();

    // Hash matches: no flag.
    daily_tick(&tc.ctx).await.unwrap();
    let loaded = tc.ctx.scalesets().get(scaleset.scaleset_id).await.unwrap().unwrap();
    assert!(!loaded.needs_config_update);

    // Change the pool config and the flag goes up.
    let mut pool = tc.ctx.pools().get(pool.pool_id).await.unwrap().unwrap();
    pool.config = Some(serde_json::json!({"poll_interval": 5}));
    tc.ctx.pools().save(&mut pool).await.unwrap();

    daily_tick(&tc.ctx).await.unwrap();
    let loaded = tc.ctx.scalesets().get(scaleset.scaleset_id).await.unwrap().unwrap();
    assert!(loaded.needs_config_update);
}

#[tokio::test]
async fn retention_tick_scrubs_old_identity_stamps() {
    let tc = TestContext::new();
    let pool = seed_pool(&tc).await;
    let mut job = seed_job(&tc).await;
    job.user_info = Some(UserInfo {
        application_id: None,
        object_id: Some(uuid::Uuid::new_v4()),
        upn: Some("user@example.com".to_string()),
    });
    tc.ctx.jobs().save(&mut job).await.unwrap();

    let mut task = seed_task(&tc, &job, &pool, TaskState::Stopped).await;
    task.user_info = Some(UserInfo {
        application_id: None,
        object_id: None,
        upn: Some("user@example.com".to_string()),
    });
    tc.ctx.tasks().save(&mut task).await.unwrap();

    // Young entities keep their stamps.
    retention_tick(&tc.ctx).await.unwrap();
    assert!(reload_job(&tc, &job).await.user_info.unwrap().upn.is_some());

    tc.clock.advance(chrono::Duration::days(19 * 30));
    retention_tick(&tc.ctx).await.unwrap();

    assert!(reload_job(&tc, &job).await.user_info.unwrap().is_scrubbed());
    assert!(reload_task(&tc, &task).await.user_info.unwrap().is_scrubbed());
}

#[tokio::test]
async fn tasks_tick_runs_the_whole_pipeline() {
    let tc = TestContext::new();
    let pool = seed_pool(&tc).await;
    let job = seed_job(&tc).await;
    let task = seed_task(&tc, &job, &pool, TaskState::Init).await;

    // One tick takes the task Init → Waiting, and the scheduler at the
    // end of the same tick dispatches it.
    tasks_tick(&tc.ctx).await.unwrap();
    assert_eq!(reload_task(&tc, &task).await.state, TaskState::Scheduled);
    assert!(tc.ctx.queues.pop(&pool.queue_name()).await.unwrap().is_some());
}

#[tokio::test]
async fn drivers_stop_on_cancellation() {
    let tc = TestContext::new();
    let cancel = tokio_util::sync::CancellationToken::new();
    let handles = spawn_drivers(
        std::sync::Arc::new(tc.ctx.clone()),
        DriverIntervals::default(),
        cancel.clone(),
    );

    cancel.cancel();
    for handle in handles {
        handle.await.unwrap();
    }
}
