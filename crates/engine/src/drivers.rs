// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic drivers.
//!
//! Five timers, each owning a disjoint slice of work. Within a tick,
//! entities are processed with bounded concurrency and per-entity
//! error isolation: one entity failing (or losing its version race)
//! never stalls the rest. Each timer loop is sequential with itself,
//! so a slow tick delays rather than overlaps the next one.

use crate::context::Collaborators;
use crate::error::EngineError;
use crate::heartbeats::{drain_node_heartbeats, drain_task_heartbeats};
use crate::processors::job::JobProcessor;
use crate::processors::node::NodeProcessor;
use crate::processors::pool::PoolProcessor;
use crate::processors::scaleset::{pool_config_hash, ScalesetProcessor};
use crate::processors::task::TaskProcessor;
use crate::scheduler::schedule_tasks;
use fg_core::{JobState, PoolState, TaskState};
use fg_storage::QueueClient;
use futures_util::stream::{self, StreamExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Entities processed concurrently per entity kind within one tick.
const TICK_CONCURRENCY: usize = 10;

/// Timer intervals, overridable from daemon configuration.
#[derive(Debug, Clone)]
pub struct DriverIntervals {
    pub workers: Duration,
    pub tasks: Duration,
    pub proxy: Duration,
    pub daily: Duration,
    pub retention: Duration,
}

impl Default for DriverIntervals {
    fn default() -> Self {
        Self {
            workers: Duration::from_secs(90),
            tasks: Duration::from_secs(15),
            proxy: Duration::from_secs(30),
            daily: Duration::from_secs(24 * 60 * 60),
            retention: Duration::from_secs(20 * 60 * 60),
        }
    }
}

/// Spawn all periodic driver loops. They run until the token cancels.
pub fn spawn_drivers(
    ctx: Arc<Collaborators>,
    intervals: DriverIntervals,
    cancel: CancellationToken,
) -> Vec<JoinHandle<()>> {
    vec![
        spawn_loop("workers", intervals.workers, ctx.clone(), cancel.clone(), |ctx| async move {
            workers_tick(&ctx).await
        }),
        spawn_loop("tasks", intervals.tasks, ctx.clone(), cancel.clone(), |ctx| async move {
            tasks_tick(&ctx).await
        }),
        spawn_loop("proxy", intervals.proxy, ctx.clone(), cancel.clone(), |ctx| async move {
            proxy_tick(&ctx).await
        }),
        spawn_loop("daily", intervals.daily, ctx.clone(), cancel.clone(), |ctx| async move {
            daily_tick(&ctx).await
        }),
        spawn_loop("retention", intervals.retention, ctx, cancel, |ctx| async move {
            retention_tick(&ctx).await
        }),
    ]
}

fn spawn_loop<F, Fut>(
    name: &'static str,
    interval: Duration,
    ctx: Arc<Collaborators>,
    cancel: CancellationToken,
    tick: F,
) -> JoinHandle<()>
where
    F: Fn(Arc<Collaborators>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), EngineError>> + Send,
{
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(timer = name, "driver stopping");
                    break;
                }
                _ = timer.tick() => {
                    if let Err(err) = tick(ctx.clone()).await {
                        tracing::error!(timer = name, error = %err, "tick failed");
                    }
                }
            }
        }
    })
}

/// Run `process` over each entity with bounded concurrency, logging
/// failures per entity so the tick keeps going.
async fn process_all<E, F, Fut>(kind: &'static str, entities: Vec<E>, process: F)
where
    E: Send,
    F: Fn(E) -> Fut,
    Fut: Future<Output = Result<(), EngineError>>,
{
    stream::iter(entities)
        .for_each_concurrent(TICK_CONCURRENCY, |entity| {
            let fut = process(entity);
            async move {
                match fut.await {
                    Ok(()) => {}
                    Err(err) if err.is_conflict() => {
                        tracing::debug!(kind, "entity tick lost version race");
                    }
                    Err(err) => {
                        tracing::error!(kind, error = %err, "entity tick failed");
                    }
                }
            }
        })
        .await;
}

/// Pool → Node → Scaleset state update.
pub async fn workers_tick(ctx: &Collaborators) -> Result<(), EngineError> {
    let pools = PoolProcessor::new(ctx).search_needs_work().await?;
    process_all("pool", pools, move |pool| async move {
        PoolProcessor::new(ctx).process_state_update(pool).await.map(drop)
    })
    .await;

    NodeProcessor::new(ctx).check_timeouts().await?;
    let nodes = NodeProcessor::new(ctx).search_needs_work().await?;
    process_all("node", nodes, move |node| async move {
        NodeProcessor::new(ctx).process_state_update(node).await.map(drop)
    })
    .await;

    let scalesets = ScalesetProcessor::new(ctx).search_needs_work().await?;
    process_all("scaleset", scalesets, move |scaleset| async move {
        ScalesetProcessor::new(ctx).process_state_update(scaleset).await.map(drop)
    })
    .await;

    Ok(())
}

/// Heartbeats, Job + Task state update, timeout sweeps, scheduler.
pub async fn tasks_tick(ctx: &Collaborators) -> Result<(), EngineError> {
    drain_node_heartbeats(ctx).await?;
    drain_task_heartbeats(ctx).await?;

    JobProcessor::new(ctx).check_expired().await?;
    let jobs = JobProcessor::new(ctx).search_needs_work().await?;
    process_all("job", jobs, move |job| async move {
        JobProcessor::new(ctx).process_state_update(job).await.map(drop)
    })
    .await;

    TaskProcessor::new(ctx).check_timeouts().await?;
    let tasks = TaskProcessor::new(ctx).search_needs_work().await?;
    process_all("task", tasks, move |task| async move {
        TaskProcessor::new(ctx).process_state_update(task).await.map(drop)
    })
    .await;

    schedule_tasks(ctx).await?;
    Ok(())
}

/// Expire debug tunnels whose lease ran out.
pub async fn proxy_tick(ctx: &Collaborators) -> Result<(), EngineError> {
    for forward in ctx.proxy_forwards().search_expired(ctx.now()).await? {
        tracing::info!(
            region = %forward.region,
            port = forward.port,
            machine_id = %forward.machine_id,
            "proxy forward expired"
        );
        ctx.proxy_forwards().delete(&forward).await?;
    }
    Ok(())
}

/// Flag scalesets whose pool config moved out from under them.
pub async fn daily_tick(ctx: &Collaborators) -> Result<(), EngineError> {
    for pool in ctx.pools().search_states(&[PoolState::Running]).await? {
        let current = pool_config_hash(&pool);
        for mut scaleset in ctx.scalesets().search_by_pool(&pool.name).await? {
            if scaleset.config_hash.as_deref() != Some(current.as_str())
                && !scaleset.needs_config_update
                && !scaleset.state.shutting_down()
            {
                tracing::info!(scaleset_id = %scaleset.scaleset_id, "pool config changed");
                scaleset.needs_config_update = true;
                ctx.scalesets().save(&mut scaleset).await?;
            }
        }
    }
    Ok(())
}

/// Scrub identity stamps past the retention window and delete queues
/// abandoned by stopped tasks.
pub async fn retention_tick(ctx: &Collaborators) -> Result<(), EngineError> {
    let cutoff = ctx.now() - ctx.config.pii_retention;

    for mut job in ctx.jobs().search_states(JobState::needs_work()).await? {
        if job.created < cutoff && job.user_info.as_ref().is_some_and(|info| !info.is_scrubbed())
        {
            if let Some(info) = job.user_info.as_mut() {
                info.scrub();
            }
            ctx.jobs().save(&mut job).await?;
        }
    }
    for mut job in ctx.jobs().search_states(&[JobState::Stopped]).await? {
        if job.created < cutoff && job.user_info.as_ref().is_some_and(|info| !info.is_scrubbed())
        {
            if let Some(info) = job.user_info.as_mut() {
                info.scrub();
            }
            ctx.jobs().save(&mut job).await?;
        }
    }

    for mut task in ctx.tasks().search_states(&[TaskState::Stopped]).await? {
        if task.created < cutoff {
            if task.user_info.as_ref().is_some_and(|info| !info.is_scrubbed()) {
                if let Some(info) = task.user_info.as_mut() {
                    info.scrub();
                }
                ctx.tasks().save(&mut task).await?;
            }
            // Stopped tasks should have no queue left; deleting again
            // is a no-op that catches missed cleanups.
            ctx.queues.delete_queue(&task.queue_name()).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "drivers_tests.rs"]
mod tests;
