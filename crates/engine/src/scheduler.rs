// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler: turns ready tasks into work-sets on pool queues.
//!
//! Ready means Waiting, with an available job and every prerequisite
//! Running or stopped without error. Tasks marked colocate pack into a
//! shared work-set up to the configured vm_count ceiling; everything
//! else ships alone. The Waiting→Scheduled transition is guarded by
//! the version stamp, so concurrent schedulers dispatch a task at most
//! once.

use crate::context::Collaborators;
use crate::error::EngineError;
use fg_core::{
    EventMessage, Job, JobId, Pool, PoolName, PoolState, Task, TaskState, WorkSet,
    WorkSetEnvelope, WorkSetId, WorkUnit,
};
use fg_storage::QueueClient;
use std::collections::HashMap;

/// One scheduling pass. Returns the number of work-sets dispatched.
pub async fn schedule_tasks(ctx: &Collaborators) -> Result<usize, EngineError> {
    let mut waiting = ctx.tasks().search_states(&[TaskState::Waiting]).await?;
    if waiting.is_empty() {
        return Ok(0);
    }
    // Earliest created wins among equal-priority tasks.
    waiting.sort_by_key(|task| task.created);

    let mut jobs: HashMap<JobId, Option<Job>> = HashMap::new();
    let mut pools: HashMap<PoolName, Option<Pool>> = HashMap::new();
    let mut buckets: Vec<(Pool, Vec<Task>)> = Vec::new();

    for task in waiting {
        let job = match cached_job(ctx, &mut jobs, task.job_id).await? {
            Some(job) if job.state.available() => job,
            _ => continue,
        };
        if !prereqs_satisfied(ctx, &job, &task).await? {
            continue;
        }

        let pool_name = task.config.pool.pool_name.clone();
        let pool = match cached_pool(ctx, &mut pools, &pool_name).await? {
            Some(pool) if pool.state == PoolState::Running => pool,
            Some(pool) => {
                tracing::debug!(task_id = %task.task_id, pool = %pool.name, state = %pool.state,
                    "pool not running, skipping task");
                continue;
            }
            None => {
                tracing::warn!(task_id = %task.task_id, pool = %pool_name, "pool not found");
                continue;
            }
        };

        // Colocated tasks pack into the pool's open bucket while the
        // total vm demand fits; everything else ships alone.
        if task.config.colocate {
            let slot = buckets.iter().position(|(bucket_pool, members)| {
                bucket_pool.pool_id == pool.pool_id
                    && members.iter().all(|member| member.config.colocate)
                    && members.iter().map(|member| member.config.pool.count).sum::<u64>()
                        + task.config.pool.count
                        <= ctx.config.max_workset_vm_count
            });
            match slot {
                Some(index) => buckets[index].1.push(task),
                None => buckets.push((pool, vec![task])),
            }
        } else {
            buckets.push((pool, vec![task]));
        }
    }

    let mut dispatched = 0;
    for (pool, tasks) in buckets {
        if dispatch_workset(ctx, &pool, tasks).await? {
            dispatched += 1;
        }
    }
    Ok(dispatched)
}

async fn cached_job(
    ctx: &Collaborators,
    cache: &mut HashMap<JobId, Option<Job>>,
    job_id: JobId,
) -> Result<Option<Job>, EngineError> {
    if let Some(job) = cache.get(&job_id) {
        return Ok(job.clone());
    }
    let job = ctx.jobs().get(job_id).await?;
    cache.insert(job_id, job.clone());
    Ok(job)
}

async fn cached_pool(
    ctx: &Collaborators,
    cache: &mut HashMap<PoolName, Option<Pool>>,
    name: &PoolName,
) -> Result<Option<Pool>, EngineError> {
    if let Some(pool) = cache.get(name) {
        return Ok(pool.clone());
    }
    let pool = ctx.pools().get_by_name(name).await?;
    cache.insert(name.clone(), pool.clone());
    Ok(pool)
}

/// Every prerequisite must be Running, or Stopped without error.
async fn prereqs_satisfied(
    ctx: &Collaborators,
    job: &Job,
    task: &Task,
) -> Result<bool, EngineError> {
    for prereq_id in &task.config.prereq_tasks {
        let Some(prereq) = ctx.tasks().get(job.job_id, *prereq_id).await? else {
            tracing::warn!(
                task_id = %task.task_id,
                prereq = %prereq_id,
                "prerequisite task does not exist"
            );
            return Ok(false);
        };
        let satisfied = match prereq.state {
            TaskState::Running => true,
            TaskState::Stopped => prereq.error.is_none(),
            _ => false,
        };
        if !satisfied {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Persist the work-set, enqueue its envelope, then conditionally move
/// each member to Scheduled. A member that loses its version race is
/// skipped; the gate at can-schedule keeps stale envelopes harmless.
async fn dispatch_workset(
    ctx: &Collaborators,
    pool: &Pool,
    tasks: Vec<Task>,
) -> Result<bool, EngineError> {
    let work_units: Vec<WorkUnit> = tasks
        .iter()
        .map(|task| WorkUnit {
            job_id: task.job_id,
            task_id: task.task_id,
            config: serde_json::json!({
                "os": task.os,
                "task": task.config,
            }),
        })
        .collect();

    let setup_container = tasks
        .iter()
        .flat_map(|task| task.config.containers.iter())
        .find(|container| container.kind == fg_core::ContainerKind::Setup)
        .map(|container| container.name.clone())
        .unwrap_or_default();

    let mut workset = WorkSet {
        workset_id: WorkSetId::new(),
        work_units,
        setup_container,
        script: false,
        reboot: tasks.iter().any(|task| task.config.reboot_after_setup),
        version: 0,
    };
    ctx.worksets().insert(&mut workset).await?;

    let envelope = serde_json::to_vec(&WorkSetEnvelope { workset_id: workset.workset_id })?;
    ctx.queues.enqueue(&pool.queue_name(), envelope, None).await?;

    let mut scheduled = Vec::new();
    for mut task in tasks {
        // The job may have begun stopping between selection and now;
        // leave such tasks for the task processor's stopping branch.
        let job_live = ctx
            .jobs()
            .get(task.job_id)
            .await?
            .is_some_and(|job| job.state.available());
        if !job_live {
            continue;
        }
        if task.state != TaskState::Waiting {
            continue;
        }
        match ctx.tasks().set_state(&mut task, TaskState::Scheduled).await {
            Ok(()) => scheduled.push(task.task_id),
            Err(err) if err.is_conflict() => {
                tracing::debug!(task_id = %task.task_id, "lost scheduling race, skipping");
            }
            Err(err) => return Err(err),
        }
    }

    if scheduled.is_empty() {
        // Nothing transitioned: drop the record so the stale envelope
        // dies at the can-schedule gate with nothing to find.
        let _ = ctx.worksets().delete(&workset).await;
        return Ok(false);
    }

    ctx.emit(EventMessage::WorkSetDispatched {
        workset_id: workset.workset_id,
        pool_name: pool.name.clone(),
        task_ids: scheduled,
    });
    Ok(true)
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
