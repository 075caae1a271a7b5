// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task endpoints.

use crate::app::AppContext;
use crate::auth::Authenticated;
use crate::error::ApiError;
use axum::extract::{Query, State};
use axum::Json;
use fg_core::{ErrorCode, Fault, Task, TaskId, TaskState};
use fg_wire::{TaskCreateRequest, TaskSearchRequest, TaskStopRequest};

/// `GET /tasks`.
pub async fn search(
    State(app): State<AppContext>,
    auth: Authenticated,
    Query(query): Query<TaskSearchRequest>,
) -> Result<Json<Vec<Task>>, ApiError> {
    auth.require_user()?;

    if let (Some(job_id), Some(task_id)) = (query.job_id, query.task_id) {
        let task = app
            .ctx
            .tasks()
            .get(job_id, task_id)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError(Fault::unable_to_find(format_args!("task {}", task_id))))?;
        return Ok(Json(vec![task]));
    }
    if let Some(job_id) = query.job_id {
        let states: Vec<TaskState> = query.state.into_iter().collect();
        return Ok(Json(
            app.ctx.tasks().search_by_job(job_id, &states).await.map_err(ApiError::from)?,
        ));
    }
    let states = match query.state {
        Some(state) => vec![state],
        None => vec![
            TaskState::Init,
            TaskState::Waiting,
            TaskState::Scheduled,
            TaskState::SettingUp,
            TaskState::Running,
            TaskState::Stopping,
            TaskState::Stopped,
            TaskState::WaitJob,
        ],
    };
    Ok(Json(app.ctx.tasks().search_states(&states).await.map_err(ApiError::from)?))
}

/// `POST /tasks`: validate against the job, pool, and prerequisites,
/// then create the task in Init.
pub async fn create(
    State(app): State<AppContext>,
    auth: Authenticated,
    Json(request): Json<TaskCreateRequest>,
) -> Result<Json<Task>, ApiError> {
    auth.require_user()?;

    let mut job = app
        .ctx
        .jobs()
        .get(request.job_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| {
            ApiError(Fault::with_message(
                ErrorCode::InvalidJob,
                format!("job {} does not exist", request.job_id),
            ))
        })?;
    if !job.state.available() {
        return Err(ApiError(Fault::with_message(
            ErrorCode::UnableToAddTaskToJob,
            format!("job {} is {}", job.job_id, job.state),
        )));
    }

    let config = request.config;
    if config.pool.count == 0 {
        return Err(ApiError(Fault::invalid_request("vm count must be at least 1")));
    }
    let pool = app
        .ctx
        .pools()
        .get_by_name(&config.pool.pool_name)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| {
            ApiError(Fault::unable_to_find(format_args!("pool '{}'", config.pool.pool_name)))
        })?;

    // Prerequisites must already exist within the same job.
    for prereq_id in &config.prereq_tasks {
        let exists = app
            .ctx
            .tasks()
            .get(request.job_id, *prereq_id)
            .await
            .map_err(ApiError::from)?
            .is_some();
        if !exists {
            return Err(ApiError(Fault::invalid_request(format!(
                "prerequisite task {} does not exist in job {}",
                prereq_id, request.job_id
            ))));
        }
    }

    let mut task = Task::new(request.job_id, TaskId::new(), pool.os, config, app.ctx.now());
    task.user_info = Some(auth.user_info());
    app.ctx.tasks().insert(&mut task).await?;

    // The first task flips its job from Init to Enabled.
    if job.state == fg_core::JobState::Init {
        app.ctx.jobs().set_state(&mut job, fg_core::JobState::Enabled).await?;
    }
    Ok(Json(task))
}

/// `DELETE /tasks`: begin stopping one task.
pub async fn stop(
    State(app): State<AppContext>,
    auth: Authenticated,
    Json(request): Json<TaskStopRequest>,
) -> Result<Json<Task>, ApiError> {
    auth.require_user()?;

    let mut task = app
        .ctx
        .tasks()
        .get(request.job_id, request.task_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| {
            ApiError(Fault::unable_to_find(format_args!("task {}", request.task_id)))
        })?;
    app.ctx.tasks().mark_stopping(&mut task).await?;
    Ok(Json(task))
}
