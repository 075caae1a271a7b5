// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job endpoints.

use crate::app::AppContext;
use crate::auth::Authenticated;
use crate::error::ApiError;
use axum::extract::{Query, State};
use axum::Json;
use fg_core::{Fault, Job, JobConfig, JobId, JobState};
use fg_wire::{JobGetRequest, JobSearchRequest};

async fn load_job(app: &AppContext, job_id: JobId) -> Result<Job, ApiError> {
    app.ctx
        .jobs()
        .get(job_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError(Fault::unable_to_find(format_args!("job {}", job_id))))
}

/// `GET /jobs`: one job by id, or all jobs matching the filter.
pub async fn search(
    State(app): State<AppContext>,
    auth: Authenticated,
    Query(query): Query<JobSearchRequest>,
) -> Result<Json<Vec<Job>>, ApiError> {
    auth.require_user()?;

    if let Some(job_id) = query.job_id {
        return Ok(Json(vec![load_job(&app, job_id).await?]));
    }
    let states = match query.state {
        Some(state) => vec![state],
        None => vec![JobState::Init, JobState::Enabled, JobState::Stopping, JobState::Stopped],
    };
    Ok(Json(app.ctx.jobs().search_states(&states).await.map_err(ApiError::from)?))
}

/// `POST /jobs`: create a job in Init, stamped with the caller.
pub async fn create(
    State(app): State<AppContext>,
    auth: Authenticated,
    Json(config): Json<JobConfig>,
) -> Result<Json<Job>, ApiError> {
    auth.require_user()?;

    if config.duration_hours == 0 {
        return Err(ApiError(Fault::invalid_request("duration_hours must be at least 1")));
    }
    let mut job = Job::new(JobId::new(), config, app.ctx.now());
    job.user_info = Some(auth.user_info());
    app.ctx.jobs().insert(&mut job).await?;
    Ok(Json(job))
}

/// `DELETE /jobs`: begin stopping a job and everything under it.
pub async fn stop(
    State(app): State<AppContext>,
    auth: Authenticated,
    Json(request): Json<JobGetRequest>,
) -> Result<Json<Job>, ApiError> {
    auth.require_user()?;

    let mut job = load_job(&app, request.job_id).await?;
    if !job.state.shutting_down() {
        app.ctx.jobs().set_state(&mut job, JobState::Stopping).await?;
    }
    Ok(Json(job))
}
