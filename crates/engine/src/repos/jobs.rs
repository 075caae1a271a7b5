// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job repository.

use super::state_values;
use crate::context::Collaborators;
use crate::error::EngineError;
use chrono::{DateTime, Utc};
use fg_core::{EventMessage, Job, JobId, JobState};
use fg_storage::{QueryFilter, TableStoreExt};

pub struct JobRepo<'a> {
    ctx: &'a Collaborators,
}

impl<'a> JobRepo<'a> {
    pub(crate) fn new(ctx: &'a Collaborators) -> Self {
        Self { ctx }
    }

    pub async fn get(&self, job_id: JobId) -> Result<Option<Job>, EngineError> {
        let key = job_id.to_string();
        Ok(self.ctx.store.get::<Job>(&key, &key).await?)
    }

    pub async fn insert(&self, job: &mut Job) -> Result<(), EngineError> {
        self.ctx.store.insert(job).await?;
        self.ctx.emit(EventMessage::JobCreated { job_id: job.job_id });
        Ok(())
    }

    pub async fn save(&self, job: &mut Job) -> Result<(), EngineError> {
        self.ctx.store.replace(job).await?;
        Ok(())
    }

    /// Transition and persist, emitting the state change.
    pub async fn set_state(&self, job: &mut Job, state: JobState) -> Result<(), EngineError> {
        if job.state == state {
            return Ok(());
        }
        tracing::info!(job_id = %job.job_id, from = %job.state, to = %state, "job state");
        job.state = state;
        self.ctx.store.replace(job).await?;
        self.ctx.emit(EventMessage::JobStateUpdated { job_id: job.job_id, state });
        if state == JobState::Stopped {
            self.ctx.emit(EventMessage::JobStopped { job_id: job.job_id });
        }
        Ok(())
    }

    pub async fn search_states(&self, states: &[JobState]) -> Result<Vec<Job>, EngineError> {
        let filter = QueryFilter::new().is_in("state", state_values(states));
        Ok(self.ctx.store.query(filter).await?)
    }

    /// Live jobs whose duration has elapsed.
    pub async fn search_expired(&self, now: DateTime<Utc>) -> Result<Vec<Job>, EngineError> {
        let filter = QueryFilter::new()
            .is_in("state", state_values(&[JobState::Init, JobState::Enabled]))
            .timestamp_before("end_time", now);
        Ok(self.ctx.store.query(filter).await?)
    }
}
