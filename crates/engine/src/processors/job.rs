// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job state machine.

use crate::context::Collaborators;
use crate::error::EngineError;
use fg_core::{Job, JobState, TaskState};

pub struct JobProcessor<'a> {
    ctx: &'a Collaborators,
}

impl<'a> JobProcessor<'a> {
    pub fn new(ctx: &'a Collaborators) -> Self {
        Self { ctx }
    }

    pub async fn search_needs_work(&self) -> Result<Vec<Job>, EngineError> {
        self.ctx.jobs().search_states(JobState::needs_work()).await
    }

    /// Advance the job one step.
    pub async fn process_state_update(&self, mut job: Job) -> Result<Job, EngineError> {
        match job.state {
            JobState::Init => self.process_init(&mut job).await?,
            JobState::Enabled => self.process_enabled(&mut job).await?,
            JobState::Stopping => self.process_stopping(&mut job).await?,
            JobState::Stopped => {}
        }
        Ok(job)
    }

    /// A job that never received a task is abandoned after the grace
    /// window rather than lingering forever.
    async fn process_init(&self, job: &mut Job) -> Result<(), EngineError> {
        let age = self.ctx.now() - job.created;
        if age < self.ctx.config.never_started_job_timeout {
            return Ok(());
        }
        let tasks = self.ctx.tasks().search_by_job(job.job_id, &[]).await?;
        if tasks.is_empty() {
            tracing::info!(job_id = %job.job_id, "job never started, stopping");
            job.error = Some("job never started".to_string());
            self.ctx.jobs().set_state(job, JobState::Stopping).await?;
        }
        Ok(())
    }

    async fn process_enabled(&self, job: &mut Job) -> Result<(), EngineError> {
        if job.expired(self.ctx.now()) {
            tracing::info!(job_id = %job.job_id, "job duration elapsed, stopping");
            return self.ctx.jobs().set_state(job, JobState::Stopping).await;
        }
        let tasks = self.ctx.tasks().search_by_job(job.job_id, &[]).await?;
        if !tasks.is_empty() && tasks.iter().all(|task| task.state.shutting_down()) {
            self.ctx.jobs().set_state(job, JobState::Stopping).await?;
        }
        Ok(())
    }

    /// Drive every task into shutdown; the job is Stopped once they are.
    async fn process_stopping(&self, job: &mut Job) -> Result<(), EngineError> {
        let tasks = self.ctx.tasks().search_by_job(job.job_id, &[]).await?;
        for mut task in tasks.iter().filter(|task| !task.state.shutting_down()).cloned() {
            self.ctx.tasks().mark_stopping(&mut task).await?;
        }
        let all_stopped = tasks.is_empty()
            || self
                .ctx
                .tasks()
                .search_by_job(job.job_id, &[])
                .await?
                .iter()
                .all(|task| task.state == TaskState::Stopped);
        if all_stopped {
            self.ctx.jobs().set_state(job, JobState::Stopped).await?;
        }
        Ok(())
    }

    /// Force expired jobs into shutdown. Invoked every tasks tick.
    pub async fn check_expired(&self) -> Result<(), EngineError> {
        for mut job in self.ctx.jobs().search_expired(self.ctx.now()).await? {
            tracing::info!(job_id = %job.job_id, "job expired");
            self.ctx.jobs().set_state(&mut job, JobState::Stopping).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
