// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task repository.
//!
//! Lookups are always keyed `(job_id, task_id)`; there is no
//! whole-table scan by task id alone.

use super::state_values;
use crate::context::Collaborators;
use crate::error::EngineError;
use chrono::{DateTime, Utc};
use fg_core::{EventMessage, Fault, JobId, Task, TaskId, TaskState};
use fg_storage::{QueryFilter, TableStoreExt};

pub struct TaskRepo<'a> {
    ctx: &'a Collaborators,
}

impl<'a> TaskRepo<'a> {
    pub(crate) fn new(ctx: &'a Collaborators) -> Self {
        Self { ctx }
    }

    pub async fn get(&self, job_id: JobId, task_id: TaskId) -> Result<Option<Task>, EngineError> {
        Ok(self.ctx.store.get::<Task>(&job_id.to_string(), &task_id.to_string()).await?)
    }

    pub async fn insert(&self, task: &mut Task) -> Result<(), EngineError> {
        self.ctx.store.insert(task).await?;
        self.ctx
            .emit(EventMessage::TaskCreated { job_id: task.job_id, task_id: task.task_id });
        Ok(())
    }

    pub async fn save(&self, task: &mut Task) -> Result<(), EngineError> {
        self.ctx.store.replace(task).await?;
        Ok(())
    }

    pub async fn delete(&self, task: &Task) -> Result<(), EngineError> {
        self.ctx.store.delete(task).await?;
        Ok(())
    }

    /// Transition and persist, emitting the state change.
    pub async fn set_state(&self, task: &mut Task, state: TaskState) -> Result<(), EngineError> {
        if task.state == state {
            return Ok(());
        }
        tracing::info!(
            job_id = %task.job_id,
            task_id = %task.task_id,
            from = %task.state,
            to = %state,
            "task state"
        );
        task.state = state;
        self.ctx.store.replace(task).await?;
        self.ctx.emit(EventMessage::TaskStateUpdated {
            job_id: task.job_id,
            task_id: task.task_id,
            state,
        });
        if state == TaskState::Stopped {
            self.ctx
                .emit(EventMessage::TaskStopped { job_id: task.job_id, task_id: task.task_id });
        }
        Ok(())
    }

    /// Begin shutdown. Entry into the shutdown subset is one-way, so
    /// tasks already shutting down are left untouched.
    pub async fn mark_stopping(&self, task: &mut Task) -> Result<(), EngineError> {
        if task.state.shutting_down() {
            return Ok(());
        }
        self.set_state(task, TaskState::Stopping).await
    }

    /// Record a failure and begin shutdown. The first failure wins;
    /// later reports against a stopping task are dropped.
    pub async fn mark_failed(&self, task: &mut Task, error: Fault) -> Result<(), EngineError> {
        if task.state.shutting_down() {
            tracing::debug!(
                task_id = %task.task_id,
                "ignoring failure report for task already shutting down"
            );
            return Ok(());
        }
        task.error = Some(error.clone());
        self.set_state(task, TaskState::Stopping).await?;
        self.ctx.emit(EventMessage::TaskFailed {
            job_id: task.job_id,
            task_id: task.task_id,
            error,
        });
        Ok(())
    }

    pub async fn search_states(&self, states: &[TaskState]) -> Result<Vec<Task>, EngineError> {
        let filter = QueryFilter::new().is_in("state", state_values(states));
        Ok(self.ctx.store.query(filter).await?)
    }

    pub async fn search_by_job(
        &self,
        job_id: JobId,
        states: &[TaskState],
    ) -> Result<Vec<Task>, EngineError> {
        let mut filter = QueryFilter::new().eq("job_id", job_id.to_string());
        if !states.is_empty() {
            filter = filter.is_in("state", state_values(states));
        }
        Ok(self.ctx.store.query(filter).await?)
    }

    /// Live tasks whose duration has elapsed.
    pub async fn search_expired(&self, now: DateTime<Utc>) -> Result<Vec<Task>, EngineError> {
        let live: Vec<TaskState> = [
            TaskState::Init,
            TaskState::Waiting,
            TaskState::Scheduled,
            TaskState::SettingUp,
            TaskState::Running,
            TaskState::WaitJob,
        ]
        .to_vec();
        let filter = QueryFilter::new()
            .is_in("state", state_values(&live))
            .timestamp_before("end_time", now);
        Ok(self.ctx.store.query(filter).await?)
    }
}

#[cfg(test)]
#[path = "tasks_tests.rs"]
mod tests;
