// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task state machine.

use crate::context::Collaborators;
use crate::error::EngineError;
use fg_core::{Fault, NodeCommand, StopTaskCommand, Task, TaskState};
use fg_storage::QueueClient;

pub struct TaskProcessor<'a> {
    ctx: &'a Collaborators,
}

impl<'a> TaskProcessor<'a> {
    pub fn new(ctx: &'a Collaborators) -> Self {
        Self { ctx }
    }

    pub async fn search_needs_work(&self) -> Result<Vec<Task>, EngineError> {
        self.ctx.tasks().search_states(TaskState::needs_work()).await
    }

    /// Advance the task one step. Waiting is the scheduler's business;
    /// Scheduled through Running advance on agent events.
    pub async fn process_state_update(&self, mut task: Task) -> Result<Task, EngineError> {
        match task.state {
            TaskState::Init => self.process_init(&mut task).await?,
            TaskState::Stopping => self.process_stopping(&mut task).await?,
            _ => {}
        }
        Ok(task)
    }

    /// Provision the task's private queue, then wait for scheduling.
    async fn process_init(&self, task: &mut Task) -> Result<(), EngineError> {
        self.ctx.queues.create_queue(&task.queue_name()).await?;
        self.ctx.tasks().set_state(task, TaskState::Waiting).await
    }

    /// Tell every node running the task to stop it; once the last
    /// association row is gone the task is Stopped and its queue dies.
    async fn process_stopping(&self, task: &mut Task) -> Result<(), EngineError> {
        let rows = self.ctx.node_tasks().get_by_task(task.task_id).await?;
        if rows.is_empty() {
            self.ctx.queues.delete_queue(&task.queue_name()).await?;
            return self.ctx.tasks().set_state(task, TaskState::Stopped).await;
        }
        for row in rows {
            self.ctx
                .messages()
                .send_once(
                    row.machine_id,
                    NodeCommand::StopTask(StopTaskCommand { task_id: task.task_id }),
                )
                .await?;
        }
        Ok(())
    }

    /// Timeout and cross-entity checks, invoked every tasks tick.
    pub async fn check_timeouts(&self) -> Result<(), EngineError> {
        let now = self.ctx.now();

        for mut task in self.ctx.tasks().search_expired(now).await? {
            tracing::info!(task_id = %task.task_id, "task duration elapsed");
            self.ctx.tasks().mark_stopping(&mut task).await?;
        }

        for mut task in self.ctx.tasks().search_states(&[TaskState::Running]).await? {
            if task.heartbeat_stale(now, self.ctx.config.task_heartbeat_timeout) {
                tracing::warn!(task_id = %task.task_id, "task heartbeat timed out");
                self.ctx
                    .tasks()
                    .mark_failed(&mut task, Fault::task_failed("task heartbeat timed out"))
                    .await?;
            }
        }

        // A task parked on its job follows the job into shutdown.
        for mut task in self.ctx.tasks().search_states(&[TaskState::WaitJob]).await? {
            let job = self.ctx.jobs().get(task.job_id).await?;
            if job.is_none_or(|job| job.state.shutting_down()) {
                self.ctx.tasks().mark_stopping(&mut task).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
