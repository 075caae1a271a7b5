// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TaskEvent repository: the per-task audit trail of worker events.

use crate::context::Collaborators;
use crate::error::EngineError;
use fg_core::{MachineId, TaskEvent, TaskId, WorkerEvent};
use fg_storage::{QueryFilter, StorageError, TableStoreExt};

pub struct TaskEventRepo<'a> {
    ctx: &'a Collaborators,
}

impl<'a> TaskEventRepo<'a> {
    pub(crate) fn new(ctx: &'a Collaborators) -> Self {
        Self { ctx }
    }

    /// Append an audit row. Replayed deliveries land on the same row
    /// key and are dropped, keeping the trail duplicate-free.
    pub async fn record(
        &self,
        task_id: TaskId,
        machine_id: MachineId,
        event_data: WorkerEvent,
    ) -> Result<(), EngineError> {
        let mut event = TaskEvent {
            task_id,
            machine_id,
            event_data,
            recorded_at: self.ctx.now(),
            version: 0,
        };
        match self.ctx.store.insert(&mut event).await {
            Ok(()) | Err(StorageError::AlreadyExists { .. }) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn search_by_task(&self, task_id: TaskId) -> Result<Vec<TaskEvent>, EngineError> {
        let filter = QueryFilter::new().eq("task_id", task_id.to_string());
        Ok(self.ctx.store.query(filter).await?)
    }
}
