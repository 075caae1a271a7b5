// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! NodeTasks repository: the (node, task) association rows.

use crate::context::Collaborators;
use crate::error::EngineError;
use fg_core::{JobId, MachineId, NodeTaskState, NodeTasks, TaskId};
use fg_storage::{QueryFilter, StorageError, TableStoreExt};

pub struct NodeTasksRepo<'a> {
    ctx: &'a Collaborators,
}

impl<'a> NodeTasksRepo<'a> {
    pub(crate) fn new(ctx: &'a Collaborators) -> Self {
        Self { ctx }
    }

    pub async fn get(
        &self,
        machine_id: MachineId,
        task_id: TaskId,
    ) -> Result<Option<NodeTasks>, EngineError> {
        Ok(self
            .ctx
            .store
            .get::<NodeTasks>(&machine_id.to_string(), &task_id.to_string())
            .await?)
    }

    /// Create or update the association, moving it to `state`.
    pub async fn upsert(
        &self,
        machine_id: MachineId,
        task_id: TaskId,
        job_id: JobId,
        state: NodeTaskState,
    ) -> Result<(), EngineError> {
        match self.get(machine_id, task_id).await? {
            Some(mut row) => {
                if row.state == state {
                    return Ok(());
                }
                row.state = state;
                self.ctx.store.replace(&mut row).await?;
            }
            None => {
                let mut row = NodeTasks::new(machine_id, task_id, job_id);
                row.state = state;
                match self.ctx.store.insert(&mut row).await {
                    Ok(()) => {}
                    // A concurrent writer beat us; the row exists, which
                    // is all this call guarantees.
                    Err(StorageError::AlreadyExists { .. }) => {}
                    Err(err) => return Err(err.into()),
                }
            }
        }
        Ok(())
    }

    pub async fn delete(&self, row: &NodeTasks) -> Result<(), EngineError> {
        match self.ctx.store.delete(row).await {
            Ok(()) => Ok(()),
            Err(StorageError::NotFound { .. }) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn get_by_machine(
        &self,
        machine_id: MachineId,
    ) -> Result<Vec<NodeTasks>, EngineError> {
        let filter = QueryFilter::new().eq("machine_id", machine_id.to_string());
        Ok(self.ctx.store.query(filter).await?)
    }

    /// Rows for one task across all nodes (vm_count > 1 shares a task).
    pub async fn get_by_task(&self, task_id: TaskId) -> Result<Vec<NodeTasks>, EngineError> {
        let filter = QueryFilter::new().eq("task_id", task_id.to_string());
        Ok(self.ctx.store.query(filter).await?)
    }
}
