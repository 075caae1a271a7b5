// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work-sets: the unit of dispatch onto pool queues.

use crate::id::{JobId, TaskId, WorkSetId};
use serde::{Deserialize, Serialize};

/// One task's share of a work-set. The config is the full task setup
/// an agent needs, serialized opaquely so agent versions can evolve
/// without the scheduler caring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkUnit {
    pub job_id: JobId,
    pub task_id: TaskId,
    pub config: serde_json::Value,
}

/// One unit of dispatch: one or more co-located tasks plus the shared
/// setup they need, enqueued onto a pool queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkSet {
    pub workset_id: WorkSetId,
    pub work_units: Vec<WorkUnit>,
    /// Container holding the setup script and task binaries.
    pub setup_container: String,
    /// Run the setup script before starting work.
    pub script: bool,
    /// Reboot the node between setup and the first task.
    pub reboot: bool,
    /// Storage-owned version stamp.
    #[serde(default)]
    pub version: u64,
}

impl WorkSet {
    pub fn task_ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.work_units.iter().map(|unit| unit.task_id)
    }

    /// Total VM demand of the set is its unit count: colocated units
    /// share nodes, so each unit contributes one slot.
    pub fn len(&self) -> usize {
        self.work_units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.work_units.is_empty()
    }
}

/// Envelope enqueued on the pool queue; references the stored record
/// rather than inlining it so redelivery stays cheap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSetEnvelope {
    pub workset_id: WorkSetId,
}

#[cfg(test)]
#[path = "workset_tests.rs"]
mod tests;
