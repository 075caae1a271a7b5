// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Active execution of one task on one node.

use crate::id::{JobId, MachineId, TaskId};
use serde::{Deserialize, Serialize};

/// Execution states reported by the agent for a (node, task) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeTaskState {
    Init,
    SettingUp,
    Running,
}

crate::simple_display! {
    NodeTaskState {
        Init => "init",
        SettingUp => "setting_up",
        Running => "running",
    }
}

/// Association row created when a node begins setting up a task and
/// deleted when the task completes on that node (unless debug-keep).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeTasks {
    pub machine_id: MachineId,
    pub task_id: TaskId,
    pub job_id: JobId,
    pub state: NodeTaskState,
    /// Storage-owned version stamp.
    #[serde(default)]
    pub version: u64,
}

impl NodeTasks {
    pub fn new(machine_id: MachineId, task_id: TaskId, job_id: JobId) -> Self {
        Self { machine_id, task_id, job_id, state: NodeTaskState::Init, version: 0 }
    }
}
