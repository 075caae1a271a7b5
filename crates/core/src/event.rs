// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Telemetry events emitted by repositories and processors.
//!
//! Events are observational: nothing in the core reads them back to
//! make decisions. They fan out over a broadcast channel to logging
//! and any realtime subscribers.

use crate::error::Fault;
use crate::id::{JobId, MachineId, PoolId, ScalesetId, TaskId, WorkSetId};
use crate::job::JobState;
use crate::node::NodeState;
use crate::pool::PoolName;
use crate::scaleset::ScalesetState;
use crate::task::TaskState;
use serde::{Deserialize, Serialize};

/// Everything observable that happens to an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventMessage {
    JobCreated {
        job_id: JobId,
    },
    JobStopped {
        job_id: JobId,
    },
    TaskCreated {
        job_id: JobId,
        task_id: TaskId,
    },
    TaskStateUpdated {
        job_id: JobId,
        task_id: TaskId,
        state: TaskState,
    },
    TaskStopped {
        job_id: JobId,
        task_id: TaskId,
    },
    TaskFailed {
        job_id: JobId,
        task_id: TaskId,
        error: Fault,
    },
    TaskHeartbeat {
        job_id: JobId,
        task_id: TaskId,
    },
    PoolCreated {
        pool_id: PoolId,
        pool_name: PoolName,
    },
    PoolDeleted {
        pool_id: PoolId,
        pool_name: PoolName,
    },
    ScalesetCreated {
        scaleset_id: ScalesetId,
        pool_name: PoolName,
    },
    ScalesetFailed {
        scaleset_id: ScalesetId,
        pool_name: PoolName,
        error: Fault,
    },
    ScalesetStateUpdated {
        scaleset_id: ScalesetId,
        state: ScalesetState,
    },
    ScalesetResizeScheduled {
        scaleset_id: ScalesetId,
        size: u64,
    },
    ScalesetDeleted {
        scaleset_id: ScalesetId,
        pool_name: PoolName,
    },
    NodeCreated {
        machine_id: MachineId,
        pool_name: PoolName,
    },
    NodeStateUpdated {
        machine_id: MachineId,
        state: NodeState,
    },
    NodeHeartbeat {
        machine_id: MachineId,
    },
    NodeDeleted {
        machine_id: MachineId,
        pool_name: PoolName,
    },
    WorkSetDispatched {
        workset_id: WorkSetId,
        pool_name: PoolName,
        task_ids: Vec<TaskId>,
    },
    JobStateUpdated {
        job_id: JobId,
        state: JobState,
    },
}
