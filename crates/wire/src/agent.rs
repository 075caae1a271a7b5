// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent-facing protocol DTOs: registration, scheduling gate, events,
//! and command polling.

use fg_core::{
    JobId, MachineId, NodeCommand, Os, PoolName, ScalesetId, StateUpdateEvent, TaskId, WorkerEvent,
};
use fg_storage::QueueHandle;
use serde::{Deserialize, Serialize};

/// Query parameters for `GET /agents/registration`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationGet {
    pub machine_id: MachineId,
}

/// Query parameters for `POST /agents/registration`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationPost {
    pub machine_id: MachineId,
    pub pool_name: PoolName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaleset_id: Option<ScalesetId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<Os>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_name: Option<String>,
}

/// Everything an agent needs to start working against its pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub events_url: String,
    pub commands_url: String,
    /// Credentialed handle onto the pool queue (24h).
    pub work_queue: QueueHandle,
}

/// Body of `POST /agents/can_schedule`.
///
/// `job_id` is required: task lookups are keyed by `(job_id, task_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanScheduleRequest {
    pub machine_id: MachineId,
    pub task_id: TaskId,
    pub job_id: JobId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanScheduleResponse {
    /// The node may take the task, and the instance is now protected
    /// from scale-in while it runs.
    pub allowed: bool,
    /// The task no longer exists or is shutting down.
    pub work_stopped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CanScheduleResponse {
    pub fn allow() -> Self {
        Self { allowed: true, work_stopped: false, reason: None }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self { allowed: false, work_stopped: false, reason: Some(reason.into()) }
    }

    pub fn stopped(reason: impl Into<String>) -> Self {
        Self { allowed: false, work_stopped: true, reason: Some(reason.into()) }
    }
}

/// Combined event form: a state update, a worker event, or both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeEventBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_update: Option<StateUpdateEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_event: Option<WorkerEvent>,
}

/// The event payload of a [`NodeStateEnvelope`].
///
/// Untagged: the combined form is tried first and rejects unknown
/// fields, so bare state updates and worker events fall through to
/// their own variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeEventEnvelope {
    Event(NodeEventBody),
    StateUpdate(StateUpdateEvent),
    WorkerEvent(WorkerEvent),
}

impl NodeEventEnvelope {
    /// Flatten any of the three wire forms into (state_update, worker_event).
    pub fn into_parts(self) -> (Option<StateUpdateEvent>, Option<WorkerEvent>) {
        match self {
            NodeEventEnvelope::Event(body) => (body.state_update, body.worker_event),
            NodeEventEnvelope::StateUpdate(update) => (Some(update), None),
            NodeEventEnvelope::WorkerEvent(event) => (None, Some(event)),
        }
    }
}

/// Body of `POST /agents/events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStateEnvelope {
    pub machine_id: MachineId,
    pub event: NodeEventEnvelope,
}

/// Response of `GET /agents/commands`: the oldest pending command, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingNodeCommand {
    pub message_id: String,
    pub command: NodeCommand,
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
