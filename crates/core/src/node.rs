// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node entity, state machine, and agent-reported state updates.

use crate::error::Fault;
use crate::id::{JobId, MachineId, PoolId, ScalesetId, TaskId};
use crate::pool::{Os, PoolName};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Node lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    Init,
    Free,
    SettingUp,
    Rebooting,
    Ready,
    Busy,
    Done,
    Shutdown,
    Halt,
}

crate::simple_display! {
    NodeState {
        Init => "init",
        Free => "free",
        SettingUp => "setting_up",
        Rebooting => "rebooting",
        Ready => "ready",
        Busy => "busy",
        Done => "done",
        Shutdown => "shutdown",
        Halt => "halt",
    }
}

impl NodeState {
    /// States the node processor still has work to do in.
    pub const fn needs_work() -> &'static [NodeState] {
        &[NodeState::Free, NodeState::Done, NodeState::Shutdown, NodeState::Halt]
    }

    /// The node has asked for (or been told) a reset; Halt finalizes it.
    pub fn ready_for_reset(&self) -> bool {
        matches!(self, NodeState::Done | NodeState::Shutdown | NodeState::Halt)
    }

    /// A node may only take on a work-set while Free.
    pub fn can_process_new_work(&self) -> bool {
        matches!(self, NodeState::Free)
    }
}

/// Control-plane record of a single worker VM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub pool_name: PoolName,
    pub machine_id: MachineId,
    pub pool_id: PoolId,
    /// Version of the agent binary running on the VM.
    pub agent_version: String,
    pub os: Os,
    pub state: NodeState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaleset_id: Option<ScalesetId>,
    /// Cloud instance id within the scale-set, resolved lazily.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heartbeat: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initialized_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub managed: bool,
    #[serde(default)]
    pub reimage_requested: bool,
    #[serde(default)]
    pub delete_requested: bool,
    /// Pinned by a task debug flag; skips release of its task rows.
    #[serde(default)]
    pub debug_keep_node: bool,
    /// Storage-owned version stamp.
    #[serde(default)]
    pub version: u64,
}

impl Node {
    /// A reset (reimage or delete) has been requested on this node.
    pub fn reset_requested(&self) -> bool {
        self.reimage_requested || self.delete_requested
    }
}

/// One task as the agent references it. Task lookups are keyed, so
/// the wire form always carries the job id alongside the task id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRef {
    pub job_id: JobId,
    pub task_id: TaskId,
}

/// Agent-reported node state transition, with per-state payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum StateUpdateEvent {
    Init,
    Free,
    SettingUp {
        #[serde(default)]
        tasks: Vec<TaskRef>,
    },
    Rebooting,
    Ready,
    Busy,
    Done {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        script_output: Option<String>,
    },
}

impl StateUpdateEvent {
    /// The node state this update reports.
    pub fn state(&self) -> NodeState {
        match self {
            StateUpdateEvent::Init => NodeState::Init,
            StateUpdateEvent::Free => NodeState::Free,
            StateUpdateEvent::SettingUp { .. } => NodeState::SettingUp,
            StateUpdateEvent::Rebooting => NodeState::Rebooting,
            StateUpdateEvent::Ready => NodeState::Ready,
            StateUpdateEvent::Busy => NodeState::Busy,
            StateUpdateEvent::Done { .. } => NodeState::Done,
        }
    }

    /// Fault recorded when a Done update carries an error.
    pub fn fault(&self) -> Option<Fault> {
        match self {
            StateUpdateEvent::Done { error: Some(message), .. } => {
                Some(Fault::task_failed(message.clone()))
            }
            _ => None,
        }
    }
}

crate::builder! {
    pub struct NodeBuilder => Node {
        into {
            pool_name: PoolName = "default-pool",
            agent_version: String = "1.0.0",
        }
        set {
            machine_id: MachineId = MachineId::nil(),
            pool_id: PoolId = PoolId::nil(),
            os: Os = Os::Linux,
            state: NodeState = NodeState::Free,
            managed: bool = true,
            reimage_requested: bool = false,
            delete_requested: bool = false,
            debug_keep_node: bool = false,
            version: u64 = 0,
        }
        option {
            scaleset_id: ScalesetId = None,
            instance_id: String = None,
            heartbeat: DateTime<Utc> = None,
            initialized_at: DateTime<Utc> = None,
        }
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
