// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-surface request and response DTOs.
//!
//! Search requests leave every field optional; empty filters mean
//! "everything visible to the caller". Mutation responses are either
//! the updated resource or a [`BoolResult`].

use fg_core::{
    Architecture, JobId, JobState, MachineId, NodeState, Os, PoolId, PoolName, PoolState,
    ScalesetId, ScalesetState, TaskConfig, TaskId, TaskState,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoolResult {
    pub result: bool,
}

impl BoolResult {
    pub fn ok() -> Self {
        Self { result: true }
    }
}

/// `GET /jobs` filter. Flat and single-valued so it rides the query
/// string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobSearchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<JobState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobGetRequest {
    pub job_id: JobId,
}

/// `POST /tasks` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCreateRequest {
    pub job_id: JobId,
    #[serde(flatten)]
    pub config: TaskConfig,
}

/// `GET /tasks` filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskSearchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<TaskState>,
}

/// `DELETE /tasks` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStopRequest {
    pub job_id: JobId,
    pub task_id: TaskId,
}

/// `POST /pool` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolCreateRequest {
    pub name: PoolName,
    pub os: Os,
    pub arch: Architecture,
    pub managed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Uuid>,
}

/// `PATCH /pool` body: replace the pool's agent configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolUpdateRequest {
    pub name: PoolName,
    pub config: serde_json::Value,
}

/// `GET /pool` filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoolSearchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_id: Option<PoolId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<PoolName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<PoolState>,
}

/// `DELETE /pool` body. `now` skips the drain and goes straight to Halt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolStopRequest {
    pub name: PoolName,
    #[serde(default)]
    pub now: bool,
}

/// `POST /scaleset` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalesetCreateRequest {
    pub pool_name: PoolName,
    pub region: String,
    pub vm_sku: String,
    pub image: String,
    pub size: u64,
    #[serde(default)]
    pub spot_instances: bool,
    #[serde(default)]
    pub ephemeral_os_disks: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

/// `PATCH /scaleset` body: resize to a new target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalesetUpdateRequest {
    pub scaleset_id: ScalesetId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// `GET /scaleset` filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScalesetSearchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaleset_id: Option<ScalesetId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ScalesetState>,
}

/// `DELETE /scaleset` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalesetStopRequest {
    pub scaleset_id: ScalesetId,
    #[serde(default)]
    pub now: bool,
}

/// `GET /node` filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeSearchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_id: Option<MachineId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_name: Option<PoolName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaleset_id: Option<ScalesetId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<NodeState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeGetRequest {
    pub machine_id: MachineId,
}

/// `PATCH /node` body: pin or unpin a node for debugging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeUpdateRequest {
    pub machine_id: MachineId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_keep_node: Option<bool>,
}

/// `DELETE /node` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeStopRequest {
    pub machine_id: MachineId,
}

/// `POST /node` body: request a reimage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeReimageRequest {
    pub machine_id: MachineId,
}

/// `POST /node/add_ssh_key` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeAddSshKeyRequest {
    pub machine_id: MachineId,
    pub public_key: String,
}

/// `GET /info` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResponse {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

#[cfg(test)]
#[path = "requests_tests.rs"]
mod tests;
