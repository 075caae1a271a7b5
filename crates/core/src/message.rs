// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command envelopes addressed to a single node.
//!
//! Messages are delivered by get/delete polling: the agent fetches the
//! oldest pending message, acts on it, then deletes it by id. A message
//! stays pending until explicitly deleted.

use crate::id::{MachineId, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Commands the control plane sends to an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeCommand {
    /// Stop all work and shut the agent down.
    Stop {},
    /// Stop one task, leaving the rest of the work-set running.
    StopTask(StopTaskCommand),
    /// Stop work so the VM can be reimaged.
    StopIfFree {},
    /// Install an SSH public key for a debug session.
    AddSshKey(SshKeyInfo),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopTaskCommand {
    pub task_id: TaskId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshKeyInfo {
    pub public_key: String,
}

/// A pending command for one machine.
///
/// The message id sorts by creation time so "oldest pending" is a
/// plain ordered scan within the machine's partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeMessage {
    pub machine_id: MachineId,
    pub message_id: String,
    pub message: NodeCommand,
    /// Storage-owned version stamp.
    #[serde(default)]
    pub version: u64,
}

impl NodeMessage {
    pub fn new(machine_id: MachineId, message: NodeCommand, now: DateTime<Utc>) -> Self {
        Self { machine_id, message_id: sortable_message_id(now), message, version: 0 }
    }
}

/// Millisecond timestamp zero-padded so lexicographic order equals
/// creation order, suffixed for uniqueness within one millisecond.
fn sortable_message_id(now: DateTime<Utc>) -> String {
    format!("{:020}-{}", now.timestamp_millis().max(0), &uuid::Uuid::new_v4().simple().to_string()[..8])
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
