// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Heartbeat ingestion from the internal queues.
//!
//! Agents push heartbeats onto `node-heartbeat` and `task-heartbeat`;
//! draining them stamps the entity and emits telemetry. Staleness is
//! judged by the processors, never here.

use crate::context::Collaborators;
use crate::error::EngineError;
use fg_core::{EventMessage, JobId, MachineId, TaskId};
use fg_storage::{QueueClient, QueueError, NODE_HEARTBEAT_QUEUE, TASK_HEARTBEAT_QUEUE};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeHeartbeatEntry {
    pub machine_id: MachineId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskHeartbeatEntry {
    pub job_id: JobId,
    pub task_id: TaskId,
    pub machine_id: MachineId,
}

/// Drain pending node heartbeats. Returns how many were applied.
pub async fn drain_node_heartbeats(ctx: &Collaborators) -> Result<usize, EngineError> {
    let mut applied = 0;
    loop {
        let message = match ctx.queues.pop(NODE_HEARTBEAT_QUEUE).await {
            Ok(Some(message)) => message,
            Ok(None) => break,
            Err(QueueError::NotFound(_)) => break,
            Err(err) => return Err(err.into()),
        };

        match message.decode::<NodeHeartbeatEntry>() {
            Ok(entry) => {
                if let Some(mut node) = ctx.nodes().get_by_machine_id(entry.machine_id).await? {
                    node.heartbeat = Some(ctx.now());
                    match ctx.nodes().save(&mut node).await {
                        Ok(()) => {
                            ctx.emit(EventMessage::NodeHeartbeat { machine_id: node.machine_id });
                            applied += 1;
                        }
                        Err(err) if err.is_conflict() => {}
                        Err(err) => return Err(err),
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "discarding malformed node heartbeat");
            }
        }
        ctx.queues.delete_message(NODE_HEARTBEAT_QUEUE, message.message_id).await?;
    }
    Ok(applied)
}

/// Drain pending task heartbeats. Returns how many were applied.
pub async fn drain_task_heartbeats(ctx: &Collaborators) -> Result<usize, EngineError> {
    let mut applied = 0;
    loop {
        let message = match ctx.queues.pop(TASK_HEARTBEAT_QUEUE).await {
            Ok(Some(message)) => message,
            Ok(None) => break,
            Err(QueueError::NotFound(_)) => break,
            Err(err) => return Err(err.into()),
        };

        match message.decode::<TaskHeartbeatEntry>() {
            Ok(entry) => {
                if let Some(mut task) = ctx.tasks().get(entry.job_id, entry.task_id).await? {
                    task.heartbeat = Some(ctx.now());
                    match ctx.tasks().save(&mut task).await {
                        Ok(()) => {
                            ctx.emit(EventMessage::TaskHeartbeat {
                                job_id: task.job_id,
                                task_id: task.task_id,
                            });
                            applied += 1;
                        }
                        Err(err) if err.is_conflict() => {}
                        Err(err) => return Err(err),
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "discarding malformed task heartbeat");
            }
        }
        ctx.queues.delete_message(TASK_HEARTBEAT_QUEUE, message.message_id).await?;
    }
    Ok(applied)
}

#[cfg(test)]
#[path = "heartbeats_tests.rs"]
mod tests;
