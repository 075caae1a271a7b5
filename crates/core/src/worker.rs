// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker events reported by agents while executing tasks.

use crate::id::{JobId, MachineId, TaskId};
use crate::task::trim_stream;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Exit status of a task process on one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<i32>,
    pub success: bool,
}

/// Agent report that a task process started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRunningEvent {
    pub task_id: TaskId,
    pub job_id: JobId,
}

/// Agent report that a task process exited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerDoneEvent {
    pub task_id: TaskId,
    pub job_id: JobId,
    pub exit_status: ExitStatus,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
}

impl WorkerDoneEvent {
    /// Trim both output streams to their retained tails in place.
    pub fn trim_streams(&mut self) {
        self.stdout = trim_stream(&self.stdout);
        self.stderr = trim_stream(&self.stderr);
    }
}

/// A worker event: task started or task exited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerEvent {
    Running(WorkerRunningEvent),
    Done(WorkerDoneEvent),
}

impl WorkerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerEvent::Running(_) => "running",
            WorkerEvent::Done(_) => "done",
        }
    }

    pub fn task_id(&self) -> TaskId {
        match self {
            WorkerEvent::Running(event) => event.task_id,
            WorkerEvent::Done(event) => event.task_id,
        }
    }

    pub fn job_id(&self) -> JobId {
        match self {
            WorkerEvent::Running(event) => event.job_id,
            WorkerEvent::Done(event) => event.job_id,
        }
    }
}

/// Audit row recorded for every worker event a task receives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEvent {
    pub task_id: TaskId,
    pub machine_id: MachineId,
    pub event_data: WorkerEvent,
    pub recorded_at: DateTime<Utc>,
    /// Storage-owned version stamp.
    #[serde(default)]
    pub version: u64,
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
