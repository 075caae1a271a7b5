// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task entity, configuration, and state machine.

use crate::error::Fault;
use crate::id::{JobId, TaskId};
use crate::pool::{Os, PoolName};
use crate::secrets::SecretAddress;
use crate::user_info::UserInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Init,
    Waiting,
    Scheduled,
    SettingUp,
    Running,
    Stopping,
    Stopped,
    WaitJob,
}

crate::simple_display! {
    TaskState {
        Init => "init",
        Waiting => "waiting",
        Scheduled => "scheduled",
        SettingUp => "setting_up",
        Running => "running",
        Stopping => "stopping",
        Stopped => "stopped",
        WaitJob => "wait_job",
    }
}

impl TaskState {
    /// States the task processor still has work to do in.
    pub const fn needs_work() -> &'static [TaskState] {
        &[TaskState::Init, TaskState::Stopping]
    }

    /// The shutdown subset. Entry into Stopping is one-way.
    pub fn shutting_down(&self) -> bool {
        matches!(self, TaskState::Stopping | TaskState::Stopped)
    }

    /// True once agents have begun executing the task.
    pub fn has_started(&self) -> bool {
        matches!(self, TaskState::Running | TaskState::Stopping | TaskState::Stopped)
    }
}

/// Fuzzing workload kinds an agent knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    LibfuzzerFuzz,
    LibfuzzerCrashReport,
    LibfuzzerMerge,
    LibfuzzerRegression,
    Coverage,
    GenericAnalysis,
    GenericSupervisor,
    GenericMerge,
    GenericGenerator,
    GenericCrashReport,
    GenericRegression,
}

/// Role a container reference plays for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    Setup,
    Inputs,
    Crashes,
    Reports,
    UniqueReports,
    NoRepro,
    Coverage,
    ReadonlyInputs,
    Tools,
    Logs,
}

/// A named blob container bound to a task role. The core stores only
/// the reference; blob contents never pass through the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskContainer {
    #[serde(rename = "type")]
    pub kind: ContainerKind,
    pub name: String,
}

/// Pool selector: which pool runs the task and on how many VMs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPool {
    pub pool_name: PoolName,
    pub count: u64,
}

/// Debug affordances a user may request on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskDebugFlag {
    KeepNodeOnFailure,
    KeepNodeOnCompletion,
}

/// User-supplied task definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    pub kind: TaskKind,
    pub pool: TaskPool,
    pub containers: Vec<TaskContainer>,
    /// Tasks in the same job that must be Running (or stopped without
    /// error) before this one may schedule.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prereq_tasks: Vec<TaskId>,
    /// Wall-clock lifetime; expiry forces the task to Stopping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_hours: Option<u64>,
    /// Pack this task with job siblings into a shared work-set.
    #[serde(default)]
    pub colocate: bool,
    #[serde(default)]
    pub reboot_after_setup: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub debug: Vec<TaskDebugFlag>,
}

impl TaskConfig {
    pub fn keep_node_on_failure(&self) -> bool {
        self.debug.contains(&TaskDebugFlag::KeepNodeOnFailure)
    }

    pub fn keep_node_on_completion(&self) -> bool {
        self.debug.contains(&TaskDebugFlag::KeepNodeOnCompletion)
    }
}

/// A single fuzzing workload scheduled onto nodes of a pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub job_id: JobId,
    pub task_id: TaskId,
    pub state: TaskState,
    pub os: Os,
    pub config: TaskConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Fault>,
    /// Opaque reference to the agent auth secret; never the secret itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<SecretAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heartbeat: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,
    pub created: DateTime<Utc>,
    /// Storage-owned version stamp.
    #[serde(default)]
    pub version: u64,
}

impl Task {
    pub fn new(job_id: JobId, task_id: TaskId, os: Os, config: TaskConfig, now: DateTime<Utc>) -> Self {
        let end_time =
            config.duration_hours.map(|hours| now + chrono::Duration::hours(hours as i64));
        Self {
            job_id,
            task_id,
            state: TaskState::Init,
            os,
            config,
            error: None,
            auth: None,
            heartbeat: None,
            end_time,
            user_info: None,
            created: now,
            version: 0,
        }
    }

    /// Name of the task's private queue.
    pub fn queue_name(&self) -> String {
        self.task_id.to_string()
    }

    pub fn expired(&self, now: DateTime<Utc>) -> bool {
        self.end_time.is_some_and(|end| now >= end)
    }

    /// Heartbeat is stale when none was ever recorded after start, or the
    /// last one is older than the timeout.
    pub fn heartbeat_stale(&self, now: DateTime<Utc>, timeout: chrono::Duration) -> bool {
        match self.heartbeat {
            Some(at) => now - at > timeout,
            None => now - self.created > timeout,
        }
    }
}

/// Bytes of stdout/stderr retained on task failure records.
pub const STREAM_TAIL_BYTES: usize = 4096;

/// Keep only the final [`STREAM_TAIL_BYTES`] bytes of an output stream,
/// respecting UTF-8 boundaries.
pub fn trim_stream(stream: &str) -> String {
    if stream.len() <= STREAM_TAIL_BYTES {
        return stream.to_string();
    }
    let mut start = stream.len() - STREAM_TAIL_BYTES;
    while !stream.is_char_boundary(start) {
        start += 1;
    }
    stream[start..].to_string()
}

crate::builder! {
    pub struct TaskBuilder => Task {
        set {
            job_id: JobId = JobId::nil(),
            task_id: TaskId = TaskId::nil(),
            state: TaskState = TaskState::Waiting,
            os: Os = Os::Linux,
            config: TaskConfig = TaskConfig {
                kind: TaskKind::LibfuzzerFuzz,
                pool: TaskPool { pool_name: PoolName::new("default-pool"), count: 1 },
                containers: Vec::new(),
                prereq_tasks: Vec::new(),
                duration_hours: Some(24),
                colocate: false,
                reboot_after_setup: false,
                debug: Vec::new(),
            },
            version: u64 = 0,
        }
        option {
            error: Fault = None,
            auth: SecretAddress = None,
            heartbeat: DateTime<Utc> = None,
            end_time: DateTime<Utc> = None,
            user_info: UserInfo = None,
        }
        computed {
            created: DateTime<Utc> = Utc::now(),
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
