// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job entity and state machine.

use crate::id::JobId;
use crate::user_info::UserInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Job lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Init,
    Enabled,
    Stopping,
    Stopped,
}

crate::simple_display! {
    JobState {
        Init => "init",
        Enabled => "enabled",
        Stopping => "stopping",
        Stopped => "stopped",
    }
}

impl JobState {
    /// States the job processor still has work to do in.
    pub const fn needs_work() -> &'static [JobState] {
        &[JobState::Init, JobState::Enabled, JobState::Stopping]
    }

    /// Available = may accept new tasks.
    pub fn available(&self) -> bool {
        matches!(self, JobState::Init | JobState::Enabled)
    }

    pub fn shutting_down(&self) -> bool {
        matches!(self, JobState::Stopping | JobState::Stopped)
    }
}

/// User-supplied job attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    pub project: String,
    pub name: String,
    pub build: String,
    /// Wall-clock lifetime; expiry forces the job to Stopping.
    pub duration_hours: u64,
    /// Container holding job-level logs, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<String>,
}

/// User-defined grouping of tasks with a shared duration and labeling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: JobId,
    pub state: JobState,
    pub config: JobConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the job's duration elapses. Stamped on creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,
    /// When the record was created; drives the never-started rule.
    pub created: DateTime<Utc>,
    /// Storage-owned version stamp.
    #[serde(default)]
    pub version: u64,
}

impl Job {
    /// A new job in Init with its end time stamped from the duration.
    pub fn new(job_id: JobId, config: JobConfig, now: DateTime<Utc>) -> Self {
        let end_time = now + chrono::Duration::hours(config.duration_hours as i64);
        Self {
            job_id,
            state: JobState::Init,
            config,
            error: None,
            end_time: Some(end_time),
            user_info: None,
            created: now,
            version: 0,
        }
    }

    pub fn expired(&self, now: DateTime<Utc>) -> bool {
        self.end_time.is_some_and(|end| now >= end)
    }
}

crate::builder! {
    pub struct JobBuilder => Job {
        set {
            job_id: JobId = JobId::nil(),
            state: JobState = JobState::Enabled,
            config: JobConfig = JobConfig {
                project: "proj".to_string(),
                name: "job".to_string(),
                build: "1".to_string(),
                duration_hours: 24,
                logs: None,
            },
            version: u64 = 0,
        }
        option {
            error: String = None,
            end_time: DateTime<Utc> = None,
            user_info: UserInfo = None,
        }
        computed {
            created: DateTime<Utc> = Utc::now(),
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
