// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::{Clock, FakeClock};
use yare::parameterized;

fn config() -> JobConfig {
    JobConfig {
        project: "proj".to_string(),
        name: "fuzz-target".to_string(),
        build: "20260101.1".to_string(),
        duration_hours: 24,
        logs: None,
    }
}

#[test]
fn new_job_starts_in_init_with_end_time() {
    let clock = FakeClock::new();
    let job = Job::new(JobId::new(), config(), clock.now());

    assert_eq!(job.state, JobState::Init);
    assert_eq!(job.end_time, Some(clock.now() + chrono::Duration::hours(24)));
    assert_eq!(job.version, 0);
}

#[test]
fn job_expires_at_end_time() {
    let clock = FakeClock::new();
    let job = Job::new(JobId::new(), config(), clock.now());

    assert!(!job.expired(clock.now()));
    clock.advance(chrono::Duration::hours(24));
    assert!(job.expired(clock.now()));
}

#[parameterized(
    init = { JobState::Init, true },
    enabled = { JobState::Enabled, true },
    stopping = { JobState::Stopping, false },
    stopped = { JobState::Stopped, false },
)]
fn available_accepts_new_tasks(state: JobState, expected: bool) {
    assert_eq!(state.available(), expected);
}

#[test]
fn needs_work_excludes_stopped() {
    assert!(!JobState::needs_work().contains(&JobState::Stopped));
    assert!(JobState::needs_work().contains(&JobState::Stopping));
}

#[test]
fn state_serializes_snake_case() {
    assert_eq!(serde_json::to_string(&JobState::Stopping).unwrap(), "\"stopping\"");
}

#[test]
fn builder_defaults_are_enabled() {
    let job = Job::builder().build();
    assert_eq!(job.state, JobState::Enabled);
    assert_eq!(job.config.duration_hours, 24);
}
