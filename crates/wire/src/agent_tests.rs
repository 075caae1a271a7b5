// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fg_core::{ExitStatus, TaskRef, WorkerDoneEvent, WorkerRunningEvent};
use serde_json::json;

#[test]
fn bare_state_update_parses() {
    let envelope: NodeStateEnvelope = serde_json::from_value(json!({
        "machine_id": "00000000-0000-0000-0000-000000000000",
        "event": { "state": "free" }
    }))
    .unwrap();

    let (update, worker) = envelope.event.into_parts();
    assert_eq!(update, Some(StateUpdateEvent::Free));
    assert!(worker.is_none());
}

#[test]
fn setting_up_update_carries_task_refs() {
    let task = TaskRef { job_id: JobId::new(), task_id: TaskId::new() };
    let envelope: NodeStateEnvelope = serde_json::from_value(json!({
        "machine_id": MachineId::new(),
        "event": { "state": "setting_up", "data": { "tasks": [task] } }
    }))
    .unwrap();

    let (update, _) = envelope.event.into_parts();
    assert_eq!(update, Some(StateUpdateEvent::SettingUp { tasks: vec![task] }));
}

#[test]
fn bare_worker_event_parses() {
    let envelope: NodeStateEnvelope = serde_json::from_value(json!({
        "machine_id": MachineId::new(),
        "event": { "running": { "task_id": TaskId::new(), "job_id": JobId::new() } }
    }))
    .unwrap();

    let (update, worker) = envelope.event.into_parts();
    assert!(update.is_none());
    assert!(matches!(worker, Some(WorkerEvent::Running(_))));
}

#[test]
fn combined_event_parses_both_halves() {
    let envelope: NodeStateEnvelope = serde_json::from_value(json!({
        "machine_id": MachineId::new(),
        "event": {
            "state_update": { "state": "busy" },
            "worker_event": { "running": { "task_id": TaskId::new(), "job_id": JobId::new() } }
        }
    }))
    .unwrap();

    let (update, worker) = envelope.event.into_parts();
    assert_eq!(update, Some(StateUpdateEvent::Busy));
    assert!(worker.is_some());
}

#[test]
fn done_worker_event_round_trips() {
    let original = NodeEventEnvelope::WorkerEvent(WorkerEvent::Done(WorkerDoneEvent {
        task_id: TaskId::new(),
        job_id: JobId::new(),
        exit_status: ExitStatus { code: Some(0), signal: None, success: true },
        stdout: "out".to_string(),
        stderr: String::new(),
    }));

    let json = serde_json::to_value(&original).unwrap();
    let parsed: NodeEventEnvelope = serde_json::from_value(json).unwrap();
    assert_eq!(parsed, original);
}

#[test]
fn running_event_requires_job_id() {
    let result: Result<WorkerRunningEvent, _> = serde_json::from_value(json!({
        "task_id": TaskId::new()
    }));
    assert!(result.is_err());
}

#[test]
fn can_schedule_response_helpers() {
    assert!(CanScheduleResponse::allow().allowed);
    let stopped = CanScheduleResponse::stopped("task is stopping");
    assert!(stopped.work_stopped);
    assert!(!stopped.allowed);
}

#[test]
fn registration_post_defaults_optionals() {
    let request: RegistrationPost = serde_json::from_value(json!({
        "machine_id": MachineId::new(),
        "pool_name": "linux-pool"
    }))
    .unwrap();
    assert!(request.scaleset_id.is_none());
    assert!(request.os.is_none());
}
