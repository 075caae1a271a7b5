// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::{Clock, FakeClock};

#[test]
fn message_ids_sort_by_creation_time() {
    let clock = FakeClock::new();
    let machine = MachineId::new();

    let first = NodeMessage::new(machine, NodeCommand::Stop {}, clock.now());
    clock.advance(chrono::Duration::milliseconds(5));
    let second = NodeMessage::new(machine, NodeCommand::Stop {}, clock.now());

    assert!(first.message_id < second.message_id);
}

#[test]
fn stop_task_round_trips() {
    let command = NodeCommand::StopTask(StopTaskCommand { task_id: TaskId::new() });
    let json = serde_json::to_string(&command).unwrap();
    let parsed: NodeCommand = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, command);
}

#[test]
fn ids_are_unique_within_one_instant() {
    let clock = FakeClock::new();
    let machine = MachineId::new();
    let a = NodeMessage::new(machine, NodeCommand::Stop {}, clock.now());
    let b = NodeMessage::new(machine, NodeCommand::Stop {}, clock.now());
    assert_ne!(a.message_id, b.message_id);
}
