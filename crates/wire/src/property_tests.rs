// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Property tests: every event envelope form survives a round trip,
//! whichever of the three wire shapes produced it.

use crate::{NodeEventBody, NodeEventEnvelope, NodeStateEnvelope};
use fg_core::{
    ExitStatus, JobId, MachineId, StateUpdateEvent, TaskId, TaskRef, WorkerDoneEvent, WorkerEvent,
    WorkerRunningEvent,
};
use proptest::prelude::*;

fn arb_state_update() -> impl Strategy<Value = StateUpdateEvent> {
    prop_oneof![
        Just(StateUpdateEvent::Init),
        Just(StateUpdateEvent::Free),
        Just(StateUpdateEvent::Rebooting),
        Just(StateUpdateEvent::Ready),
        Just(StateUpdateEvent::Busy),
        proptest::collection::vec(any::<[u8; 16]>(), 0..3).prop_map(|seeds| {
            StateUpdateEvent::SettingUp {
                tasks: seeds
                    .into_iter()
                    .map(|seed| TaskRef {
                        job_id: JobId::from(uuid::Uuid::from_bytes(seed)),
                        task_id: TaskId::from(uuid::Uuid::from_bytes(seed)),
                    })
                    .collect(),
            }
        }),
        proptest::option::of(".{0,32}").prop_map(|error| StateUpdateEvent::Done {
            error,
            script_output: None,
        }),
    ]
}

fn arb_worker_event() -> impl Strategy<Value = WorkerEvent> {
    let ids = any::<[u8; 16]>();
    prop_oneof![
        ids.prop_map(|seed| {
            WorkerEvent::Running(WorkerRunningEvent {
                task_id: TaskId::from(uuid::Uuid::from_bytes(seed)),
                job_id: JobId::from(uuid::Uuid::from_bytes(seed)),
            })
        }),
        (ids, any::<bool>(), ".{0,64}").prop_map(|(seed, success, stdout)| {
            WorkerEvent::Done(WorkerDoneEvent {
                task_id: TaskId::from(uuid::Uuid::from_bytes(seed)),
                job_id: JobId::from(uuid::Uuid::from_bytes(seed)),
                exit_status: ExitStatus { code: Some(1), signal: None, success },
                stdout,
                stderr: String::new(),
            })
        }),
    ]
}

fn arb_envelope() -> impl Strategy<Value = NodeEventEnvelope> {
    prop_oneof![
        arb_state_update().prop_map(NodeEventEnvelope::StateUpdate),
        arb_worker_event().prop_map(NodeEventEnvelope::WorkerEvent),
        (proptest::option::of(arb_state_update()), proptest::option::of(arb_worker_event()))
            .prop_map(|(state_update, worker_event)| {
                NodeEventEnvelope::Event(NodeEventBody { state_update, worker_event })
            }),
    ]
}

proptest! {
    #[test]
    fn envelope_round_trips(event in arb_envelope()) {
        let envelope = NodeStateEnvelope { machine_id: MachineId::nil(), event };
        let json = serde_json::to_value(&envelope).unwrap();
        let parsed: NodeStateEnvelope = serde_json::from_value(json).unwrap();

        // The parsed form need not be the same variant (a bare update
        // can come back as a combined body), but its content must be.
        prop_assert_eq!(
            parsed.event.into_parts(),
            envelope.event.into_parts()
        );
    }
}
