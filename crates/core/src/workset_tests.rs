// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn unit() -> WorkUnit {
    WorkUnit { job_id: JobId::new(), task_id: TaskId::new(), config: serde_json::json!({}) }
}

#[test]
fn task_ids_follow_unit_order() {
    let units = vec![unit(), unit(), unit()];
    let expected: Vec<TaskId> = units.iter().map(|u| u.task_id).collect();
    let workset = WorkSet {
        workset_id: WorkSetId::new(),
        work_units: units,
        setup_container: "setup".to_string(),
        script: false,
        reboot: false,
        version: 0,
    };
    assert_eq!(workset.task_ids().collect::<Vec<_>>(), expected);
    assert_eq!(workset.len(), 3);
}

#[test]
fn envelope_round_trips() {
    let envelope = WorkSetEnvelope { workset_id: WorkSetId::new() };
    let bytes = serde_json::to_vec(&envelope).unwrap();
    let parsed: WorkSetEnvelope = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed, envelope);
}
