// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::str::FromStr;

#[test]
fn ids_are_unique() {
    let a = JobId::new();
    let b = JobId::new();
    assert_ne!(a, b);
}

#[test]
fn nil_is_all_zero() {
    assert_eq!(MachineId::nil().to_string(), "00000000-0000-0000-0000-000000000000");
}

#[test]
fn display_round_trips_through_from_str() {
    let id = TaskId::new();
    let parsed = TaskId::from_str(&id.to_string()).unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn serde_is_transparent() {
    let id = PoolId::new();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{}\"", id));

    let parsed: PoolId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn from_str_rejects_garbage() {
    assert!(ScalesetId::from_str("not-a-uuid").is_err());
}
