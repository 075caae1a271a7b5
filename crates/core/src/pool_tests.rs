// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn queue_name_is_keyed_by_pool_id() {
    let id = PoolId::new();
    let pool = Pool::builder().pool_id(id).build();
    assert_eq!(pool.queue_name(), format!("pool-{}", id));
}

#[test]
fn pool_name_display_and_serde() {
    let name = PoolName::new("linux-pool");
    assert_eq!(name.to_string(), "linux-pool");
    assert_eq!(serde_json::to_string(&name).unwrap(), "\"linux-pool\"");
}

#[test]
fn needs_work_excludes_running() {
    assert!(!PoolState::needs_work().contains(&PoolState::Running));
    assert!(PoolState::needs_work().contains(&PoolState::Halt));
}

#[test]
fn shutting_down() {
    assert!(PoolState::Shutdown.shutting_down());
    assert!(PoolState::Halt.shutting_down());
    assert!(!PoolState::Init.shutting_down());
}

#[test]
fn os_wire_form() {
    assert_eq!(serde_json::to_string(&Os::Windows).unwrap(), "\"windows\"");
    let parsed: Os = serde_json::from_str("\"linux\"").unwrap();
    assert_eq!(parsed, Os::Linux);
}
