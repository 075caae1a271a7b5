// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn auth(scope: Scope) -> Authenticated {
    Authenticated { scope, principal: "tester".to_string() }
}

#[test]
fn agent_endpoints_take_agent_scope_only() {
    assert!(auth(Scope::Agent).require_agent().is_ok());
    assert!(auth(Scope::User).require_agent().is_err());
    assert!(auth(Scope::Admin).require_agent().is_err());
}

#[test]
fn user_endpoints_take_user_or_admin() {
    assert!(auth(Scope::User).require_user().is_ok());
    assert!(auth(Scope::Admin).require_user().is_ok());
    assert!(auth(Scope::Agent).require_user().is_err());
}

#[test]
fn admin_endpoints_take_admin_only() {
    assert!(auth(Scope::Admin).require_admin().is_ok());
    assert!(auth(Scope::User).require_admin().is_err());
}

#[test]
fn user_info_stamp_carries_the_principal() {
    let info = auth(Scope::User).user_info();
    assert_eq!(info.upn.as_deref(), Some("tester"));
    assert!(info.object_id.is_none());
}
