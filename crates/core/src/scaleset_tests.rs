// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    init = { ScalesetState::Init, true },
    setup = { ScalesetState::Setup, true },
    resize = { ScalesetState::Resize, true },
    running = { ScalesetState::Running, true },
    shutdown = { ScalesetState::Shutdown, true },
    halt = { ScalesetState::Halt, true },
    creation_failed = { ScalesetState::CreationFailed, false },
)]
fn needs_work_excludes_only_creation_failed(state: ScalesetState, expected: bool) {
    assert_eq!(ScalesetState::needs_work().contains(&state), expected);
}

#[test]
fn can_resize_only_while_live() {
    assert!(ScalesetState::Resize.can_resize());
    assert!(ScalesetState::Running.can_resize());
    assert!(!ScalesetState::Shutdown.can_resize());
    assert!(!ScalesetState::Init.can_resize());
}

#[test]
fn builder_defaults() {
    let scaleset = Scaleset::builder().build();
    assert_eq!(scaleset.state, ScalesetState::Running);
    assert_eq!(scaleset.size, 1);
    assert!(!scaleset.needs_config_update);
}

#[test]
fn serde_omits_empty_optionals() {
    let scaleset = Scaleset::builder().build();
    let json = serde_json::to_value(&scaleset).unwrap();
    assert!(json.get("error").is_none());
    assert!(json.get("tags").is_none());
}
