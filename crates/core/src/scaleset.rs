// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scaleset entity and state machine.

use crate::error::Fault;
use crate::id::ScalesetId;
use crate::pool::PoolName;
use crate::secrets::SecretAddress;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scaleset lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalesetState {
    Init,
    Setup,
    Resize,
    Running,
    Shutdown,
    Halt,
    CreationFailed,
}

crate::simple_display! {
    ScalesetState {
        Init => "init",
        Setup => "setup",
        Resize => "resize",
        Running => "running",
        Shutdown => "shutdown",
        Halt => "halt",
        CreationFailed => "creation_failed",
    }
}

impl ScalesetState {
    /// States the scaleset processor still has work to do in.
    /// Running is included: it re-enters itself for node cleanup and
    /// size synchronization every tick.
    pub const fn needs_work() -> &'static [ScalesetState] {
        &[
            ScalesetState::Init,
            ScalesetState::Setup,
            ScalesetState::Resize,
            ScalesetState::Running,
            ScalesetState::Shutdown,
            ScalesetState::Halt,
        ]
    }

    pub fn shutting_down(&self) -> bool {
        matches!(self, ScalesetState::Shutdown | ScalesetState::Halt)
    }

    /// True when new nodes may be brought up for this scaleset.
    pub fn can_resize(&self) -> bool {
        matches!(self, ScalesetState::Resize | ScalesetState::Running)
    }
}

/// A cloud-provider scale-set backing a pool in one region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaleset {
    pub scaleset_id: ScalesetId,
    pub pool_name: PoolName,
    pub state: ScalesetState,
    pub region: String,
    pub vm_sku: String,
    pub image: String,
    /// Requested size. The cloud-reported size converges toward this.
    pub size: u64,
    #[serde(default)]
    pub spot_instances: bool,
    #[serde(default)]
    pub ephemeral_os_disks: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<SecretAddress>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    /// Hash of the owning pool's config at provision time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_hash: Option<String>,
    /// Set when the pool config hash no longer matches; nodes drain
    /// and reimage to pick up the new config.
    #[serde(default)]
    pub needs_config_update: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Fault>,
    /// Storage-owned version stamp.
    #[serde(default)]
    pub version: u64,
}

crate::builder! {
    pub struct ScalesetBuilder => Scaleset {
        into {
            pool_name: PoolName = "default-pool",
            region: String = "eastus",
            vm_sku: String = "Standard_D2s_v3",
            image: String = "Canonical:UbuntuServer:22_04-lts:latest",
        }
        set {
            scaleset_id: ScalesetId = ScalesetId::nil(),
            state: ScalesetState = ScalesetState::Running,
            size: u64 = 1,
            spot_instances: bool = false,
            ephemeral_os_disks: bool = false,
            tags: BTreeMap<String, String> = BTreeMap::new(),
            needs_config_update: bool = false,
            version: u64 = 0,
        }
        option {
            auth: SecretAddress = None,
            config_hash: String = None,
            error: Fault = None,
        }
    }
}

#[cfg(test)]
#[path = "scaleset_tests.rs"]
mod tests;
