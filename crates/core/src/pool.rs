// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pool entity and state machine.

use crate::id::PoolId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Operating system of a pool's worker VMs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Os {
    Linux,
    Windows,
}

crate::simple_display! {
    Os {
        Linux => "linux",
        Windows => "windows",
    }
}

/// CPU architecture of a pool's worker VMs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Architecture {
    X86_64,
    Aarch64,
}

crate::simple_display! {
    Architecture {
        X86_64 => "x86_64",
        Aarch64 => "aarch64",
    }
}

/// Human-readable pool name. Unique across the instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolName(String);

impl PoolName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PoolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PoolName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PoolName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for PoolName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Pool lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolState {
    Init,
    Running,
    Shutdown,
    Halt,
}

crate::simple_display! {
    PoolState {
        Init => "init",
        Running => "running",
        Shutdown => "shutdown",
        Halt => "halt",
    }
}

impl PoolState {
    /// States the pool processor still has work to do in.
    pub const fn needs_work() -> &'static [PoolState] {
        &[PoolState::Init, PoolState::Shutdown, PoolState::Halt]
    }

    /// States in which the pool is draining or tearing down.
    pub fn shutting_down(&self) -> bool {
        matches!(self, PoolState::Shutdown | PoolState::Halt)
    }
}

/// A logical set of interchangeable worker VMs sharing a queue and OS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    pub pool_id: PoolId,
    pub name: PoolName,
    pub os: Os,
    pub arch: Architecture,
    /// Managed pools own scalesets; unmanaged pools hold user-supplied nodes.
    pub managed: bool,
    pub state: PoolState,
    /// Object id of the principal agents authenticate as.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Uuid>,
    /// Agent configuration handed to nodes; hashed for outdated detection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
    /// Storage-owned version stamp.
    #[serde(default)]
    pub version: u64,
}

impl Pool {
    /// Name of the pool's work queue.
    pub fn queue_name(&self) -> String {
        format!("pool-{}", self.pool_id)
    }
}

crate::builder! {
    pub struct PoolBuilder => Pool {
        into {
            name: PoolName = "default-pool",
        }
        set {
            pool_id: PoolId = PoolId::nil(),
            os: Os = Os::Linux,
            arch: Architecture = Architecture::X86_64,
            managed: bool = true,
            state: PoolState = PoolState::Running,
            version: u64 = 0,
        }
        option {
            object_id: Uuid = None,
            client_id: Uuid = None,
            config: serde_json::Value = None,
        }
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
