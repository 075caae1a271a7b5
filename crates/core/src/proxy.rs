// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Forwarding rules that let a user tunnel into a scaleset node.

use crate::id::{MachineId, ProxyId, ScalesetId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A port forward from a regional proxy VM to one scaleset node,
/// alive until its expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyForward {
    pub region: String,
    /// Listening port on the proxy; the row key within the region.
    pub port: u16,
    pub scaleset_id: ScalesetId,
    pub machine_id: MachineId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_id: Option<ProxyId>,
    pub dst_port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_ip: Option<String>,
    pub end_time: DateTime<Utc>,
    /// Storage-owned version stamp.
    #[serde(default)]
    pub version: u64,
}

impl ProxyForward {
    pub fn expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.end_time
    }
}
