// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine tuning knobs. Every timeout has a default matching the
//! operational expectations baked into the processors.

use chrono::Duration;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL agents use to reach this instance.
    pub base_url: String,
    /// Max total vm_count packed into one colocated work-set.
    pub max_workset_vm_count: u64,
    /// A Running task missing heartbeats this long is failed.
    pub task_heartbeat_timeout: Duration,
    /// A node missing heartbeats this long is reimaged.
    pub node_heartbeat_timeout: Duration,
    /// A Busy node holding no task rows this long is forced Done.
    pub busy_node_timeout: Duration,
    /// An Init job with no tasks this long is forced to Stopping.
    pub never_started_job_timeout: Duration,
    /// Age past which user identity stamps are scrubbed.
    pub pii_retention: Duration,
    /// Lifetime of the pool-queue credential handed out at registration.
    pub queue_credential: Duration,
    /// Agents reporting a different version are flagged for reimage.
    pub latest_agent_version: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            max_workset_vm_count: 10,
            task_heartbeat_timeout: Duration::minutes(30),
            node_heartbeat_timeout: Duration::minutes(15),
            busy_node_timeout: Duration::minutes(30),
            never_started_job_timeout: Duration::minutes(30),
            pii_retention: Duration::days(18 * 30),
            queue_credential: Duration::hours(24),
            latest_agent_version: None,
        }
    }
}
