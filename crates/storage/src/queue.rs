// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named FIFO queues with at-least-once delivery.
//!
//! Popping reserves a message for the visibility timeout; deleting
//! commits consumption. A message popped more than [`MAX_DEQUEUE_COUNT`]
//! times without deletion is moved to the `<queue>-poison` dead-letter
//! queue.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use fg_core::PoolId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Dequeue attempts before a message is considered poison.
pub const MAX_DEQUEUE_COUNT: u32 = 5;

/// Seconds a popped message stays invisible before redelivery.
pub const DEFAULT_VISIBILITY_TIMEOUT_SECS: i64 = 30;

// Reserved queue names. Pool queues are `pool-<id>`; task queues are
// named by the bare task id.
pub const NODE_HEARTBEAT_QUEUE: &str = "node-heartbeat";
pub const TASK_HEARTBEAT_QUEUE: &str = "task-heartbeat";
pub const FILE_CHANGES_QUEUE: &str = "file-changes";
pub const WEBHOOKS_QUEUE: &str = "webhooks";
pub const PROXY_QUEUE: &str = "proxy";
pub const SIGNALR_EVENTS_QUEUE: &str = "signalr-events";
pub const CUSTOM_METRICS_QUEUE: &str = "custom-metrics";

pub fn poison_queue_name(queue: &str) -> String {
    format!("{}-poison", queue)
}

pub fn pool_queue_name(pool_id: PoolId) -> String {
    format!("pool-{}", pool_id)
}

/// One delivered message. `dequeue_count` includes this delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    pub message_id: Uuid,
    pub body: Vec<u8>,
    pub dequeue_count: u32,
}

impl QueueMessage {
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, QueueError> {
        serde_json::from_slice(&self.body).map_err(QueueError::from)
    }
}

/// Rights granted on a credentialed queue handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueuePermission {
    Read,
    Update,
    Process,
}

/// Opaque credentialed handle for handing a queue to an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueHandle {
    pub queue_name: String,
    pub token: String,
    pub expires: DateTime<Utc>,
    pub permissions: Vec<QueuePermission>,
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue '{0}' not found")]
    NotFound(String),

    #[error("serialization failed: {0}")]
    Serde(#[from] serde_json::Error),

    /// Timeouts and throttling. The caller retries on its next tick.
    #[error("transient queue failure: {0}")]
    Transient(String),
}

/// Queue service seam. Backends must deliver at least once and keep
/// FIFO order at enqueue time.
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Create the queue (and its poison twin) if missing. Idempotent.
    async fn create_queue(&self, queue: &str) -> Result<(), QueueError>;

    async fn delete_queue(&self, queue: &str) -> Result<(), QueueError>;

    /// Append a message, optionally invisible for `visibility_delay`.
    async fn enqueue(
        &self,
        queue: &str,
        body: Vec<u8>,
        visibility_delay: Option<Duration>,
    ) -> Result<(), QueueError>;

    /// Reserve the oldest visible message, or None when empty.
    async fn pop(&self, queue: &str) -> Result<Option<QueueMessage>, QueueError>;

    /// Commit consumption of a previously popped message.
    async fn delete_message(&self, queue: &str, message_id: Uuid) -> Result<(), QueueError>;

    /// Issue a consumer credential for handing the queue to an agent.
    async fn grant_consumer(
        &self,
        queue: &str,
        duration: Duration,
    ) -> Result<QueueHandle, QueueError>;
}

/// Visibility delay for manual requeues: `5^attempt` minutes, capped
/// at 48h with up to ±6h of jitter once the cap is reached.
pub fn backoff_delay(attempt: u32) -> Duration {
    backoff_delay_with(attempt, rand::random::<f64>())
}

/// `unit_jitter` in `[0, 1)`; exposed so tests can pin the jitter.
pub fn backoff_delay_with(attempt: u32, unit_jitter: f64) -> Duration {
    const CAP_HOURS: i64 = 48;
    const JITTER_HOURS: i64 = 6;

    let cap = Duration::hours(CAP_HOURS);
    // 5^12 minutes already exceeds the cap by orders of magnitude.
    let minutes = 5u64.pow(attempt.min(12));
    if minutes < (CAP_HOURS * 60) as u64 {
        return Duration::minutes(minutes as i64);
    }

    let jitter_secs =
        ((unit_jitter * 2.0 - 1.0) * (JITTER_HOURS * 3600) as f64).round() as i64;
    (cap + Duration::seconds(jitter_secs)).max(Duration::zero())
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
