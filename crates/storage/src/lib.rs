// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fg-storage: record store and queue abstractions.
//!
//! The control plane keeps all durable state behind two seams: a typed
//! table service with optimistic concurrency ([`TableStore`]) and named
//! FIFO queues with at-least-once delivery ([`QueueClient`]). In-memory
//! backends implement both for single-process deployments and tests;
//! production backends live behind the same traits.

pub mod entries;
pub mod memory;
pub mod memory_queue;
pub mod queue;
pub mod secrets;
pub mod table;

pub use memory::MemoryStore;
pub use memory_queue::MemoryQueues;
pub use queue::{
    backoff_delay, poison_queue_name, pool_queue_name, QueueClient, QueueError, QueueHandle,
    QueueMessage, QueuePermission, CUSTOM_METRICS_QUEUE, DEFAULT_VISIBILITY_TIMEOUT_SECS,
    FILE_CHANGES_QUEUE, MAX_DEQUEUE_COUNT, NODE_HEARTBEAT_QUEUE, PROXY_QUEUE,
    SIGNALR_EVENTS_QUEUE, TASK_HEARTBEAT_QUEUE, WEBHOOKS_QUEUE,
};
pub use secrets::{MemorySecrets, SecretError, SecretStore};
pub use table::{QueryFilter, RawRow, StorageError, TableEntry, TableStore, TableStoreExt};
