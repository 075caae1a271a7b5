// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory queue backend driven by the shared clock.

use crate::queue::{
    poison_queue_name, QueueClient, QueueError, QueueHandle, QueueMessage, QueuePermission,
    DEFAULT_VISIBILITY_TIMEOUT_SECS, MAX_DEQUEUE_COUNT,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use fg_core::Clock;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct StoredMessage {
    message_id: Uuid,
    body: Vec<u8>,
    dequeue_count: u32,
    visible_at: DateTime<Utc>,
}

/// Queue service backed by process memory.
pub struct MemoryQueues {
    clock: Arc<dyn Clock>,
    visibility_timeout: Duration,
    queues: Mutex<HashMap<String, VecDeque<StoredMessage>>>,
}

impl MemoryQueues {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            visibility_timeout: Duration::seconds(DEFAULT_VISIBILITY_TIMEOUT_SECS),
            queues: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_visibility_timeout(mut self, timeout: Duration) -> Self {
        self.visibility_timeout = timeout;
        self
    }

    /// Number of messages currently stored, visible or not.
    pub fn len(&self, queue: &str) -> usize {
        self.queues.lock().get(queue).map(VecDeque::len).unwrap_or(0)
    }

    pub fn is_empty(&self, queue: &str) -> bool {
        self.len(queue) == 0
    }
}

#[async_trait]
impl QueueClient for MemoryQueues {
    async fn create_queue(&self, queue: &str) -> Result<(), QueueError> {
        let mut queues = self.queues.lock();
        queues.entry(queue.to_string()).or_default();
        queues.entry(poison_queue_name(queue)).or_default();
        Ok(())
    }

    async fn delete_queue(&self, queue: &str) -> Result<(), QueueError> {
        let mut queues = self.queues.lock();
        queues.remove(queue);
        queues.remove(&poison_queue_name(queue));
        Ok(())
    }

    async fn enqueue(
        &self,
        queue: &str,
        body: Vec<u8>,
        visibility_delay: Option<Duration>,
    ) -> Result<(), QueueError> {
        let now = self.clock.now();
        let mut queues = self.queues.lock();
        let messages =
            queues.get_mut(queue).ok_or_else(|| QueueError::NotFound(queue.to_string()))?;
        messages.push_back(StoredMessage {
            message_id: Uuid::new_v4(),
            body,
            dequeue_count: 0,
            visible_at: now + visibility_delay.unwrap_or_else(Duration::zero),
        });
        Ok(())
    }

    async fn pop(&self, queue: &str) -> Result<Option<QueueMessage>, QueueError> {
        let now = self.clock.now();
        let mut queues = self.queues.lock();
        let Some(messages) = queues.get_mut(queue) else {
            return Err(QueueError::NotFound(queue.to_string()));
        };

        // Oldest visible message wins; poisoned messages are drained to
        // the dead-letter queue as they surface.
        let mut poisoned = Vec::new();
        let mut delivered = None;
        let mut index = 0;
        while index < messages.len() {
            if messages[index].visible_at > now {
                index += 1;
                continue;
            }
            if messages[index].dequeue_count >= MAX_DEQUEUE_COUNT {
                if let Some(dead) = messages.remove(index) {
                    poisoned.push(dead);
                }
                // Removal shifted the tail into this slot; rescan it.
                continue;
            }
            let message = &mut messages[index];
            message.dequeue_count += 1;
            message.visible_at = now + self.visibility_timeout;
            delivered = Some(QueueMessage {
                message_id: message.message_id,
                body: message.body.clone(),
                dequeue_count: message.dequeue_count,
            });
            break;
        }

        if !poisoned.is_empty() {
            let dead_letter = queues.entry(poison_queue_name(queue)).or_default();
            for mut message in poisoned {
                tracing::warn!(
                    queue,
                    message_id = %message.message_id,
                    dequeue_count = message.dequeue_count,
                    "message exceeded max dequeue count, moving to poison queue"
                );
                message.dequeue_count = 0;
                message.visible_at = now;
                dead_letter.push_back(message);
            }
        }
        Ok(delivered)
    }

    async fn delete_message(&self, queue: &str, message_id: Uuid) -> Result<(), QueueError> {
        let mut queues = self.queues.lock();
        let messages =
            queues.get_mut(queue).ok_or_else(|| QueueError::NotFound(queue.to_string()))?;
        messages.retain(|message| message.message_id != message_id);
        Ok(())
    }

    async fn grant_consumer(
        &self,
        queue: &str,
        duration: Duration,
    ) -> Result<QueueHandle, QueueError> {
        if !self.queues.lock().contains_key(queue) {
            return Err(QueueError::NotFound(queue.to_string()));
        }
        Ok(QueueHandle {
            queue_name: queue.to_string(),
            token: Uuid::new_v4().simple().to_string(),
            expires: self.clock.now() + duration,
            permissions: vec![
                QueuePermission::Read,
                QueuePermission::Update,
                QueuePermission::Process,
            ],
        })
    }
}

#[cfg(test)]
#[path = "memory_queue_tests.rs"]
mod tests;
