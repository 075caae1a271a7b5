// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! NodeMessage repository: command delivery by get/delete polling.

use crate::context::Collaborators;
use crate::error::EngineError;
use fg_core::{MachineId, NodeCommand, NodeMessage};
use fg_storage::{QueryFilter, StorageError, TableStoreExt};

pub struct MessageRepo<'a> {
    ctx: &'a Collaborators,
}

impl<'a> MessageRepo<'a> {
    pub(crate) fn new(ctx: &'a Collaborators) -> Self {
        Self { ctx }
    }

    /// Address a command to a node.
    pub async fn send(
        &self,
        machine_id: MachineId,
        command: NodeCommand,
    ) -> Result<(), EngineError> {
        let mut message = NodeMessage::new(machine_id, command, self.ctx.now());
        self.ctx.store.insert(&mut message).await?;
        Ok(())
    }

    /// Send only if no identical command is already pending, so
    /// processors that re-enter a state every tick don't pile up
    /// duplicates.
    pub async fn send_once(
        &self,
        machine_id: MachineId,
        command: NodeCommand,
    ) -> Result<(), EngineError> {
        let pending = self.get_all(machine_id).await?;
        if pending.iter().any(|message| message.message == command) {
            return Ok(());
        }
        self.send(machine_id, command).await
    }

    /// The oldest pending message for this machine, if any.
    pub async fn get_pending(
        &self,
        machine_id: MachineId,
    ) -> Result<Option<NodeMessage>, EngineError> {
        let mut messages = self.get_all(machine_id).await?;
        if messages.is_empty() {
            return Ok(None);
        }
        messages.sort_by(|a, b| a.message_id.cmp(&b.message_id));
        Ok(Some(messages.remove(0)))
    }

    pub async fn get_all(&self, machine_id: MachineId) -> Result<Vec<NodeMessage>, EngineError> {
        let filter = QueryFilter::new().eq("machine_id", machine_id.to_string());
        Ok(self.ctx.store.query(filter).await?)
    }

    pub async fn has_pending(&self, machine_id: MachineId) -> Result<bool, EngineError> {
        Ok(!self.get_all(machine_id).await?.is_empty())
    }

    /// Consume one message by id. Returns false when it was already gone.
    pub async fn delete(
        &self,
        machine_id: MachineId,
        message_id: &str,
    ) -> Result<bool, EngineError> {
        let Some(message) =
            self.ctx.store.get::<NodeMessage>(&machine_id.to_string(), message_id).await?
        else {
            return Ok(false);
        };
        match self.ctx.store.delete(&message).await {
            Ok(()) => Ok(true),
            Err(StorageError::NotFound { .. }) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Drop every message addressed to a machine.
    pub async fn clear(&self, machine_id: MachineId) -> Result<(), EngineError> {
        for message in self.get_all(machine_id).await? {
            match self.ctx.store.delete(&message).await {
                Ok(()) | Err(StorageError::NotFound { .. }) => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "messages_tests.rs"]
mod tests;
