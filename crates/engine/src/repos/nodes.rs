// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node repository.

use super::state_values;
use crate::context::Collaborators;
use crate::error::EngineError;
use fg_core::{EventMessage, MachineId, Node, NodeState, PoolName, ScalesetId};
use fg_storage::{QueryFilter, TableStoreExt};

pub struct NodeRepo<'a> {
    ctx: &'a Collaborators,
}

impl<'a> NodeRepo<'a> {
    pub(crate) fn new(ctx: &'a Collaborators) -> Self {
        Self { ctx }
    }

    /// Keyed lookup when the pool is known.
    pub async fn get(
        &self,
        pool_name: &PoolName,
        machine_id: MachineId,
    ) -> Result<Option<Node>, EngineError> {
        Ok(self.ctx.store.get::<Node>(pool_name.as_str(), &machine_id.to_string()).await?)
    }

    /// Machine-id lookup across pools. Agents identify themselves by
    /// machine id alone, so this is a secondary-attribute query.
    pub async fn get_by_machine_id(
        &self,
        machine_id: MachineId,
    ) -> Result<Option<Node>, EngineError> {
        let filter = QueryFilter::new().eq("machine_id", machine_id.to_string());
        let mut nodes: Vec<Node> = self.ctx.store.query(filter).await?;
        Ok(nodes.pop())
    }

    pub async fn insert(&self, node: &mut Node) -> Result<(), EngineError> {
        self.ctx.store.insert(node).await?;
        self.ctx.emit(EventMessage::NodeCreated {
            machine_id: node.machine_id,
            pool_name: node.pool_name.clone(),
        });
        Ok(())
    }

    pub async fn save(&self, node: &mut Node) -> Result<(), EngineError> {
        self.ctx.store.replace(node).await?;
        Ok(())
    }

    pub async fn set_state(&self, node: &mut Node, state: NodeState) -> Result<(), EngineError> {
        if node.state == state {
            return Ok(());
        }
        tracing::info!(
            machine_id = %node.machine_id,
            from = %node.state,
            to = %state,
            "node state"
        );
        node.state = state;
        self.ctx.store.replace(node).await?;
        self.ctx
            .emit(EventMessage::NodeStateUpdated { machine_id: node.machine_id, state });
        Ok(())
    }

    /// Flag the node for reimage; the node processor picks it up the
    /// next time the node is between work.
    pub async fn to_reimage(&self, node: &mut Node) -> Result<(), EngineError> {
        if node.reimage_requested || node.debug_keep_node {
            return Ok(());
        }
        node.reimage_requested = true;
        self.ctx.store.replace(node).await?;
        Ok(())
    }

    /// Remove the node and everything addressed to it.
    pub async fn delete(&self, node: &Node) -> Result<(), EngineError> {
        for row in self.ctx.node_tasks().get_by_machine(node.machine_id).await? {
            self.ctx.node_tasks().delete(&row).await?;
        }
        self.ctx.messages().clear(node.machine_id).await?;
        self.ctx.store.delete(node).await?;
        self.ctx.emit(EventMessage::NodeDeleted {
            machine_id: node.machine_id,
            pool_name: node.pool_name.clone(),
        });
        Ok(())
    }

    pub async fn search_states(&self, states: &[NodeState]) -> Result<Vec<Node>, EngineError> {
        let filter = QueryFilter::new().is_in("state", state_values(states));
        Ok(self.ctx.store.query(filter).await?)
    }

    pub async fn search_by_pool(
        &self,
        pool_name: &PoolName,
        states: &[NodeState],
    ) -> Result<Vec<Node>, EngineError> {
        let mut filter = QueryFilter::new().eq("pool_name", pool_name.as_str());
        if !states.is_empty() {
            filter = filter.is_in("state", state_values(states));
        }
        Ok(self.ctx.store.query(filter).await?)
    }

    pub async fn search_by_scaleset(
        &self,
        scaleset_id: ScalesetId,
    ) -> Result<Vec<Node>, EngineError> {
        let filter = QueryFilter::new().eq("scaleset_id", scaleset_id.to_string());
        Ok(self.ctx.store.query(filter).await?)
    }
}
