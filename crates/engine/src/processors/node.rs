// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node state machine.

use super::scaleset::could_shrink_scaleset;
use crate::cloud::{CloudAdapter, CloudError};
use crate::context::Collaborators;
use crate::error::EngineError;
use fg_core::{Node, NodeCommand, NodeState};

pub struct NodeProcessor<'a> {
    ctx: &'a Collaborators,
}

impl<'a> NodeProcessor<'a> {
    pub fn new(ctx: &'a Collaborators) -> Self {
        Self { ctx }
    }

    pub async fn search_needs_work(&self) -> Result<Vec<Node>, EngineError> {
        self.ctx.nodes().search_states(NodeState::needs_work()).await
    }

    /// Advance the node one step.
    pub async fn process_state_update(&self, mut node: Node) -> Result<Node, EngineError> {
        match node.state {
            NodeState::Free => check_free_node(self.ctx, &mut node).await?,
            NodeState::Done => self.process_done(&mut node).await?,
            NodeState::Shutdown => self.process_shutdown(&mut node).await?,
            NodeState::Halt => self.process_halt(&mut node).await?,
            _ => {}
        }
        Ok(node)
    }

    /// Release the node's task rows, then head into Shutdown.
    async fn process_done(&self, node: &mut Node) -> Result<(), EngineError> {
        if !node.debug_keep_node {
            for row in self.ctx.node_tasks().get_by_machine(node.machine_id).await? {
                self.ctx.node_tasks().delete(&row).await?;
            }
        }
        self.ctx.nodes().set_state(node, NodeState::Shutdown).await
    }

    /// Tell the agent to stop; once it has drained its command queue
    /// the node can be finalized.
    async fn process_shutdown(&self, node: &mut Node) -> Result<(), EngineError> {
        self.ctx.messages().send_once(node.machine_id, NodeCommand::Stop {}).await?;
        if !self.ctx.messages().has_pending(node.machine_id).await? {
            self.ctx.nodes().set_state(node, NodeState::Halt).await?;
        }
        Ok(())
    }

    /// Delete the backing instance (managed nodes) and the record.
    async fn process_halt(&self, node: &mut Node) -> Result<(), EngineError> {
        if let (Some(scaleset_id), Some(instance_id)) = (node.scaleset_id, &node.instance_id) {
            match self.ctx.cloud.delete_instance(scaleset_id, instance_id).await {
                Ok(()) | Err(CloudError::NotFound(_)) => {}
                Err(err) => return Err(err.into()),
            }
        }
        self.ctx.nodes().delete(node).await
    }

    /// Fleet-wide sweeps, invoked every workers tick. Each sweep
    /// queries fresh so an earlier mutation never invalidates a stamp.
    pub async fn check_timeouts(&self) -> Result<(), EngineError> {
        let now = self.ctx.now();
        self.mark_outdated_nodes().await?;
        self.check_heartbeats(now).await?;
        self.cleanup_busy_nodes_without_work(now).await?;
        Ok(())
    }

    async fn check_heartbeats(&self, now: chrono::DateTime<chrono::Utc>) -> Result<(), EngineError> {
        let live = [
            NodeState::Init,
            NodeState::Free,
            NodeState::SettingUp,
            NodeState::Rebooting,
            NodeState::Ready,
            NodeState::Busy,
        ];
        for mut node in self.ctx.nodes().search_states(&live).await? {
            let Some(last_seen) = node.heartbeat.or(node.initialized_at) else { continue };
            if now - last_seen > self.ctx.config.node_heartbeat_timeout {
                tracing::warn!(machine_id = %node.machine_id, "node heartbeat timed out");
                self.ctx.nodes().to_reimage(&mut node).await?;
            }
        }
        Ok(())
    }

    /// A busy node holding no task rows has lost its work; force it
    /// through Done so it gets reset.
    async fn cleanup_busy_nodes_without_work(
        &self,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), EngineError> {
        for mut node in self.ctx.nodes().search_states(&[NodeState::Busy]).await? {
            let Some(last_seen) = node.heartbeat.or(node.initialized_at) else { continue };
            if now - last_seen > self.ctx.config.busy_node_timeout
                && self.ctx.node_tasks().get_by_machine(node.machine_id).await?.is_empty()
            {
                tracing::warn!(machine_id = %node.machine_id, "busy node has no work, resetting");
                self.ctx.nodes().set_state(&mut node, NodeState::Done).await?;
            }
        }
        Ok(())
    }

    /// Nodes running an agent other than the current release are
    /// flagged for reimage.
    async fn mark_outdated_nodes(&self) -> Result<(), EngineError> {
        let Some(latest) = self.ctx.config.latest_agent_version.clone() else {
            return Ok(());
        };
        let live = [NodeState::Init, NodeState::Free, NodeState::Busy, NodeState::Ready];
        for mut node in self.ctx.nodes().search_states(&live).await? {
            if node.agent_version != latest {
                tracing::info!(
                    machine_id = %node.machine_id,
                    agent_version = %node.agent_version,
                    latest = %latest,
                    "agent outdated, flagging for reimage"
                );
                self.ctx.nodes().to_reimage(&mut node).await?;
            }
        }
        Ok(())
    }
}

/// A Free node with a pending reset heads into Shutdown; one its
/// scaleset no longer needs heads straight to Halt.
pub(crate) async fn check_free_node(
    ctx: &Collaborators,
    node: &mut Node,
) -> Result<(), EngineError> {
    if node.reset_requested() {
        return ctx.nodes().set_state(node, NodeState::Shutdown).await;
    }
    if could_shrink_scaleset(ctx, node).await? {
        node.delete_requested = true;
        return ctx.nodes().set_state(node, NodeState::Halt).await;
    }
    Ok(())
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
