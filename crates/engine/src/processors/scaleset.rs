// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scaleset state machine.
//!
//! Cloud scale-set operations are slow and lossy, so every state here
//! converges over repeated ticks instead of assuming one call settles
//! anything. Transient provider failures leave the state unchanged.

use crate::cloud::{CloudAdapter, CloudError};
use crate::context::Collaborators;
use crate::error::EngineError;
use fg_core::{ErrorCode, EventMessage, Fault, Node, Pool, Scaleset, ScalesetState};
use sha2::{Digest, Sha256};

pub struct ScalesetProcessor<'a> {
    ctx: &'a Collaborators,
}

impl<'a> ScalesetProcessor<'a> {
    pub fn new(ctx: &'a Collaborators) -> Self {
        Self { ctx }
    }

    pub async fn search_needs_work(&self) -> Result<Vec<Scaleset>, EngineError> {
        self.ctx.scalesets().search_states(ScalesetState::needs_work()).await
    }

    /// Advance the scaleset one step.
    pub async fn process_state_update(
        &self,
        mut scaleset: Scaleset,
    ) -> Result<Scaleset, EngineError> {
        match scaleset.state {
            ScalesetState::Init => self.process_init(&mut scaleset).await?,
            ScalesetState::Setup => self.process_setup(&mut scaleset).await?,
            ScalesetState::Resize => self.process_resize(&mut scaleset).await?,
            ScalesetState::Running => self.process_running(&mut scaleset).await?,
            ScalesetState::Shutdown => self.process_shutdown(&mut scaleset).await?,
            ScalesetState::Halt => self.process_halt(&mut scaleset).await?,
            ScalesetState::CreationFailed => {}
        }
        Ok(scaleset)
    }

    /// Ask the provider for the scale-set. A definitive rejection is
    /// terminal; throttling retries next tick.
    async fn process_init(&self, scaleset: &mut Scaleset) -> Result<(), EngineError> {
        let Some(pool) = self.ctx.pools().get_by_name(&scaleset.pool_name).await? else {
            let fault = Fault::unable_to_find(format_args!("pool '{}'", scaleset.pool_name));
            return self.fail_creation(scaleset, fault).await;
        };

        match self.ctx.cloud.create_scaleset(scaleset).await {
            Ok(()) => {
                scaleset.config_hash = Some(pool_config_hash(&pool));
                self.ctx.scalesets().set_state(scaleset, ScalesetState::Setup).await
            }
            Err(err) if err.is_transient() => {
                tracing::warn!(
                    scaleset_id = %scaleset.scaleset_id,
                    error = %err,
                    "transient failure creating scale-set, will retry"
                );
                Ok(())
            }
            Err(err) => {
                let fault = creation_fault(&err);
                self.fail_creation(scaleset, fault).await
            }
        }
    }

    async fn fail_creation(
        &self,
        scaleset: &mut Scaleset,
        fault: Fault,
    ) -> Result<(), EngineError> {
        tracing::error!(scaleset_id = %scaleset.scaleset_id, error = %fault, "scale-set creation failed");
        scaleset.error = Some(fault.clone());
        self.ctx.scalesets().set_state(scaleset, ScalesetState::CreationFailed).await?;
        self.ctx.emit(EventMessage::ScalesetFailed {
            scaleset_id: scaleset.scaleset_id,
            pool_name: scaleset.pool_name.clone(),
            error: fault,
        });
        Ok(())
    }

    async fn process_setup(&self, scaleset: &mut Scaleset) -> Result<(), EngineError> {
        if self.ctx.cloud.scaleset_ready(scaleset.scaleset_id).await? {
            self.ctx.scalesets().set_state(scaleset, ScalesetState::Resize).await?;
        }
        Ok(())
    }

    /// Converge the provider toward the requested size. Running once
    /// the reported size matches and every instance has a registered
    /// node.
    async fn process_resize(&self, scaleset: &mut Scaleset) -> Result<(), EngineError> {
        self.ctx.cloud.resize_scaleset(scaleset.scaleset_id, scaleset.size).await?;
        self.ctx.emit(EventMessage::ScalesetResizeScheduled {
            scaleset_id: scaleset.scaleset_id,
            size: scaleset.size,
        });

        let reported = self.ctx.cloud.scaleset_size(scaleset.scaleset_id).await?;
        if reported != scaleset.size {
            return Ok(());
        }

        let instances = self.ctx.cloud.list_instances(scaleset.scaleset_id).await?;
        let nodes = self.ctx.nodes().search_by_scaleset(scaleset.scaleset_id).await?;
        let all_registered = instances
            .keys()
            .all(|machine_id| nodes.iter().any(|node| node.machine_id == *machine_id));
        if instances.len() as u64 == scaleset.size && all_registered {
            self.ctx.scalesets().set_state(scaleset, ScalesetState::Running).await?;
        }
        Ok(())
    }

    /// Steady state: clean up finished nodes, roll config changes, and
    /// chase the cloud-reported size.
    async fn process_running(&self, scaleset: &mut Scaleset) -> Result<(), EngineError> {
        if scaleset.needs_config_update {
            self.apply_config_update(scaleset).await?;
        }
        self.cleanup_nodes(scaleset).await?;

        let reported = self.ctx.cloud.scaleset_size(scaleset.scaleset_id).await?;
        if reported != scaleset.size {
            tracing::info!(
                scaleset_id = %scaleset.scaleset_id,
                reported,
                target = scaleset.size,
                "scale-set size drifted"
            );
            self.ctx.scalesets().set_state(scaleset, ScalesetState::Resize).await?;
        }
        Ok(())
    }

    /// Flag every node for reimage so the fleet picks up the new pool
    /// config, then stamp the new hash.
    async fn apply_config_update(&self, scaleset: &mut Scaleset) -> Result<(), EngineError> {
        tracing::info!(scaleset_id = %scaleset.scaleset_id, "rolling config update");
        for mut node in self.ctx.nodes().search_by_scaleset(scaleset.scaleset_id).await? {
            self.ctx.nodes().to_reimage(&mut node).await?;
        }
        if let Some(pool) = self.ctx.pools().get_by_name(&scaleset.pool_name).await? {
            scaleset.config_hash = Some(pool_config_hash(&pool));
        }
        scaleset.needs_config_update = false;
        self.ctx.scalesets().save(scaleset).await
    }

    /// Drop node records whose halted VM is already gone from the cloud.
    async fn cleanup_nodes(&self, scaleset: &Scaleset) -> Result<(), EngineError> {
        let instances = self.ctx.cloud.list_instances(scaleset.scaleset_id).await?;
        for node in self.ctx.nodes().search_by_scaleset(scaleset.scaleset_id).await? {
            let instance_alive = instances.contains_key(&node.machine_id);
            if node.state == fg_core::NodeState::Halt && !instance_alive {
                self.ctx.nodes().delete(&node).await?;
            }
        }
        Ok(())
    }

    /// Drain to zero, then Halt once the last node record is gone.
    async fn process_shutdown(&self, scaleset: &mut Scaleset) -> Result<(), EngineError> {
        if scaleset.size != 0 {
            scaleset.size = 0;
            self.ctx.scalesets().save(scaleset).await?;
        }
        match self.ctx.cloud.resize_scaleset(scaleset.scaleset_id, 0).await {
            Ok(()) | Err(CloudError::NotFound(_)) => {}
            Err(err) => return Err(err.into()),
        }

        let nodes = self.ctx.nodes().search_by_scaleset(scaleset.scaleset_id).await?;
        for mut node in nodes.iter().cloned() {
            if !node.delete_requested {
                node.delete_requested = true;
                self.ctx.nodes().save(&mut node).await?;
            }
            if node.state.can_process_new_work() {
                self.ctx.nodes().set_state(&mut node, fg_core::NodeState::Shutdown).await?;
            }
        }
        if nodes.is_empty() {
            self.ctx.scalesets().set_state(scaleset, ScalesetState::Halt).await?;
        }
        Ok(())
    }

    /// Delete the cloud scale-set and every remaining reference.
    async fn process_halt(&self, scaleset: &mut Scaleset) -> Result<(), EngineError> {
        match self.ctx.cloud.delete_scaleset(scaleset.scaleset_id).await {
            Ok(()) | Err(CloudError::NotFound(_)) => {}
            Err(err) => return Err(err.into()),
        }
        for node in self.ctx.nodes().search_by_scaleset(scaleset.scaleset_id).await? {
            self.ctx.nodes().delete(&node).await?;
        }
        for forward in
            self.ctx.proxy_forwards().search_by_scaleset(scaleset.scaleset_id).await?
        {
            self.ctx.proxy_forwards().delete(&forward).await?;
        }
        self.ctx.scalesets().delete(scaleset).await
    }
}

/// True when the scaleset no longer needs this node: it is draining,
/// or the fleet is larger than the requested size.
pub(crate) async fn could_shrink_scaleset(
    ctx: &Collaborators,
    node: &Node,
) -> Result<bool, EngineError> {
    let Some(scaleset_id) = node.scaleset_id else {
        return Ok(false);
    };
    let Some(scaleset) = ctx.scalesets().get(scaleset_id).await? else {
        return Ok(true);
    };
    if scaleset.state.shutting_down() {
        return Ok(true);
    }
    let fleet = ctx.nodes().search_by_scaleset(scaleset_id).await?;
    Ok((fleet.len() as u64) > scaleset.size)
}

/// Canonical hash of a pool's agent config, stamped on scalesets at
/// provision time and compared by the daily driver.
pub fn pool_config_hash(pool: &Pool) -> String {
    let canonical = pool
        .config
        .as_ref()
        .and_then(|config| serde_json::to_string(config).ok())
        .unwrap_or_default();
    format!("{:x}", Sha256::digest(canonical.as_bytes()))
}

fn creation_fault(err: &CloudError) -> Fault {
    match err {
        CloudError::Failed { status, message } => Fault::new(
            ErrorCode::UnableToCreate,
            vec![format!("scale-set creation failed ({}): {}", status, message)],
        ),
        other => Fault::with_message(ErrorCode::UnableToCreate, other.to_string()),
    }
}

#[cfg(test)]
#[path = "scaleset_tests.rs"]
mod tests;
