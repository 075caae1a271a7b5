// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pool state machine.

use crate::context::Collaborators;
use crate::error::EngineError;
use fg_core::{Pool, PoolState, ScalesetState};
use fg_storage::QueueClient;

pub struct PoolProcessor<'a> {
    ctx: &'a Collaborators,
}

impl<'a> PoolProcessor<'a> {
    pub fn new(ctx: &'a Collaborators) -> Self {
        Self { ctx }
    }

    pub async fn search_needs_work(&self) -> Result<Vec<Pool>, EngineError> {
        self.ctx.pools().search_states(PoolState::needs_work()).await
    }

    /// Advance the pool one step.
    pub async fn process_state_update(&self, mut pool: Pool) -> Result<Pool, EngineError> {
        match pool.state {
            PoolState::Init => self.process_init(&mut pool).await?,
            PoolState::Running => {}
            PoolState::Shutdown => self.process_shutdown(&mut pool).await?,
            PoolState::Halt => self.process_halt(&mut pool).await?,
        }
        Ok(pool)
    }

    async fn process_init(&self, pool: &mut Pool) -> Result<(), EngineError> {
        self.ctx.queues.create_queue(&pool.queue_name()).await?;
        self.ctx.pools().set_state(pool, PoolState::Running).await
    }

    /// Drain: push owned scalesets into shutdown and wait for them
    /// (and any unmanaged nodes) to disappear.
    async fn process_shutdown(&self, pool: &mut Pool) -> Result<(), EngineError> {
        let scalesets = self.ctx.scalesets().search_by_pool(&pool.name).await?;
        for mut scaleset in scalesets {
            if !scaleset.state.shutting_down() {
                self.ctx.scalesets().set_state(&mut scaleset, ScalesetState::Shutdown).await?;
            }
        }

        let mut nodes = self.ctx.nodes().search_by_pool(&pool.name, &[]).await?;
        for node in &mut nodes {
            if !node.delete_requested {
                node.delete_requested = true;
                self.ctx.nodes().save(node).await?;
            }
        }

        let scalesets_left = !self.ctx.scalesets().search_by_pool(&pool.name).await?.is_empty();
        if !scalesets_left && nodes.is_empty() {
            self.ctx.pools().set_state(pool, PoolState::Halt).await?;
        }
        Ok(())
    }

    /// Tear down: scalesets skip the drain, the queue dies, and the
    /// record is deleted.
    async fn process_halt(&self, pool: &mut Pool) -> Result<(), EngineError> {
        for mut scaleset in self.ctx.scalesets().search_by_pool(&pool.name).await? {
            if scaleset.state != ScalesetState::Halt {
                self.ctx.scalesets().set_state(&mut scaleset, ScalesetState::Halt).await?;
            }
        }
        if !self.ctx.scalesets().search_by_pool(&pool.name).await?.is_empty() {
            // Wait for the scaleset processor to finish deleting.
            return Ok(());
        }
        self.ctx.queues.delete_queue(&pool.queue_name()).await?;
        self.ctx.pools().delete(pool).await
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
