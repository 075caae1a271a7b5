// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pool repository.

use super::state_values;
use crate::context::Collaborators;
use crate::error::EngineError;
use fg_core::{EventMessage, Pool, PoolId, PoolName, PoolState};
use fg_storage::{QueryFilter, TableStoreExt};

pub struct PoolRepo<'a> {
    ctx: &'a Collaborators,
}

impl<'a> PoolRepo<'a> {
    pub(crate) fn new(ctx: &'a Collaborators) -> Self {
        Self { ctx }
    }

    pub async fn get(&self, pool_id: PoolId) -> Result<Option<Pool>, EngineError> {
        let key = pool_id.to_string();
        Ok(self.ctx.store.get::<Pool>(&key, &key).await?)
    }

    /// Name lookup; names are unique by construction (checked at create).
    pub async fn get_by_name(&self, name: &PoolName) -> Result<Option<Pool>, EngineError> {
        let filter = QueryFilter::new().eq("name", name.as_str());
        let mut pools: Vec<Pool> = self.ctx.store.query(filter).await?;
        Ok(pools.pop())
    }

    pub async fn insert(&self, pool: &mut Pool) -> Result<(), EngineError> {
        self.ctx.store.insert(pool).await?;
        self.ctx.emit(EventMessage::PoolCreated {
            pool_id: pool.pool_id,
            pool_name: pool.name.clone(),
        });
        Ok(())
    }

    pub async fn save(&self, pool: &mut Pool) -> Result<(), EngineError> {
        self.ctx.store.replace(pool).await?;
        Ok(())
    }

    pub async fn set_state(&self, pool: &mut Pool, state: PoolState) -> Result<(), EngineError> {
        if pool.state == state {
            return Ok(());
        }
        tracing::info!(pool = %pool.name, from = %pool.state, to = %state, "pool state");
        pool.state = state;
        self.ctx.store.replace(pool).await?;
        Ok(())
    }

    /// Remove the record entirely; Halt is terminal for pools.
    pub async fn delete(&self, pool: &Pool) -> Result<(), EngineError> {
        self.ctx.store.delete(pool).await?;
        self.ctx.emit(EventMessage::PoolDeleted {
            pool_id: pool.pool_id,
            pool_name: pool.name.clone(),
        });
        Ok(())
    }

    pub async fn search_states(&self, states: &[PoolState]) -> Result<Vec<Pool>, EngineError> {
        let filter = QueryFilter::new().is_in("state", state_values(states));
        Ok(self.ctx.store.query(filter).await?)
    }
}
