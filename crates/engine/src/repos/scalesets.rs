// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scaleset repository.

use super::state_values;
use crate::context::Collaborators;
use crate::error::EngineError;
use fg_core::{EventMessage, PoolName, Scaleset, ScalesetId, ScalesetState};
use fg_storage::{QueryFilter, TableStoreExt};

pub struct ScalesetRepo<'a> {
    ctx: &'a Collaborators,
}

impl<'a> ScalesetRepo<'a> {
    pub(crate) fn new(ctx: &'a Collaborators) -> Self {
        Self { ctx }
    }

    pub async fn get(&self, scaleset_id: ScalesetId) -> Result<Option<Scaleset>, EngineError> {
        let key = scaleset_id.to_string();
        Ok(self.ctx.store.get::<Scaleset>(&key, &key).await?)
    }

    pub async fn insert(&self, scaleset: &mut Scaleset) -> Result<(), EngineError> {
        self.ctx.store.insert(scaleset).await?;
        self.ctx.emit(EventMessage::ScalesetCreated {
            scaleset_id: scaleset.scaleset_id,
            pool_name: scaleset.pool_name.clone(),
        });
        Ok(())
    }

    pub async fn save(&self, scaleset: &mut Scaleset) -> Result<(), EngineError> {
        self.ctx.store.replace(scaleset).await?;
        Ok(())
    }

    pub async fn set_state(
        &self,
        scaleset: &mut Scaleset,
        state: ScalesetState,
    ) -> Result<(), EngineError> {
        if scaleset.state == state {
            return Ok(());
        }
        tracing::info!(
            scaleset_id = %scaleset.scaleset_id,
            from = %scaleset.state,
            to = %state,
            "scaleset state"
        );
        scaleset.state = state;
        self.ctx.store.replace(scaleset).await?;
        self.ctx.emit(EventMessage::ScalesetStateUpdated {
            scaleset_id: scaleset.scaleset_id,
            state,
        });
        Ok(())
    }

    /// Remove the record entirely; Halt is terminal for scalesets.
    pub async fn delete(&self, scaleset: &Scaleset) -> Result<(), EngineError> {
        self.ctx.store.delete(scaleset).await?;
        self.ctx.emit(EventMessage::ScalesetDeleted {
            scaleset_id: scaleset.scaleset_id,
            pool_name: scaleset.pool_name.clone(),
        });
        Ok(())
    }

    pub async fn search_by_pool(&self, pool_name: &PoolName) -> Result<Vec<Scaleset>, EngineError> {
        let filter = QueryFilter::new().eq("pool_name", pool_name.as_str());
        Ok(self.ctx.store.query(filter).await?)
    }

    pub async fn search_states(
        &self,
        states: &[ScalesetState],
    ) -> Result<Vec<Scaleset>, EngineError> {
        let filter = QueryFilter::new().is_in("state", state_values(states));
        Ok(self.ctx.store.query(filter).await?)
    }
}
