// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ProxyForward repository.

use crate::context::Collaborators;
use crate::error::EngineError;
use chrono::{DateTime, Utc};
use fg_core::{ProxyForward, ScalesetId};
use fg_storage::{QueryFilter, StorageError, TableStoreExt};

pub struct ProxyRepo<'a> {
    ctx: &'a Collaborators,
}

impl<'a> ProxyRepo<'a> {
    pub(crate) fn new(ctx: &'a Collaborators) -> Self {
        Self { ctx }
    }

    pub async fn insert(&self, forward: &mut ProxyForward) -> Result<(), EngineError> {
        self.ctx.store.insert(forward).await?;
        Ok(())
    }

    pub async fn delete(&self, forward: &ProxyForward) -> Result<(), EngineError> {
        match self.ctx.store.delete(forward).await {
            Ok(()) | Err(StorageError::NotFound { .. }) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn search_expired(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ProxyForward>, EngineError> {
        let filter = QueryFilter::new().timestamp_before("end_time", now);
        Ok(self.ctx.store.query(filter).await?)
    }

    /// Forwards pointing at a scaleset, released when it halts.
    pub async fn search_by_scaleset(
        &self,
        scaleset_id: ScalesetId,
    ) -> Result<Vec<ProxyForward>, EngineError> {
        let filter = QueryFilter::new().eq("scaleset_id", scaleset_id.to_string());
        Ok(self.ctx.store.query(filter).await?)
    }
}
