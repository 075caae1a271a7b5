// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WorkSet repository.

use crate::context::Collaborators;
use crate::error::EngineError;
use fg_core::{WorkSet, WorkSetId};
use fg_storage::TableStoreExt;

pub struct WorkSetRepo<'a> {
    ctx: &'a Collaborators,
}

impl<'a> WorkSetRepo<'a> {
    pub(crate) fn new(ctx: &'a Collaborators) -> Self {
        Self { ctx }
    }

    pub async fn get(&self, workset_id: WorkSetId) -> Result<Option<WorkSet>, EngineError> {
        let key = workset_id.to_string();
        Ok(self.ctx.store.get::<WorkSet>(&key, &key).await?)
    }

    pub async fn insert(&self, workset: &mut WorkSet) -> Result<(), EngineError> {
        self.ctx.store.insert(workset).await?;
        Ok(())
    }

    pub async fn delete(&self, workset: &WorkSet) -> Result<(), EngineError> {
        self.ctx.store.delete(workset).await?;
        Ok(())
    }
}
