// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cloud adapter stub for deployments without a provider.
//!
//! Unmanaged pools (user-supplied VMs) never touch the cloud seam, so
//! a single-process daemon runs fine with this in place. Managed
//! scalesets fail their creation with a definitive error instead of
//! hanging.

use async_trait::async_trait;
use fg_core::{MachineId, Scaleset, ScalesetId};
use fg_engine::{CloudAdapter, CloudError};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCloud;

fn unavailable() -> CloudError {
    CloudError::Failed { status: 501, message: "no cloud adapter configured".to_string() }
}

#[async_trait]
impl CloudAdapter for DisabledCloud {
    async fn create_scaleset(&self, _scaleset: &Scaleset) -> Result<(), CloudError> {
        Err(unavailable())
    }

    async fn scaleset_ready(&self, _scaleset_id: ScalesetId) -> Result<bool, CloudError> {
        Err(unavailable())
    }

    async fn resize_scaleset(
        &self,
        scaleset_id: ScalesetId,
        _size: u64,
    ) -> Result<(), CloudError> {
        Err(CloudError::NotFound(scaleset_id.to_string()))
    }

    async fn scaleset_size(&self, scaleset_id: ScalesetId) -> Result<u64, CloudError> {
        Err(CloudError::NotFound(scaleset_id.to_string()))
    }

    async fn delete_scaleset(&self, _scaleset_id: ScalesetId) -> Result<(), CloudError> {
        Ok(())
    }

    async fn list_instances(
        &self,
        _scaleset_id: ScalesetId,
    ) -> Result<HashMap<MachineId, String>, CloudError> {
        Ok(HashMap::new())
    }

    async fn delete_instance(
        &self,
        _scaleset_id: ScalesetId,
        _instance_id: &str,
    ) -> Result<(), CloudError> {
        Ok(())
    }

    async fn reimage_instances(
        &self,
        _scaleset_id: ScalesetId,
        _instance_ids: Vec<String>,
    ) -> Result<(), CloudError> {
        Ok(())
    }

    async fn protect_from_scale_in(
        &self,
        _scaleset_id: ScalesetId,
        _instance_id: &str,
    ) -> Result<(), CloudError> {
        Err(unavailable())
    }
}
