// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cloud provider seam.
//!
//! Scale-set operations are slow and lossy; every call can time out or
//! report a state older than reality. Callers treat results as hints
//! and converge over successive ticks rather than trusting any single
//! response.

use async_trait::async_trait;
use fg_core::{MachineId, Scaleset, ScalesetId};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CloudError {
    #[error("cloud resource not found: {0}")]
    NotFound(String),

    /// Definitive rejection from the provider.
    #[error("cloud operation failed ({status}): {message}")]
    Failed { status: u16, message: String },

    /// Throttling or timeout. The caller retries on its next tick.
    #[error("transient cloud failure: {0}")]
    Transient(String),
}

impl CloudError {
    pub fn is_transient(&self) -> bool {
        matches!(self, CloudError::Transient(_))
    }
}

/// Operations the engine needs from the cloud provider.
#[async_trait]
pub trait CloudAdapter: Send + Sync {
    /// Create the scale-set with its requested size.
    async fn create_scaleset(&self, scaleset: &Scaleset) -> Result<(), CloudError>;

    /// True once the scale-set finished provisioning.
    async fn scaleset_ready(&self, scaleset_id: ScalesetId) -> Result<bool, CloudError>;

    async fn resize_scaleset(&self, scaleset_id: ScalesetId, size: u64) -> Result<(), CloudError>;

    /// Instance count as the provider currently reports it.
    async fn scaleset_size(&self, scaleset_id: ScalesetId) -> Result<u64, CloudError>;

    async fn delete_scaleset(&self, scaleset_id: ScalesetId) -> Result<(), CloudError>;

    /// Map of machine id to cloud instance id for live instances.
    async fn list_instances(
        &self,
        scaleset_id: ScalesetId,
    ) -> Result<HashMap<MachineId, String>, CloudError>;

    async fn delete_instance(
        &self,
        scaleset_id: ScalesetId,
        instance_id: &str,
    ) -> Result<(), CloudError>;

    async fn reimage_instances(
        &self,
        scaleset_id: ScalesetId,
        instance_ids: Vec<String>,
    ) -> Result<(), CloudError>;

    /// Protect an instance from scale-in while it runs a task.
    async fn protect_from_scale_in(
        &self,
        scaleset_id: ScalesetId,
        instance_id: &str,
    ) -> Result<(), CloudError>;
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeCloud;

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashSet;

    #[derive(Debug, Default, Clone)]
    struct FakeScaleset {
        size: u64,
        ready: bool,
        instances: HashMap<MachineId, String>,
        protected: HashSet<String>,
    }

    /// Scriptable in-memory cloud for tests.
    #[derive(Default)]
    pub struct FakeCloud {
        scalesets: Mutex<HashMap<ScalesetId, FakeScaleset>>,
        deleted_instances: Mutex<Vec<(ScalesetId, String)>>,
        reimaged_instances: Mutex<Vec<(ScalesetId, String)>>,
        fail_next_create: Mutex<Option<CloudError>>,
    }

    impl FakeCloud {
        pub fn new() -> Self {
            Self::default()
        }

        /// Script the next create_scaleset call to fail.
        pub fn fail_next_create(&self, error: CloudError) {
            *self.fail_next_create.lock() = Some(error);
        }

        /// Mark a scale-set as done provisioning.
        pub fn finish_provisioning(&self, scaleset_id: ScalesetId) {
            if let Some(fake) = self.scalesets.lock().get_mut(&scaleset_id) {
                fake.ready = true;
            }
        }

        /// Register a live instance, as if the VM booted.
        pub fn add_instance(
            &self,
            scaleset_id: ScalesetId,
            machine_id: MachineId,
            instance_id: impl Into<String>,
        ) {
            if let Some(fake) = self.scalesets.lock().get_mut(&scaleset_id) {
                fake.instances.insert(machine_id, instance_id.into());
            }
        }

        pub fn deleted_instances(&self) -> Vec<(ScalesetId, String)> {
            self.deleted_instances.lock().clone()
        }

        pub fn reimaged_instances(&self) -> Vec<(ScalesetId, String)> {
            self.reimaged_instances.lock().clone()
        }

        pub fn is_protected(&self, scaleset_id: ScalesetId, instance_id: &str) -> bool {
            self.scalesets
                .lock()
                .get(&scaleset_id)
                .is_some_and(|fake| fake.protected.contains(instance_id))
        }

        pub fn exists(&self, scaleset_id: ScalesetId) -> bool {
            self.scalesets.lock().contains_key(&scaleset_id)
        }

        fn with<T>(
            &self,
            scaleset_id: ScalesetId,
            f: impl FnOnce(&mut FakeScaleset) -> T,
        ) -> Result<T, CloudError> {
            self.scalesets
                .lock()
                .get_mut(&scaleset_id)
                .map(f)
                .ok_or_else(|| CloudError::NotFound(scaleset_id.to_string()))
        }
    }

    #[async_trait]
    impl CloudAdapter for FakeCloud {
        async fn create_scaleset(&self, scaleset: &Scaleset) -> Result<(), CloudError> {
            if let Some(error) = self.fail_next_create.lock().take() {
                return Err(error);
            }
            self.scalesets.lock().insert(
                scaleset.scaleset_id,
                FakeScaleset { size: scaleset.size, ..FakeScaleset::default() },
            );
            Ok(())
        }

        async fn scaleset_ready(&self, scaleset_id: ScalesetId) -> Result<bool, CloudError> {
            self.with(scaleset_id, |fake| fake.ready)
        }

        async fn resize_scaleset(
            &self,
            scaleset_id: ScalesetId,
            size: u64,
        ) -> Result<(), CloudError> {
            self.with(scaleset_id, |fake| fake.size = size)
        }

        async fn scaleset_size(&self, scaleset_id: ScalesetId) -> Result<u64, CloudError> {
            self.with(scaleset_id, |fake| fake.size)
        }

        async fn delete_scaleset(&self, scaleset_id: ScalesetId) -> Result<(), CloudError> {
            self.scalesets.lock().remove(&scaleset_id);
            Ok(())
        }

        async fn list_instances(
            &self,
            scaleset_id: ScalesetId,
        ) -> Result<HashMap<MachineId, String>, CloudError> {
            self.with(scaleset_id, |fake| fake.instances.clone())
        }

        async fn delete_instance(
            &self,
            scaleset_id: ScalesetId,
            instance_id: &str,
        ) -> Result<(), CloudError> {
            self.with(scaleset_id, |fake| {
                fake.instances.retain(|_, id| id != instance_id);
            })?;
            self.deleted_instances.lock().push((scaleset_id, instance_id.to_string()));
            Ok(())
        }

        async fn reimage_instances(
            &self,
            scaleset_id: ScalesetId,
            instance_ids: Vec<String>,
        ) -> Result<(), CloudError> {
            let mut reimaged = self.reimaged_instances.lock();
            for instance_id in instance_ids {
                reimaged.push((scaleset_id, instance_id));
            }
            Ok(())
        }

        async fn protect_from_scale_in(
            &self,
            scaleset_id: ScalesetId,
            instance_id: &str,
        ) -> Result<(), CloudError> {
            self.with(scaleset_id, |fake| {
                fake.protected.insert(instance_id.to_string());
            })
        }
    }
}
