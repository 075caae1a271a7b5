// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Secret store seam.
//!
//! Entities persist only a [`SecretAddress`]; the value is resolved
//! through this trait at the point of use and never travels on an
//! entity or a log line.

use async_trait::async_trait;
use fg_core::{SecretAddress, SecretId};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("secret {0} not found")]
    NotFound(SecretAddress),

    #[error("serialization failed: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("transient secret store failure: {0}")]
    Transient(String),
}

#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Persist a value, returning its opaque address.
    async fn store(&self, value: Value) -> Result<SecretAddress, SecretError>;

    async fn retrieve(&self, address: &SecretAddress) -> Result<Value, SecretError>;

    /// Remove a secret. Deleting an unknown address is a no-op.
    async fn delete(&self, address: &SecretAddress) -> Result<(), SecretError>;
}

/// Secret store backed by process memory.
#[derive(Default)]
pub struct MemorySecrets {
    values: Mutex<HashMap<SecretId, Value>>,
}

impl MemorySecrets {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretStore for MemorySecrets {
    async fn store(&self, value: Value) -> Result<SecretAddress, SecretError> {
        let address = SecretAddress::new();
        self.values.lock().insert(address.id(), value);
        Ok(address)
    }

    async fn retrieve(&self, address: &SecretAddress) -> Result<Value, SecretError> {
        self.values
            .lock()
            .get(&address.id())
            .cloned()
            .ok_or_else(|| SecretError::NotFound(address.clone()))
    }

    async fn delete(&self, address: &SecretAddress) -> Result<(), SecretError> {
        self.values.lock().remove(&address.id());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_and_retrieve() {
        let secrets = MemorySecrets::new();
        let address = secrets.store(serde_json::json!({"token": "s3cret"})).await.unwrap();
        let value = secrets.retrieve(&address).await.unwrap();
        assert_eq!(value["token"], "s3cret");
    }

    #[tokio::test]
    async fn delete_then_retrieve_fails() {
        let secrets = MemorySecrets::new();
        let address = secrets.store(serde_json::json!("v")).await.unwrap();
        secrets.delete(&address).await.unwrap();
        assert!(matches!(
            secrets.retrieve(&address).await,
            Err(SecretError::NotFound(_))
        ));
    }
}
