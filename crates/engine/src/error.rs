// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine error type.

use crate::cloud::CloudError;
use fg_core::Fault;
use fg_storage::{QueueError, SecretError, StorageError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error(transparent)]
    Cloud(#[from] CloudError),

    /// Semantic failures surfaced to callers with a stable code.
    #[error(transparent)]
    Fault(#[from] Fault),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

impl EngineError {
    /// Version conflicts abort one entity's tick and are retried; they
    /// are never an error condition for the tick as a whole.
    pub fn is_conflict(&self) -> bool {
        matches!(self, EngineError::Storage(err) if err.is_conflict())
    }
}
