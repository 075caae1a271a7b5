// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Opaque references to values held in the secret store.
//!
//! Entities never carry secret material inline; they hold an address
//! that is resolved through the secret store only at the point of use.

use crate::id::SecretId;
use serde::{Deserialize, Serialize};

/// Address of a secret. Safe to persist and to log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretAddress(pub SecretId);

impl SecretAddress {
    pub fn new() -> Self {
        Self(SecretId::new())
    }

    pub fn id(&self) -> SecretId {
        self.0
    }
}

impl Default for SecretAddress {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SecretAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "secret:{}", self.0)
    }
}
