// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identity stamp recorded on user-created entities.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who created an entity. Scrubbed by the retention driver after the
/// PII window elapses, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upn: Option<String>,
}

impl UserInfo {
    pub fn is_scrubbed(&self) -> bool {
        self.application_id.is_none() && self.object_id.is_none() && self.upn.is_none()
    }

    /// Clear every identifying field in place.
    pub fn scrub(&mut self) {
        self.application_id = None;
        self.object_id = None;
        self.upn = None;
    }
}
