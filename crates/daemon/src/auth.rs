// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bearer-token authentication and scope checks.
//!
//! The daemon resolves tokens to a scope and principal from its
//! config; provisioning those tokens is the identity provider's
//! business, outside this process.

use crate::app::AppContext;
use crate::error::ApiError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use fg_core::{Fault, UserInfo};

/// What a caller is allowed to touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Agent,
    User,
    Admin,
}

/// Resolved caller identity, extracted per request.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub scope: Scope,
    pub principal: String,
}

impl Authenticated {
    /// Agent endpoints: agent credentials only.
    pub fn require_agent(&self) -> Result<(), ApiError> {
        match self.scope {
            Scope::Agent => Ok(()),
            _ => Err(denied("agent credential required")),
        }
    }

    /// User endpoints: user or admin credentials.
    pub fn require_user(&self) -> Result<(), ApiError> {
        match self.scope {
            Scope::User | Scope::Admin => Ok(()),
            Scope::Agent => Err(denied("user credential required")),
        }
    }

    /// Admin endpoints.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        match self.scope {
            Scope::Admin => Ok(()),
            _ => Err(denied("admin credential required")),
        }
    }

    /// Identity stamp recorded on entities this caller creates.
    pub fn user_info(&self) -> UserInfo {
        UserInfo { application_id: None, object_id: None, upn: Some(self.principal.clone()) }
    }
}

fn denied(reason: &str) -> ApiError {
    ApiError(Fault::invalid_request(reason))
}

#[axum::async_trait]
impl FromRequestParts<AppContext> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        app: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| denied("missing bearer token"))?;

        let auth = &app.config.auth;
        if let Some(principal) = auth.admin_tokens.get(token) {
            return Ok(Self { scope: Scope::Admin, principal: principal.clone() });
        }
        if let Some(principal) = auth.user_tokens.get(token) {
            return Ok(Self { scope: Scope::User, principal: principal.clone() });
        }
        if let Some(principal) = auth.agent_tokens.get(token) {
            return Ok(Self { scope: Scope::Agent, principal: principal.clone() });
        }
        Err(denied("unknown credential"))
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
