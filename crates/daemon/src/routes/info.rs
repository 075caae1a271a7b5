// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Instance metadata endpoints.

use crate::app::AppContext;
use crate::auth::Authenticated;
use crate::error::ApiError;
use axum::extract::State;
use axum::Json;
use fg_wire::InfoResponse;
use serde::Serialize;

/// `GET /info` [user].
pub async fn info(
    State(app): State<AppContext>,
    auth: Authenticated,
) -> Result<Json<InfoResponse>, ApiError> {
    auth.require_user()?;

    Ok(Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        instance_name: app.config.instance_name.clone(),
        region: app.config.region.clone(),
    }))
}

#[derive(Debug, Serialize)]
pub struct PublicConfig {
    pub endpoint: String,
}

/// `GET /config` [anon]: the public client bootstrap config.
pub async fn public_config(State(app): State<AppContext>) -> Json<PublicConfig> {
    Json(PublicConfig { endpoint: app.config.base_url.clone() })
}
