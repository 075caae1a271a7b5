// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scaleset endpoints. Mutations require admin scope.

use crate::app::AppContext;
use crate::auth::Authenticated;
use crate::error::ApiError;
use axum::extract::{Query, State};
use axum::Json;
use fg_core::{Fault, Scaleset, ScalesetId, ScalesetState};
use fg_wire::{
    ScalesetCreateRequest, ScalesetSearchRequest, ScalesetStopRequest, ScalesetUpdateRequest,
};

async fn load(app: &AppContext, scaleset_id: ScalesetId) -> Result<Scaleset, ApiError> {
    app.ctx
        .scalesets()
        .get(scaleset_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError(Fault::unable_to_find(format_args!("scaleset {}", scaleset_id))))
}

/// `GET /scaleset`.
pub async fn search(
    State(app): State<AppContext>,
    auth: Authenticated,
    Query(query): Query<ScalesetSearchRequest>,
) -> Result<Json<Vec<Scaleset>>, ApiError> {
    auth.require_user()?;

    if let Some(scaleset_id) = query.scaleset_id {
        return Ok(Json(vec![load(&app, scaleset_id).await?]));
    }
    let states = match query.state {
        Some(state) => vec![state],
        None => {
            let mut states = ScalesetState::needs_work().to_vec();
            states.push(ScalesetState::CreationFailed);
            states
        }
    };
    Ok(Json(app.ctx.scalesets().search_states(&states).await.map_err(ApiError::from)?))
}

/// `POST /scaleset` [admin]: create a scaleset in Init under a managed
/// pool.
pub async fn create(
    State(app): State<AppContext>,
    auth: Authenticated,
    Json(request): Json<ScalesetCreateRequest>,
) -> Result<Json<Scaleset>, ApiError> {
    auth.require_admin()?;

    let pool = app
        .ctx
        .pools()
        .get_by_name(&request.pool_name)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| {
            ApiError(Fault::unable_to_find(format_args!("pool '{}'", request.pool_name)))
        })?;
    if !pool.managed {
        return Err(ApiError(Fault::invalid_request(format!(
            "pool '{}' is unmanaged and cannot own scalesets",
            pool.name
        ))));
    }

    let mut scaleset = Scaleset {
        scaleset_id: ScalesetId::new(),
        pool_name: pool.name,
        state: ScalesetState::Init,
        region: request.region,
        vm_sku: request.vm_sku,
        image: request.image,
        size: request.size,
        spot_instances: request.spot_instances,
        ephemeral_os_disks: request.ephemeral_os_disks,
        auth: None,
        tags: request.tags,
        config_hash: None,
        needs_config_update: false,
        error: None,
        version: 0,
    };
    app.ctx.scalesets().insert(&mut scaleset).await?;
    Ok(Json(scaleset))
}

/// `PATCH /scaleset` [admin]: resize. Loses to a concurrent writer
/// with UNABLE_TO_UPDATE; the winner's size converges on the next
/// scaleset tick.
pub async fn update(
    State(app): State<AppContext>,
    auth: Authenticated,
    Json(request): Json<ScalesetUpdateRequest>,
) -> Result<Json<Scaleset>, ApiError> {
    auth.require_admin()?;

    let mut scaleset = load(&app, request.scaleset_id).await?;
    if !scaleset.state.can_resize() {
        return Err(ApiError(Fault::invalid_request(format!(
            "scaleset is {} and cannot be resized",
            scaleset.state
        ))));
    }
    if let Some(size) = request.size {
        scaleset.size = size;
        scaleset.state = ScalesetState::Resize;
        app.ctx.scalesets().save(&mut scaleset).await?;
    }
    Ok(Json(scaleset))
}

/// `DELETE /scaleset` [admin]: drain, or tear down immediately with
/// `now`.
pub async fn stop(
    State(app): State<AppContext>,
    auth: Authenticated,
    Json(request): Json<ScalesetStopRequest>,
) -> Result<Json<Scaleset>, ApiError> {
    auth.require_admin()?;

    let mut scaleset = load(&app, request.scaleset_id).await?;
    let target = if request.now { ScalesetState::Halt } else { ScalesetState::Shutdown };
    if !scaleset.state.shutting_down() || target == ScalesetState::Halt {
        app.ctx.scalesets().set_state(&mut scaleset, target).await?;
    }
    Ok(Json(scaleset))
}
