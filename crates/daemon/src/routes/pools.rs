// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pool endpoints. Mutations require admin scope.

use crate::app::AppContext;
use crate::auth::Authenticated;
use crate::error::ApiError;
use axum::extract::{Query, State};
use axum::Json;
use fg_core::{ErrorCode, Fault, Pool, PoolId, PoolName, PoolState};
use fg_wire::{PoolCreateRequest, PoolSearchRequest, PoolStopRequest, PoolUpdateRequest};

async fn load_by_name(app: &AppContext, name: &PoolName) -> Result<Pool, ApiError> {
    app.ctx
        .pools()
        .get_by_name(name)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError(Fault::unable_to_find(format_args!("pool '{}'", name))))
}

/// `GET /pool`.
pub async fn search(
    State(app): State<AppContext>,
    auth: Authenticated,
    Query(query): Query<PoolSearchRequest>,
) -> Result<Json<Vec<Pool>>, ApiError> {
    auth.require_user()?;

    if let Some(pool_id) = query.pool_id {
        let pool = app
            .ctx
            .pools()
            .get(pool_id)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError(Fault::unable_to_find(format_args!("pool {}", pool_id))))?;
        return Ok(Json(vec![pool]));
    }
    if let Some(name) = query.name {
        return Ok(Json(vec![load_by_name(&app, &name).await?]));
    }
    let states = match query.state {
        Some(state) => vec![state],
        None => vec![PoolState::Init, PoolState::Running, PoolState::Shutdown, PoolState::Halt],
    };
    Ok(Json(app.ctx.pools().search_states(&states).await.map_err(ApiError::from)?))
}

/// `POST /pool` [admin]: create a pool in Init.
pub async fn create(
    State(app): State<AppContext>,
    auth: Authenticated,
    Json(request): Json<PoolCreateRequest>,
) -> Result<Json<Pool>, ApiError> {
    auth.require_admin()?;

    if app.ctx.pools().get_by_name(&request.name).await.map_err(ApiError::from)?.is_some() {
        return Err(ApiError(Fault::with_message(
            ErrorCode::UnableToCreate,
            format!("pool '{}' already exists", request.name),
        )));
    }

    let mut pool = Pool {
        pool_id: PoolId::new(),
        name: request.name,
        os: request.os,
        arch: request.arch,
        managed: request.managed,
        state: PoolState::Init,
        object_id: request.object_id,
        client_id: request.client_id,
        config: None,
        version: 0,
    };
    app.ctx.pools().insert(&mut pool).await?;
    Ok(Json(pool))
}

/// `PATCH /pool` [admin]: replace the pool's agent configuration. The
/// daily driver propagates the change to scalesets.
pub async fn update(
    State(app): State<AppContext>,
    auth: Authenticated,
    Json(request): Json<PoolUpdateRequest>,
) -> Result<Json<Pool>, ApiError> {
    auth.require_admin()?;

    let mut pool = load_by_name(&app, &request.name).await?;
    pool.config = Some(request.config);
    app.ctx.pools().save(&mut pool).await?;
    Ok(Json(pool))
}

/// `DELETE /pool` [admin]: drain, or tear down immediately with `now`.
pub async fn stop(
    State(app): State<AppContext>,
    auth: Authenticated,
    Json(request): Json<PoolStopRequest>,
) -> Result<Json<Pool>, ApiError> {
    auth.require_admin()?;

    let mut pool = load_by_name(&app, &request.name).await?;
    let target = if request.now { PoolState::Halt } else { PoolState::Shutdown };
    if !pool.state.shutting_down() || target == PoolState::Halt {
        app.ctx.pools().set_state(&mut pool, target).await?;
    }
    Ok(Json(pool))
}
