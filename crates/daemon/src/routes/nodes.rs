// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node endpoints. Reads are user scope; mutations are admin except
//! the SSH key debug affordance.

use crate::app::AppContext;
use crate::auth::Authenticated;
use crate::error::ApiError;
use axum::extract::{Query, State};
use axum::Json;
use fg_core::{Fault, MachineId, Node, NodeCommand, NodeState, SshKeyInfo};
use fg_wire::{
    BoolResult, NodeAddSshKeyRequest, NodeReimageRequest, NodeSearchRequest, NodeStopRequest,
    NodeUpdateRequest,
};

async fn load(app: &AppContext, machine_id: MachineId) -> Result<Node, ApiError> {
    app.ctx
        .nodes()
        .get_by_machine_id(machine_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError(Fault::unable_to_find(format_args!("node {}", machine_id))))
}

/// `GET /node`.
pub async fn search(
    State(app): State<AppContext>,
    auth: Authenticated,
    Query(query): Query<NodeSearchRequest>,
) -> Result<Json<Vec<Node>>, ApiError> {
    auth.require_user()?;

    if let Some(machine_id) = query.machine_id {
        return Ok(Json(vec![load(&app, machine_id).await?]));
    }
    if let Some(scaleset_id) = query.scaleset_id {
        return Ok(Json(
            app.ctx.nodes().search_by_scaleset(scaleset_id).await.map_err(ApiError::from)?,
        ));
    }
    if let Some(pool_name) = query.pool_name {
        let states: Vec<NodeState> = query.state.into_iter().collect();
        return Ok(Json(
            app.ctx.nodes().search_by_pool(&pool_name, &states).await.map_err(ApiError::from)?,
        ));
    }
    let states = match query.state {
        Some(state) => vec![state],
        None => vec![
            NodeState::Init,
            NodeState::Free,
            NodeState::SettingUp,
            NodeState::Rebooting,
            NodeState::Ready,
            NodeState::Busy,
            NodeState::Done,
            NodeState::Shutdown,
            NodeState::Halt,
        ],
    };
    Ok(Json(app.ctx.nodes().search_states(&states).await.map_err(ApiError::from)?))
}

/// `POST /node` [admin]: request a reimage.
pub async fn reimage(
    State(app): State<AppContext>,
    auth: Authenticated,
    Json(request): Json<NodeReimageRequest>,
) -> Result<Json<Node>, ApiError> {
    auth.require_admin()?;

    let mut node = load(&app, request.machine_id).await?;
    app.ctx.nodes().to_reimage(&mut node).await?;
    Ok(Json(node))
}

/// `PATCH /node` [admin]: pin or unpin for debugging.
pub async fn update(
    State(app): State<AppContext>,
    auth: Authenticated,
    Json(request): Json<NodeUpdateRequest>,
) -> Result<Json<Node>, ApiError> {
    auth.require_admin()?;

    let mut node = load(&app, request.machine_id).await?;
    if let Some(keep) = request.debug_keep_node {
        node.debug_keep_node = keep;
        app.ctx.nodes().save(&mut node).await?;
    }
    Ok(Json(node))
}

/// `DELETE /node` [admin]: request deletion; the node processor tears
/// the VM down.
pub async fn stop(
    State(app): State<AppContext>,
    auth: Authenticated,
    Json(request): Json<NodeStopRequest>,
) -> Result<Json<Node>, ApiError> {
    auth.require_admin()?;

    let mut node = load(&app, request.machine_id).await?;
    if !node.delete_requested {
        node.delete_requested = true;
        app.ctx.nodes().save(&mut node).await?;
    }
    if node.state.can_process_new_work() {
        app.ctx.nodes().set_state(&mut node, NodeState::Shutdown).await?;
    }
    Ok(Json(node))
}

/// `POST /node/add_ssh_key`: deliver an SSH key to the node for a
/// debug session.
pub async fn add_ssh_key(
    State(app): State<AppContext>,
    auth: Authenticated,
    Json(request): Json<NodeAddSshKeyRequest>,
) -> Result<Json<BoolResult>, ApiError> {
    auth.require_user()?;

    let node = load(&app, request.machine_id).await?;
    app.ctx
        .messages()
        .send(
            node.machine_id,
            NodeCommand::AddSshKey(SshKeyInfo { public_key: request.public_key }),
        )
        .await?;
    Ok(Json(BoolResult::ok()))
}
