// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent protocol endpoints.

use crate::app::AppContext;
use crate::auth::Authenticated;
use crate::error::ApiError;
use axum::extract::{Query, State};
use axum::Json;
use fg_core::Fault;
use fg_engine::agents::{self, RegisterParams, ScheduleDecision};
use fg_storage::QueueClient;
use fg_wire::{
    BoolResult, CanScheduleRequest, CanScheduleResponse, NodeStateEnvelope, PendingNodeCommand,
    RegistrationGet, RegistrationPost, RegistrationResponse,
};
use serde::Deserialize;

/// `GET /agents/registration`: re-issue the registration material for
/// an already-registered node.
pub async fn get_registration(
    State(app): State<AppContext>,
    auth: Authenticated,
    Query(query): Query<RegistrationGet>,
) -> Result<Json<RegistrationResponse>, ApiError> {
    auth.require_agent()?;

    let node = app
        .ctx
        .nodes()
        .get_by_machine_id(query.machine_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError(Fault::unable_to_find(format_args!("node {}", query.machine_id))))?;
    let pool = app
        .ctx
        .pools()
        .get(node.pool_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError(Fault::unable_to_find(format_args!("pool '{}'", node.pool_name))))?;

    let work_queue = app
        .ctx
        .queues
        .grant_consumer(&pool.queue_name(), app.ctx.config.queue_credential)
        .await
        .map_err(|err| ApiError::from(fg_engine::EngineError::from(err)))?;

    let base = app.ctx.config.base_url.trim_end_matches('/');
    Ok(Json(RegistrationResponse {
        events_url: format!("{}/agents/events", base),
        commands_url: format!("{}/agents/commands", base),
        work_queue,
    }))
}

/// `POST /agents/registration`: register (or re-register) a node.
pub async fn post_registration(
    State(app): State<AppContext>,
    auth: Authenticated,
    Query(query): Query<RegistrationPost>,
) -> Result<Json<RegistrationResponse>, ApiError> {
    auth.require_agent()?;

    let registration = agents::register(
        &app.ctx,
        RegisterParams {
            machine_id: query.machine_id,
            pool_name: query.pool_name,
            scaleset_id: query.scaleset_id,
            instance_id: query.instance_id,
            version: query.version,
            os: query.os,
        },
    )
    .await?;

    Ok(Json(RegistrationResponse {
        events_url: registration.events_url,
        commands_url: registration.commands_url,
        work_queue: registration.work_queue,
    }))
}

/// `POST /agents/can_schedule`.
pub async fn can_schedule(
    State(app): State<AppContext>,
    auth: Authenticated,
    Json(request): Json<CanScheduleRequest>,
) -> Result<Json<CanScheduleResponse>, ApiError> {
    auth.require_agent()?;

    let decision =
        agents::can_schedule(&app.ctx, request.machine_id, request.job_id, request.task_id)
            .await?;
    let response = match decision {
        ScheduleDecision::Allowed => CanScheduleResponse::allow(),
        ScheduleDecision::Denied(reason) => CanScheduleResponse::deny(reason),
        ScheduleDecision::WorkStopped(reason) => CanScheduleResponse::stopped(reason),
    };
    Ok(Json(response))
}

/// `POST /agents/events`: state updates and worker events, in any of
/// the three envelope forms.
pub async fn events(
    State(app): State<AppContext>,
    auth: Authenticated,
    Json(envelope): Json<NodeStateEnvelope>,
) -> Result<Json<BoolResult>, ApiError> {
    auth.require_agent()?;

    let machine_id = envelope.machine_id;
    let (state_update, worker_event) = envelope.event.into_parts();
    if state_update.is_none() && worker_event.is_none() {
        return Err(ApiError(Fault::invalid_request("empty event envelope")));
    }
    if let Some(update) = state_update {
        agents::on_state_update(&app.ctx, machine_id, update).await?;
    }
    if let Some(event) = worker_event {
        agents::on_worker_event(&app.ctx, machine_id, event).await?;
    }
    Ok(Json(BoolResult::ok()))
}

#[derive(Debug, Deserialize)]
pub struct CommandsGetQuery {
    pub machine_id: fg_core::MachineId,
}

/// `GET /agents/commands`: oldest pending command, if any.
pub async fn get_command(
    State(app): State<AppContext>,
    auth: Authenticated,
    Query(query): Query<CommandsGetQuery>,
) -> Result<Json<Option<PendingNodeCommand>>, ApiError> {
    auth.require_agent()?;

    let pending = agents::get_command(&app.ctx, query.machine_id).await?;
    Ok(Json(pending.map(|message| PendingNodeCommand {
        message_id: message.message_id,
        command: message.message,
    })))
}

#[derive(Debug, Deserialize)]
pub struct CommandsDeleteQuery {
    pub machine_id: fg_core::MachineId,
    pub message_id: String,
}

/// `DELETE /agents/commands`: ack a delivered command.
pub async fn delete_command(
    State(app): State<AppContext>,
    auth: Authenticated,
    Query(query): Query<CommandsDeleteQuery>,
) -> Result<Json<BoolResult>, ApiError> {
    auth.require_agent()?;

    let deleted = agents::delete_command(&app.ctx, query.machine_id, &query.message_id).await?;
    Ok(Json(BoolResult { result: deleted }))
}
