// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared application context and router assembly.

use crate::config::DaemonConfig;
use crate::routes;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use fg_engine::Collaborators;
use std::sync::Arc;
use std::time::Duration;

/// Soft deadline for a single request.
const REQUEST_DEADLINE: Duration = Duration::from_secs(30);

/// Everything a request handler needs, built once in main.
#[derive(Clone)]
pub struct AppContext {
    pub ctx: Arc<Collaborators>,
    pub config: Arc<DaemonConfig>,
}

impl AppContext {
    pub fn new(ctx: Arc<Collaborators>, config: DaemonConfig) -> Self {
        Self { ctx, config: Arc::new(config) }
    }
}

/// Assemble the full HTTP surface.
pub fn build_router(app: AppContext) -> Router {
    Router::new()
        // Agent protocol
        .route(
            "/agents/registration",
            get(routes::agents::get_registration).post(routes::agents::post_registration),
        )
        .route("/agents/can_schedule", post(routes::agents::can_schedule))
        .route("/agents/events", post(routes::agents::events))
        .route(
            "/agents/commands",
            get(routes::agents::get_command).delete(routes::agents::delete_command),
        )
        // User control surface
        .route(
            "/jobs",
            get(routes::jobs::search).post(routes::jobs::create).delete(routes::jobs::stop),
        )
        .route(
            "/tasks",
            get(routes::tasks::search).post(routes::tasks::create).delete(routes::tasks::stop),
        )
        .route(
            "/pool",
            get(routes::pools::search)
                .post(routes::pools::create)
                .patch(routes::pools::update)
                .delete(routes::pools::stop),
        )
        .route(
            "/scaleset",
            get(routes::scalesets::search)
                .post(routes::scalesets::create)
                .patch(routes::scalesets::update)
                .delete(routes::scalesets::stop),
        )
        .route(
            "/node",
            get(routes::nodes::search)
                .post(routes::nodes::reimage)
                .patch(routes::nodes::update)
                .delete(routes::nodes::stop),
        )
        .route("/node/add_ssh_key", post(routes::nodes::add_ssh_key))
        .route("/info", get(routes::info::info))
        .route("/config", get(routes::info::public_config))
        .layer(middleware::from_fn(deadline))
        .with_state(app)
}

/// Cut requests off at the soft deadline so a stuck downstream call
/// cannot pin a connection.
async fn deadline(request: Request, next: Next) -> Response {
    match tokio::time::timeout(REQUEST_DEADLINE, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!("request exceeded soft deadline");
            axum::http::StatusCode::REQUEST_TIMEOUT.into_response()
        }
    }
}
