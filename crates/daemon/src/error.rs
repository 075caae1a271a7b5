// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP error mapping.
//!
//! Every failure leaving a handler is a [`Fault`] with a stable code;
//! the HTTP status is derived from the code, and the body is the
//! `{code, errors}` envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fg_core::{ErrorCode, Fault};
use fg_engine::EngineError;
use fg_storage::StorageError;

#[derive(Debug)]
pub struct ApiError(pub Fault);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.code {
            ErrorCode::InvalidRequest
            | ErrorCode::InvalidJob
            | ErrorCode::InvalidContainer
            | ErrorCode::UnableToAddTaskToJob => StatusCode::BAD_REQUEST,
            ErrorCode::UnableToFind => StatusCode::NOT_FOUND,
            ErrorCode::UnableToUpdate => StatusCode::CONFLICT,
            ErrorCode::UnableToCreate
            | ErrorCode::UnableToCreateContainer
            | ErrorCode::TaskFailed
            | ErrorCode::TaskCancelled
            | ErrorCode::NotificationFailure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = %self.0.code, errors = ?self.0.errors, "request failed");
        }
        (status, Json(self.0)).into_response()
    }
}

impl From<Fault> for ApiError {
    fn from(fault: Fault) -> Self {
        Self(fault)
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let fault = match err {
            EngineError::Fault(fault) => fault,
            EngineError::Storage(StorageError::NotFound { kind, partition, row }) => {
                Fault::unable_to_find(format_args!("{} ({}, {})", kind, partition, row))
            }
            EngineError::Storage(StorageError::AlreadyExists { kind, .. }) => {
                Fault::unable_to_update(format!("{} already exists", kind))
            }
            EngineError::Storage(StorageError::VersionConflict { kind, .. }) => {
                Fault::unable_to_update(format!("{} was modified concurrently", kind))
            }
            other => Fault::with_message(ErrorCode::UnableToCreate, other.to_string()),
        };
        Self(fault)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
