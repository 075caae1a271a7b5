// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire-stable error taxonomy.
//!
//! [`Fault`] is the error record carried on entities and returned over
//! the wire. The [`ErrorCode`] discriminant is a stable contract:
//! clients match on it programmatically, so variants are never renamed
//! or renumbered.

use serde::{Deserialize, Serialize};

/// Stable error codes surfaced to users and agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidRequest,
    UnableToFind,
    InvalidJob,
    InvalidContainer,
    UnableToCreate,
    UnableToCreateContainer,
    UnableToAddTaskToJob,
    UnableToUpdate,
    TaskFailed,
    TaskCancelled,
    NotificationFailure,
}

crate::simple_display! {
    ErrorCode {
        InvalidRequest => "INVALID_REQUEST",
        UnableToFind => "UNABLE_TO_FIND",
        InvalidJob => "INVALID_JOB",
        InvalidContainer => "INVALID_CONTAINER",
        UnableToCreate => "UNABLE_TO_CREATE",
        UnableToCreateContainer => "UNABLE_TO_CREATE_CONTAINER",
        UnableToAddTaskToJob => "UNABLE_TO_ADD_TASK_TO_JOB",
        UnableToUpdate => "UNABLE_TO_UPDATE",
        TaskFailed => "TASK_FAILED",
        TaskCancelled => "TASK_CANCELLED",
        NotificationFailure => "NOTIFICATION_FAILURE",
    }
}

/// Error record with a stable code and human-readable detail lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{code}: {}", errors.join("; "))]
pub struct Fault {
    pub code: ErrorCode,
    pub errors: Vec<String>,
}

impl Fault {
    pub fn new(code: ErrorCode, errors: Vec<String>) -> Self {
        Self { code, errors }
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, errors: vec![message.into()] }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidRequest, message)
    }

    pub fn unable_to_find(what: impl std::fmt::Display) -> Self {
        Self::with_message(ErrorCode::UnableToFind, format!("unable to find {}", what))
    }

    pub fn unable_to_update(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::UnableToUpdate, message)
    }

    pub fn task_failed(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TaskFailed, message)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
