// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    invalid_request = { ErrorCode::InvalidRequest, StatusCode::BAD_REQUEST },
    invalid_job = { ErrorCode::InvalidJob, StatusCode::BAD_REQUEST },
    cannot_add_task = { ErrorCode::UnableToAddTaskToJob, StatusCode::BAD_REQUEST },
    not_found = { ErrorCode::UnableToFind, StatusCode::NOT_FOUND },
    conflict = { ErrorCode::UnableToUpdate, StatusCode::CONFLICT },
    create_failed = { ErrorCode::UnableToCreate, StatusCode::INTERNAL_SERVER_ERROR },
)]
fn status_follows_error_code(code: ErrorCode, expected: StatusCode) {
    let error = ApiError(Fault::with_message(code, "detail"));
    assert_eq!(error.status(), expected);
}

#[test]
fn version_conflict_maps_to_409() {
    let err = EngineError::Storage(StorageError::VersionConflict {
        kind: "scaleset".to_string(),
        partition: "p".to_string(),
        row: "r".to_string(),
        stored: 4,
        supplied: 3,
    });
    let api: ApiError = err.into();
    assert_eq!(api.0.code, ErrorCode::UnableToUpdate);
    assert_eq!(api.status(), StatusCode::CONFLICT);
}

#[test]
fn storage_not_found_maps_to_404() {
    let err = EngineError::Storage(StorageError::NotFound {
        kind: "job".to_string(),
        partition: "p".to_string(),
        row: "r".to_string(),
    });
    let api: ApiError = err.into();
    assert_eq!(api.0.code, ErrorCode::UnableToFind);
}

#[test]
fn engine_fault_passes_through_unchanged() {
    let fault = Fault::invalid_request("bad body");
    let api: ApiError = EngineError::Fault(fault.clone()).into();
    assert_eq!(api.0, fault);
}
