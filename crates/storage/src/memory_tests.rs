// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::table::{StorageError, TableEntry, TableStoreExt};
use fg_core::{Job, JobId, JobState, Task, TaskState};

#[tokio::test]
async fn insert_then_get_round_trips_with_stamp() {
    let store = MemoryStore::new();
    let mut job = Job::builder().job_id(JobId::new()).build();

    store.insert(&mut job).await.unwrap();
    assert!(job.version > 0);

    let loaded: Job = store
        .get(&job.partition_key(), &job.row_key())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.version, job.version);
    assert_eq!(loaded.job_id, job.job_id);
}

#[tokio::test]
async fn get_missing_returns_none() {
    let store = MemoryStore::new();
    let missing: Option<Job> = store.get("nope", "nope").await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn double_insert_fails() {
    let store = MemoryStore::new();
    let mut job = Job::builder().job_id(JobId::new()).build();
    store.insert(&mut job).await.unwrap();

    let mut duplicate = job.clone();
    let result = store.insert(&mut duplicate).await;
    assert!(matches!(result, Err(StorageError::AlreadyExists { .. })));
}

#[tokio::test]
async fn replace_advances_stamp_even_when_value_unchanged() {
    let store = MemoryStore::new();
    let mut job = Job::builder().job_id(JobId::new()).build();
    store.insert(&mut job).await.unwrap();

    let before = job.version;
    store.replace(&mut job).await.unwrap();
    assert!(job.version > before);
}

#[tokio::test]
async fn stale_replace_is_a_version_conflict() {
    let store = MemoryStore::new();
    let mut job = Job::builder().job_id(JobId::new()).build();
    store.insert(&mut job).await.unwrap();

    let mut stale = job.clone();
    job.state = JobState::Stopping;
    store.replace(&mut job).await.unwrap();

    stale.state = JobState::Stopped;
    let result = store.replace(&mut stale).await;
    assert!(matches!(result, Err(StorageError::VersionConflict { .. })));

    // The winner's write is intact.
    let loaded: Job = store
        .get(&job.partition_key(), &job.row_key())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.state, JobState::Stopping);
}

#[tokio::test]
async fn delete_requires_current_stamp() {
    let store = MemoryStore::new();
    let mut job = Job::builder().job_id(JobId::new()).build();
    store.insert(&mut job).await.unwrap();

    let stale = job.clone();
    store.replace(&mut job).await.unwrap();

    assert!(matches!(
        store.delete(&stale).await,
        Err(StorageError::VersionConflict { .. })
    ));
    store.delete(&job).await.unwrap();
    let gone: Option<Job> = store.get(&job.partition_key(), &job.row_key()).await.unwrap();
    assert!(gone.is_none());
}

#[tokio::test]
async fn query_filters_by_state() {
    let store = MemoryStore::new();
    let job_id = JobId::new();
    for state in [TaskState::Waiting, TaskState::Running, TaskState::Waiting] {
        let mut task = Task::builder().job_id(job_id).task_id(fg_core::TaskId::new()).state(state).build();
        store.insert(&mut task).await.unwrap();
    }

    let waiting: Vec<Task> = store
        .query(QueryFilter::new().eq("state", "waiting"))
        .await
        .unwrap();
    assert_eq!(waiting.len(), 2);
    assert!(waiting.iter().all(|t| t.state == TaskState::Waiting));
}

#[tokio::test]
async fn kinds_are_isolated() {
    let store = MemoryStore::new();
    let mut job = Job::builder().job_id(JobId::new()).build();
    store.insert(&mut job).await.unwrap();

    let tasks: Vec<Task> = store.query(QueryFilter::new()).await.unwrap();
    assert!(tasks.is_empty());
}
