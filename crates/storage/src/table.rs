// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed table service with optimistic concurrency.
//!
//! Rows are addressed by `(kind, partition, row)`. Every mutation
//! advances an opaque version stamp; `replace` and `delete` are
//! conditional on the stamp the caller last observed. Contention is
//! surfaced as [`StorageError::VersionConflict`] and retried by the
//! caller, never transparently.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// A storable entity: serialization plus key and version plumbing.
pub trait TableEntry: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Logical table name.
    const KIND: &'static str;

    fn partition_key(&self) -> String;
    fn row_key(&self) -> String;
    fn version(&self) -> u64;
    fn set_version(&mut self, version: u64);
}

/// One row as the store sees it, untyped.
#[derive(Debug, Clone)]
pub struct RawRow {
    pub partition: String,
    pub row: String,
    pub value: Value,
    pub version: u64,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{kind} ({partition}, {row}) not found")]
    NotFound { kind: String, partition: String, row: String },

    #[error("{kind} ({partition}, {row}) already exists")]
    AlreadyExists { kind: String, partition: String, row: String },

    #[error("version conflict on {kind} ({partition}, {row}): stored {stored}, supplied {supplied}")]
    VersionConflict { kind: String, partition: String, row: String, stored: u64, supplied: u64 },

    #[error("serialization failed: {0}")]
    Serde(#[from] serde_json::Error),

    /// Timeouts and throttling. The caller retries on its next tick.
    #[error("transient storage failure: {0}")]
    Transient(String),
}

impl StorageError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::VersionConflict { .. })
    }
}

/// Filter clauses evaluated against the serialized entity.
///
/// Equality and set membership on any field, range on timestamp
/// fields. Secondary-attribute queries are eventually consistent;
/// per-key reads are strong.
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    clauses: Vec<Clause>,
}

#[derive(Debug, Clone)]
enum Clause {
    Eq(String, Value),
    In(String, Vec<Value>),
    TimestampBefore(String, DateTime<Utc>),
    TimestampAfter(String, DateTime<Utc>),
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push(Clause::Eq(field.into(), value.into()));
        self
    }

    pub fn is_in(mut self, field: impl Into<String>, values: Vec<Value>) -> Self {
        self.clauses.push(Clause::In(field.into(), values));
        self
    }

    pub fn timestamp_before(mut self, field: impl Into<String>, at: DateTime<Utc>) -> Self {
        self.clauses.push(Clause::TimestampBefore(field.into(), at));
        self
    }

    pub fn timestamp_after(mut self, field: impl Into<String>, at: DateTime<Utc>) -> Self {
        self.clauses.push(Clause::TimestampAfter(field.into(), at));
        self
    }

    /// Evaluate all clauses against a serialized entity.
    pub fn matches(&self, entity: &Value) -> bool {
        self.clauses.iter().all(|clause| match clause {
            Clause::Eq(field, expected) => lookup(entity, field) == Some(expected),
            Clause::In(field, allowed) => {
                lookup(entity, field).is_some_and(|v| allowed.contains(v))
            }
            Clause::TimestampBefore(field, at) => {
                timestamp(entity, field).is_some_and(|ts| ts < *at)
            }
            Clause::TimestampAfter(field, at) => {
                timestamp(entity, field).is_some_and(|ts| ts > *at)
            }
        })
    }
}

/// Resolve a dotted field path within a serialized entity.
fn lookup<'v>(entity: &'v Value, field: &str) -> Option<&'v Value> {
    field.split('.').try_fold(entity, |value, segment| value.get(segment))
}

fn timestamp(entity: &Value, field: &str) -> Option<DateTime<Utc>> {
    let raw = lookup(entity, field)?.as_str()?;
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.with_timezone(&Utc))
}

/// Untyped row operations. Object-safe so backends can live behind
/// `Arc<dyn TableStore>`; the typed layer is [`TableStoreExt`].
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn get_row(
        &self,
        kind: &str,
        partition: &str,
        row: &str,
    ) -> Result<Option<RawRow>, StorageError>;

    /// Insert a new row, failing if the key already exists.
    /// Returns the row's initial version stamp.
    async fn insert_row(
        &self,
        kind: &str,
        partition: &str,
        row: &str,
        value: Value,
    ) -> Result<u64, StorageError>;

    /// Replace an existing row iff its stored stamp equals `expected`.
    /// Returns the advanced stamp.
    async fn replace_row(
        &self,
        kind: &str,
        partition: &str,
        row: &str,
        value: Value,
        expected: u64,
    ) -> Result<u64, StorageError>;

    /// Delete a row iff its stored stamp equals `expected`.
    async fn delete_row(
        &self,
        kind: &str,
        partition: &str,
        row: &str,
        expected: u64,
    ) -> Result<(), StorageError>;

    async fn query_rows(&self, kind: &str, filter: QueryFilter)
        -> Result<Vec<RawRow>, StorageError>;
}

/// Typed entity operations over any [`TableStore`].
#[async_trait]
pub trait TableStoreExt: TableStore {
    async fn get<E: TableEntry>(
        &self,
        partition: &str,
        row: &str,
    ) -> Result<Option<E>, StorageError> {
        match self.get_row(E::KIND, partition, row).await? {
            Some(raw) => {
                let mut entity: E = serde_json::from_value(raw.value)?;
                entity.set_version(raw.version);
                Ok(Some(entity))
            }
            None => Ok(None),
        }
    }

    /// Insert the entity and write its initial stamp back into it.
    async fn insert<E: TableEntry>(&self, entity: &mut E) -> Result<(), StorageError> {
        let value = serde_json::to_value(&*entity)?;
        let version = self
            .insert_row(E::KIND, &entity.partition_key(), &entity.row_key(), value)
            .await?;
        entity.set_version(version);
        Ok(())
    }

    /// Replace under the entity's current stamp, writing the advanced
    /// stamp back on success.
    async fn replace<E: TableEntry>(&self, entity: &mut E) -> Result<(), StorageError> {
        let value = serde_json::to_value(&*entity)?;
        let version = self
            .replace_row(
                E::KIND,
                &entity.partition_key(),
                &entity.row_key(),
                value,
                entity.version(),
            )
            .await?;
        entity.set_version(version);
        Ok(())
    }

    async fn delete<E: TableEntry>(&self, entity: &E) -> Result<(), StorageError> {
        self.delete_row(E::KIND, &entity.partition_key(), &entity.row_key(), entity.version())
            .await
    }

    async fn query<E: TableEntry>(&self, filter: QueryFilter) -> Result<Vec<E>, StorageError> {
        let rows = self.query_rows(E::KIND, filter).await?;
        let mut entities = Vec::with_capacity(rows.len());
        for raw in rows {
            let mut entity: E = serde_json::from_value(raw.value)?;
            entity.set_version(raw.version);
            entities.push(entity);
        }
        Ok(entities)
    }
}

impl<T: TableStore + ?Sized> TableStoreExt for T {}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
