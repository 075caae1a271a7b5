// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory table backend.
//!
//! Strong per-key consistency, globally monotone version stamps.
//! Queries scan the kind's rows in key order, which also gives tests
//! deterministic results.

use crate::table::{QueryFilter, RawRow, StorageError, TableStore};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
struct StoredRow {
    value: Value,
    version: u64,
}

/// Table service backed by process memory.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, BTreeMap<(String, String), StoredRow>>>,
    stamp: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_stamp(&self) -> u64 {
        self.stamp.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn missing(kind: &str, partition: &str, row: &str) -> StorageError {
        StorageError::NotFound {
            kind: kind.to_string(),
            partition: partition.to_string(),
            row: row.to_string(),
        }
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn get_row(
        &self,
        kind: &str,
        partition: &str,
        row: &str,
    ) -> Result<Option<RawRow>, StorageError> {
        let tables = self.tables.lock();
        let Some(table) = tables.get(kind) else {
            return Ok(None);
        };
        Ok(table.get(&(partition.to_string(), row.to_string())).map(|stored| RawRow {
            partition: partition.to_string(),
            row: row.to_string(),
            value: stored.value.clone(),
            version: stored.version,
        }))
    }

    async fn insert_row(
        &self,
        kind: &str,
        partition: &str,
        row: &str,
        value: Value,
    ) -> Result<u64, StorageError> {
        let mut tables = self.tables.lock();
        let table = tables.entry(kind.to_string()).or_default();
        let key = (partition.to_string(), row.to_string());
        if table.contains_key(&key) {
            return Err(StorageError::AlreadyExists {
                kind: kind.to_string(),
                partition: partition.to_string(),
                row: row.to_string(),
            });
        }
        let version = self.next_stamp();
        table.insert(key, StoredRow { value, version });
        Ok(version)
    }

    async fn replace_row(
        &self,
        kind: &str,
        partition: &str,
        row: &str,
        value: Value,
        expected: u64,
    ) -> Result<u64, StorageError> {
        let mut tables = self.tables.lock();
        let table =
            tables.get_mut(kind).ok_or_else(|| Self::missing(kind, partition, row))?;
        let key = (partition.to_string(), row.to_string());
        let stored = table.get_mut(&key).ok_or_else(|| Self::missing(kind, partition, row))?;
        if stored.version != expected {
            return Err(StorageError::VersionConflict {
                kind: kind.to_string(),
                partition: partition.to_string(),
                row: row.to_string(),
                stored: stored.version,
                supplied: expected,
            });
        }
        let version = self.next_stamp();
        *stored = StoredRow { value, version };
        Ok(version)
    }

    async fn delete_row(
        &self,
        kind: &str,
        partition: &str,
        row: &str,
        expected: u64,
    ) -> Result<(), StorageError> {
        let mut tables = self.tables.lock();
        let table =
            tables.get_mut(kind).ok_or_else(|| Self::missing(kind, partition, row))?;
        let key = (partition.to_string(), row.to_string());
        let stored = table.get(&key).ok_or_else(|| Self::missing(kind, partition, row))?;
        if stored.version != expected {
            return Err(StorageError::VersionConflict {
                kind: kind.to_string(),
                partition: partition.to_string(),
                row: row.to_string(),
                stored: stored.version,
                supplied: expected,
            });
        }
        table.remove(&key);
        Ok(())
    }

    async fn query_rows(
        &self,
        kind: &str,
        filter: QueryFilter,
    ) -> Result<Vec<RawRow>, StorageError> {
        let tables = self.tables.lock();
        let Some(table) = tables.get(kind) else {
            return Ok(Vec::new());
        };
        Ok(table
            .iter()
            .filter(|(_, stored)| filter.matches(&stored.value))
            .map(|((partition, row), stored)| RawRow {
                partition: partition.clone(),
                row: row.clone(),
                value: stored.value.clone(),
                version: stored.version,
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
