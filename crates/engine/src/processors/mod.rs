// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State-machine processors, one per entity kind.
//!
//! Each processor advances an entity by at most one state per call,
//! persisting through a version-stamped replace. A conflicting write
//! aborts the entity's tick; the next invocation reloads and retries.
//! Processors are idempotent and safe to run concurrently on disjoint
//! entities.

pub mod job;
pub mod node;
pub mod pool;
pub mod scaleset;
pub mod task;
