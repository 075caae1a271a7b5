// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entity repositories: typed, invariant-preserving access to the
//! record store. One repository per entity kind; all of them borrow
//! the shared collaborators.

mod jobs;
mod messages;
mod node_tasks;
mod nodes;
mod pools;
mod proxy;
mod scalesets;
mod task_events;
mod tasks;
mod worksets;

pub use jobs::JobRepo;
pub use messages::MessageRepo;
pub use node_tasks::NodeTasksRepo;
pub use nodes::NodeRepo;
pub use pools::PoolRepo;
pub use proxy::ProxyRepo;
pub use scalesets::ScalesetRepo;
pub use task_events::TaskEventRepo;
pub use tasks::TaskRepo;
pub use worksets::WorkSetRepo;

use serde::Serialize;
use serde_json::Value;

/// Serialize a state set for an `In` filter clause.
pub(crate) fn state_values<S: Serialize>(states: &[S]) -> Vec<Value> {
    states.iter().filter_map(|state| serde_json::to_value(state).ok()).collect()
}
