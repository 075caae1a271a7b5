// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Table bindings for the core entities.
//!
//! Partition and row keys follow the durable layout: Job and Task
//! partition by job id, Pool and Scaleset self-partition, Node
//! partitions by pool name so a pool's fleet is one scan.

use crate::table::TableEntry;
use fg_core::{
    Job, NodeMessage, NodeTasks, Pool, ProxyForward, Scaleset, Task, TaskEvent, WorkSet,
};

macro_rules! versioned {
    () => {
        fn version(&self) -> u64 {
            self.version
        }

        fn set_version(&mut self, version: u64) {
            self.version = version;
        }
    };
}

impl TableEntry for Job {
    const KIND: &'static str = "job";

    fn partition_key(&self) -> String {
        self.job_id.to_string()
    }

    fn row_key(&self) -> String {
        self.job_id.to_string()
    }

    versioned!();
}

impl TableEntry for Task {
    const KIND: &'static str = "task";

    fn partition_key(&self) -> String {
        self.job_id.to_string()
    }

    fn row_key(&self) -> String {
        self.task_id.to_string()
    }

    versioned!();
}

impl TableEntry for Pool {
    const KIND: &'static str = "pool";

    fn partition_key(&self) -> String {
        self.pool_id.to_string()
    }

    fn row_key(&self) -> String {
        self.pool_id.to_string()
    }

    versioned!();
}

impl TableEntry for Scaleset {
    const KIND: &'static str = "scaleset";

    fn partition_key(&self) -> String {
        self.scaleset_id.to_string()
    }

    fn row_key(&self) -> String {
        self.scaleset_id.to_string()
    }

    versioned!();
}

impl TableEntry for fg_core::Node {
    const KIND: &'static str = "node";

    fn partition_key(&self) -> String {
        self.pool_name.to_string()
    }

    fn row_key(&self) -> String {
        self.machine_id.to_string()
    }

    versioned!();
}

impl TableEntry for NodeTasks {
    const KIND: &'static str = "node_tasks";

    fn partition_key(&self) -> String {
        self.machine_id.to_string()
    }

    fn row_key(&self) -> String {
        self.task_id.to_string()
    }

    versioned!();
}

impl TableEntry for NodeMessage {
    const KIND: &'static str = "node_message";

    fn partition_key(&self) -> String {
        self.machine_id.to_string()
    }

    fn row_key(&self) -> String {
        self.message_id.clone()
    }

    versioned!();
}

impl TableEntry for ProxyForward {
    const KIND: &'static str = "proxy_forward";

    fn partition_key(&self) -> String {
        self.region.clone()
    }

    fn row_key(&self) -> String {
        self.port.to_string()
    }

    versioned!();
}

impl TableEntry for WorkSet {
    const KIND: &'static str = "workset";

    fn partition_key(&self) -> String {
        self.workset_id.to_string()
    }

    fn row_key(&self) -> String {
        self.workset_id.to_string()
    }

    versioned!();
}

impl TableEntry for TaskEvent {
    const KIND: &'static str = "task_event";

    fn partition_key(&self) -> String {
        self.task_id.to_string()
    }

    // Keyed by time, reporter, and kind so replaying the same event
    // lands on the same row instead of duplicating the audit trail.
    fn row_key(&self) -> String {
        format!(
            "{:020}-{}-{}",
            self.recorded_at.timestamp_millis().max(0),
            self.machine_id,
            self.event_data.kind()
        )
    }

    versioned!();
}
