// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fg-core: entity model for the Fuzzgrid control plane.
//!
//! Every durable entity (Job, Task, Pool, Scaleset, Node and their
//! association records) lives here as a plain serde struct with a
//! storage-owned version stamp. State enums carry their own
//! "needs work" sets so repositories and processors agree on which
//! records are still live.

pub mod macros;

pub mod clock;
pub mod error;
pub mod event;
pub mod id;
pub mod job;
pub mod message;
pub mod node;
pub mod node_tasks;
pub mod pool;
pub mod proxy;
pub mod scaleset;
pub mod secrets;
pub mod task;
pub mod user_info;
pub mod worker;
pub mod workset;

pub use clock::{Clock, FakeClock, SystemClock};
pub use error::{ErrorCode, Fault};
pub use event::EventMessage;
pub use id::{JobId, MachineId, PoolId, ProxyId, ScalesetId, SecretId, TaskId, WorkSetId};
pub use job::{Job, JobConfig, JobState};
pub use message::{NodeCommand, NodeMessage, SshKeyInfo, StopTaskCommand};
pub use node::{Node, NodeState, StateUpdateEvent, TaskRef};
pub use node_tasks::{NodeTasks, NodeTaskState};
pub use pool::{Architecture, Os, Pool, PoolName, PoolState};
pub use proxy::ProxyForward;
pub use scaleset::{Scaleset, ScalesetState};
pub use secrets::SecretAddress;
pub use task::{
    trim_stream, ContainerKind, Task, TaskConfig, TaskContainer, TaskDebugFlag, TaskKind, TaskPool,
    TaskState, STREAM_TAIL_BYTES,
};
pub use user_info::UserInfo;
pub use worker::{ExitStatus, TaskEvent, WorkerDoneEvent, WorkerEvent, WorkerRunningEvent};
pub use workset::{WorkSet, WorkSetEnvelope, WorkUnit};
