// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Explicit collaborator bundle passed into every component.
//!
//! There are no process-wide singletons: the only long-lived objects
//! are the store and queue clients constructed at startup and carried
//! here. Components receive `&Collaborators` and reach their
//! repositories through it.

use crate::cloud::CloudAdapter;
use crate::config::EngineConfig;
use crate::repos::{
    JobRepo, MessageRepo, NodeRepo, NodeTasksRepo, PoolRepo, ProxyRepo, ScalesetRepo,
    TaskEventRepo, TaskRepo, WorkSetRepo,
};
use chrono::{DateTime, Utc};
use fg_core::{Clock, EventMessage};
use fg_storage::{QueueClient, SecretStore, TableStore};
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn TableStore>,
    pub queues: Arc<dyn QueueClient>,
    pub secrets: Arc<dyn SecretStore>,
    pub cloud: Arc<dyn CloudAdapter>,
    pub clock: Arc<dyn Clock>,
    pub events: broadcast::Sender<EventMessage>,
    pub config: EngineConfig,
}

impl Collaborators {
    pub fn new(
        store: Arc<dyn TableStore>,
        queues: Arc<dyn QueueClient>,
        secrets: Arc<dyn SecretStore>,
        cloud: Arc<dyn CloudAdapter>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(256);
        Self { store, queues, secrets, cloud, clock, events, config }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Fan an event out to subscribers. Lagging or absent subscribers
    /// never block the emitter.
    pub fn emit(&self, event: EventMessage) {
        tracing::debug!(event = ?event, "event");
        let _ = self.events.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventMessage> {
        self.events.subscribe()
    }

    pub fn jobs(&self) -> JobRepo<'_> {
        JobRepo::new(self)
    }

    pub fn tasks(&self) -> TaskRepo<'_> {
        TaskRepo::new(self)
    }

    pub fn pools(&self) -> PoolRepo<'_> {
        PoolRepo::new(self)
    }

    pub fn scalesets(&self) -> ScalesetRepo<'_> {
        ScalesetRepo::new(self)
    }

    pub fn nodes(&self) -> NodeRepo<'_> {
        NodeRepo::new(self)
    }

    pub fn node_tasks(&self) -> NodeTasksRepo<'_> {
        NodeTasksRepo::new(self)
    }

    pub fn messages(&self) -> MessageRepo<'_> {
        MessageRepo::new(self)
    }

    pub fn worksets(&self) -> WorkSetRepo<'_> {
        WorkSetRepo::new(self)
    }

    pub fn task_events(&self) -> TaskEventRepo<'_> {
        TaskEventRepo::new(self)
    }

    pub fn proxy_forwards(&self) -> ProxyRepo<'_> {
        ProxyRepo::new(self)
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use test_support::TestContext;

#[cfg(any(test, feature = "test-support"))]
mod test_support {
    use super::*;
    use crate::cloud::FakeCloud;
    use fg_core::FakeClock;
    use fg_storage::{MemoryQueues, MemorySecrets, MemoryStore};

    /// Fully in-memory collaborators with handles onto the fakes.
    pub struct TestContext {
        pub ctx: Collaborators,
        pub clock: FakeClock,
        pub cloud: Arc<FakeCloud>,
        pub store: Arc<MemoryStore>,
        pub queues: Arc<MemoryQueues>,
    }

    impl TestContext {
        pub fn new() -> Self {
            Self::with_config(EngineConfig::default())
        }

        pub fn now(&self) -> DateTime<Utc> {
            self.ctx.now()
        }

        pub fn with_config(config: EngineConfig) -> Self {
            let clock = FakeClock::new();
            let store = Arc::new(MemoryStore::new());
            let queues = Arc::new(MemoryQueues::new(Arc::new(clock.clone())));
            let cloud = Arc::new(FakeCloud::new());
            let ctx = Collaborators::new(
                store.clone(),
                queues.clone(),
                Arc::new(MemorySecrets::new()),
                cloud.clone(),
                Arc::new(clock.clone()),
                config,
            );
            Self { ctx, clock, cloud, store, queues }
        }
    }

    impl Default for TestContext {
        fn default() -> Self {
            Self::new()
        }
    }
}
