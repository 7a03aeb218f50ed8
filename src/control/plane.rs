//! The control-plane façade.
//!
//! One object wires the metadata store, connection registry, router,
//! executor, and event bus, and owns every state-changing operation.
//! Constructed once at startup and shared behind an `Arc`.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::executor::{Executor, SqlBackend};
use crate::metadata::MetadataStore;
use crate::observability::{EventBus, Logger};
use crate::registry::{ConnectionManager, ConnectionRegistry, ShardHandle};
use crate::router::{RouterConfig, RouterService};
use crate::schema::{DdlExecutor, SchemaError};

pub struct ControlPlane {
    pub(super) store: Arc<dyn MetadataStore>,
    pub(super) registry: Arc<ConnectionRegistry<ShardHandle>>,
    pub(super) manager: ConnectionManager,
    pub(super) router: RouterService,
    pub(super) executor: Executor<ShardHandle>,
    pub(super) events: EventBus,
}

impl ControlPlane {
    pub fn new(store: Arc<dyn MetadataStore>, router_cfg: RouterConfig, events: EventBus) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let manager = ConnectionManager::new(store.clone(), registry.clone());
        let router = RouterService::new(store.clone(), router_cfg);
        let executor = Executor::new(registry.clone());

        Self {
            store,
            registry,
            manager,
            router,
            executor,
            events,
        }
    }

    /// The event bus for host subscribers.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Open handles for every shard of every project. Per-shard failures
    /// are warnings; a store failure is logged and swallowed so startup
    /// can proceed without backends.
    pub async fn init_connections(&self) {
        if let Err(err) = self.manager.init_all().await {
            Logger::error(
                "failed to initiate shard connections",
                &[("error", &err.to_string())],
            );
        }
    }

    /// Re-run connection initialization for every project.
    pub async fn retry_shard_connections(&self) -> Result<(), crate::metadata::MetadataError> {
        let result = self.manager.init_all().await;
        match &result {
            Ok(()) => self
                .events
                .info("shard connection retry succeeded", "control - retry_connections", &[]),
            Err(err) => self.events.error(
                "shard connection retry failed",
                "control - retry_connections",
                &[("error", &err.to_string())],
            ),
        }
        result
    }
}

/// DDL execution seam bound to the registry: rollout runs each schema
/// statement batch through the stored shard handle.
#[async_trait]
impl DdlExecutor for ControlPlane {
    async fn execute_ddl(
        &self,
        project_id: Uuid,
        shard_id: Uuid,
        ddl: &str,
    ) -> Result<(), SchemaError> {
        let handle = self
            .registry
            .get(project_id, shard_id)
            .await
            .map_err(|err| SchemaError::ShardDdl {
                shard_id,
                message: err.to_string(),
            })?;

        handle
            .run(ddl)
            .await
            .map(|_| ())
            .map_err(|err| SchemaError::ShardDdl {
                shard_id,
                message: err.to_string(),
            })
    }
}
