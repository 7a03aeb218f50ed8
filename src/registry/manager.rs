//! Connection initialization and health checks.
//!
//! Opens a handle for every shard of every project. A shard whose
//! connection row is missing or whose backend refuses the connection is
//! skipped with a warning; it stays absent from the registry until the
//! next retry pass.

use std::sync::Arc;

use uuid::Uuid;

use crate::metadata::{
    MetadataResult, MetadataStore, ProjectStore, ShardConnectionStore, ShardStore,
};
use crate::observability::Logger;

use super::dsn::build_dsn;
use super::errors::RegistryError;
use super::handle::ShardHandle;
use super::store::ConnectionRegistry;

pub struct ConnectionManager {
    store: Arc<dyn MetadataStore>,
    registry: Arc<ConnectionRegistry<ShardHandle>>,
}

impl ConnectionManager {
    pub fn new(
        store: Arc<dyn MetadataStore>,
        registry: Arc<ConnectionRegistry<ShardHandle>>,
    ) -> Self {
        Self { store, registry }
    }

    /// Open and store handles for every shard of every project.
    pub async fn init_all(&self) -> MetadataResult<()> {
        for project in self.store.project_list().await? {
            self.init_project(project.id).await?;
        }
        Logger::info("shard connections initiated for all projects", &[]);
        Ok(())
    }

    /// Open and store handles for every shard of one project.
    pub async fn init_project(&self, project_id: Uuid) -> MetadataResult<()> {
        for shard in self.store.shard_list(project_id).await? {
            let connection = match self.store.connection_fetch(shard.id).await {
                Ok(connection) => connection,
                Err(err) => {
                    Logger::warn(
                        "skipping shard without connection details",
                        &[
                            ("shard_id", &shard.id.to_string()),
                            ("error", &err.to_string()),
                        ],
                    );
                    continue;
                }
            };

            let handle = match ShardHandle::open(&build_dsn(&connection)).await {
                Ok(handle) => handle,
                Err(err) => {
                    Logger::warn(
                        "failed to open shard connection",
                        &[
                            ("shard_id", &shard.id.to_string()),
                            ("error", &err.to_string()),
                        ],
                    );
                    continue;
                }
            };

            self.registry.set(project_id, shard.id, Arc::new(handle)).await;
        }
        Ok(())
    }

    /// Rebuild the handle for one shard after its connection row changed.
    pub async fn rebuild_shard(&self, shard_id: Uuid) -> Result<(), RegistryError> {
        let project_id = self.store.shard_fetch_project_id(shard_id).await?;
        let connection = self.store.connection_fetch(shard_id).await?;

        let handle = ShardHandle::open(&build_dsn(&connection)).await?;
        self.registry.set(project_id, shard_id, Arc::new(handle)).await;
        Ok(())
    }

    /// Probe one shard's stored handle.
    pub async fn check_health(
        &self,
        project_id: Uuid,
        shard_id: Uuid,
    ) -> Result<(), RegistryError> {
        self.registry.check_health(project_id, shard_id).await
    }
}
