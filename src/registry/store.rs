//! The registry proper.
//!
//! A reader/writer-locked two-level map: concurrent `get`s never block
//! each other, writes serialize with everything on the same registry.
//! The registry is the only party allowed to close a handle; `set`
//! closes whatever it displaces.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::errors::RegistryError;

/// Minimum surface the registry needs from a backend handle.
#[async_trait]
pub trait BackendHandle: Send + Sync + 'static {
    /// Lightweight liveness probe.
    async fn ping(&self) -> Result<(), RegistryError>;
    /// Release the underlying connections.
    async fn close(&self);
}

/// Process-wide `project → shard → handle` map.
pub struct ConnectionRegistry<H> {
    inner: RwLock<HashMap<Uuid, HashMap<Uuid, Arc<H>>>>,
}

impl<H: BackendHandle> ConnectionRegistry<H> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Store a handle, closing any handle previously under the same key.
    pub async fn set(&self, project_id: Uuid, shard_id: Uuid, handle: Arc<H>) {
        let displaced = {
            let mut map = self.inner.write().await;
            map.entry(project_id)
                .or_default()
                .insert(shard_id, handle)
        };
        if let Some(old) = displaced {
            old.close().await;
        }
    }

    /// Fetch the handle for a shard.
    pub async fn get(&self, project_id: Uuid, shard_id: Uuid) -> Result<Arc<H>, RegistryError> {
        let map = self.inner.read().await;
        map.get(&project_id)
            .and_then(|shards| shards.get(&shard_id))
            .cloned()
            .ok_or(RegistryError::NotFound)
    }

    /// Remove and close the handle for a shard, if present.
    pub async fn remove(&self, project_id: Uuid, shard_id: Uuid) {
        let removed = {
            let mut map = self.inner.write().await;
            map.get_mut(&project_id)
                .and_then(|shards| shards.remove(&shard_id))
        };
        if let Some(handle) = removed {
            handle.close().await;
        }
    }

    /// Probe the handle for a shard.
    pub async fn check_health(
        &self,
        project_id: Uuid,
        shard_id: Uuid,
    ) -> Result<(), RegistryError> {
        let handle = self.get(project_id, shard_id).await?;
        handle.ping().await
    }
}

impl<H: BackendHandle> Default for ConnectionRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}
