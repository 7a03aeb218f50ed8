//! Shard and connection lifecycle operations.

use uuid::Uuid;

use crate::metadata::{
    ProjectStore, Shard, ShardConnection, ShardConnectionParams, ShardConnectionStore,
    ShardStatus, ShardStore,
};
use crate::observability::Logger;

use super::errors::{ControlError, ControlResult};
use super::plane::ControlPlane;
use super::rules;

impl ControlPlane {
    pub async fn add_shard(&self, project_id: Uuid) -> ControlResult<Shard> {
        let shard = self.store.shard_add(project_id).await?;
        self.events.info(
            "shard added",
            "control - add_shard",
            &[
                ("project_id", &project_id.to_string()),
                ("shard_id", &shard.id.to_string()),
            ],
        );
        Ok(shard)
    }

    pub async fn list_shards(&self, project_id: Uuid) -> ControlResult<Vec<Shard>> {
        Ok(self.store.shard_list(project_id).await?)
    }

    /// Activate a shard: retry connection opening, probe the backend,
    /// then flip the status.
    pub async fn activate_shard(&self, shard_id: Uuid) -> ControlResult<()> {
        if let Err(err) = self.retry_shard_connections().await {
            // The shard's own probe below decides; a retry failure for
            // unrelated shards is only a warning.
            Logger::warn(
                "connection retry failed during shard activation",
                &[
                    ("shard_id", &shard_id.to_string()),
                    ("error", &err.to_string()),
                ],
            );
        }

        let project_id = self.store.shard_fetch_project_id(shard_id).await?;

        if let Err(err) = self.manager.check_health(project_id, shard_id).await {
            self.events.error(
                "shard activation refused",
                "control - activate_shard",
                &[
                    ("project_id", &project_id.to_string()),
                    ("shard_id", &shard_id.to_string()),
                    ("error", &err.to_string()),
                ],
            );
            return Err(ControlError::ShardUnreachable);
        }

        self.store.shard_activate(shard_id).await?;
        self.events.info(
            "shard activated",
            "control - activate_shard",
            &[("shard_id", &shard_id.to_string())],
        );
        Ok(())
    }

    /// Deactivate a shard. Any inactive shard forces the containing
    /// project inactive, with a status-change event.
    pub async fn deactivate_shard(&self, shard_id: Uuid) -> ControlResult<()> {
        self.store.shard_deactivate(shard_id).await?;

        let project_id = self.store.shard_fetch_project_id(shard_id).await?;
        let shards = self.store.shard_list(project_id).await?;

        if rules::any_shard_inactive(&shards) {
            self.store.project_deactivate(project_id).await?;
            self.events
                .project_status_changed(project_id, "inactive");
        }

        self.events.info(
            "shard deactivated",
            "control - deactivate_shard",
            &[
                ("project_id", &project_id.to_string()),
                ("shard_id", &shard_id.to_string()),
            ],
        );
        Ok(())
    }

    /// Delete a shard. Refused while the shard is active; cascades to
    /// its connection row and registry handle.
    pub async fn delete_shard(&self, shard_id: Uuid) -> ControlResult<()> {
        let status = self.store.shard_fetch_status(shard_id).await?;
        if status == ShardStatus::Active {
            self.events.error(
                "shard deletion refused",
                "control - delete_shard",
                &[
                    ("shard_id", &shard_id.to_string()),
                    ("error", "cannot delete active shard"),
                ],
            );
            return Err(ControlError::CannotDeleteActiveShard);
        }

        let project_id = self.store.shard_fetch_project_id(shard_id).await?;

        self.store.connection_remove(shard_id).await?;
        self.store.shard_delete(shard_id).await?;
        self.registry.remove(project_id, shard_id).await;

        self.events.info(
            "shard deleted",
            "control - delete_shard",
            &[("shard_id", &shard_id.to_string())],
        );
        Ok(())
    }

    pub async fn delete_all_shards(&self, project_id: Uuid) -> ControlResult<()> {
        self.store.shard_delete_all(project_id).await?;
        self.events.info(
            "all shards deleted",
            "control - delete_all_shards",
            &[("project_id", &project_id.to_string())],
        );
        Ok(())
    }

    pub async fn fetch_shard_status(&self, shard_id: Uuid) -> ControlResult<ShardStatus> {
        Ok(self.store.shard_fetch_status(shard_id).await?)
    }

    // Connection details --------------------------------------------------

    pub async fn add_connection(&self, params: &ShardConnectionParams) -> ControlResult<()> {
        self.store.connection_create(params).await?;
        self.events.info(
            "shard connection added",
            "control - add_connection",
            &[("shard_id", &params.shard_id.to_string())],
        );
        Ok(())
    }

    /// Update connection details and rebuild the registry entry.
    pub async fn update_connection(&self, params: &ShardConnectionParams) -> ControlResult<()> {
        self.store.connection_update(params).await?;

        if let Err(err) = self.manager.rebuild_shard(params.shard_id).await {
            Logger::warn(
                "failed to rebuild shard handle after connection update",
                &[
                    ("shard_id", &params.shard_id.to_string()),
                    ("error", &err.to_string()),
                ],
            );
        }

        self.events.info(
            "shard connection updated",
            "control - update_connection",
            &[("shard_id", &params.shard_id.to_string())],
        );
        Ok(())
    }

    pub async fn delete_connection(&self, shard_id: Uuid) -> ControlResult<()> {
        self.store.connection_remove(shard_id).await?;
        self.events.info(
            "shard connection deleted",
            "control - delete_connection",
            &[("shard_id", &shard_id.to_string())],
        );
        Ok(())
    }

    pub async fn fetch_connection(&self, shard_id: Uuid) -> ControlResult<ShardConnection> {
        Ok(self.store.connection_fetch(shard_id).await?)
    }
}
