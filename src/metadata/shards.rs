//! Shard rows.
//!
//! `shard_index` is dense and unique per project; a new shard takes
//! max + 1 inside the insert statement so concurrent adds cannot race a
//! separate read.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use super::errors::{MetadataError, MetadataResult};
use super::models::{Shard, ShardStatus};
use super::PgMetadata;

/// Persistent operations on shards.
#[async_trait]
pub trait ShardStore: Send + Sync {
    async fn shard_add(&self, project_id: Uuid) -> MetadataResult<Shard>;
    /// All shards of a project, ordered by `shard_index`.
    async fn shard_list(&self, project_id: Uuid) -> MetadataResult<Vec<Shard>>;
    async fn shard_activate(&self, shard_id: Uuid) -> MetadataResult<()>;
    async fn shard_deactivate(&self, shard_id: Uuid) -> MetadataResult<()>;
    /// Fails with [`MetadataError::ShardActive`] while the shard is active.
    async fn shard_delete(&self, shard_id: Uuid) -> MetadataResult<()>;
    async fn shard_delete_all(&self, project_id: Uuid) -> MetadataResult<()>;
    async fn shard_fetch_status(&self, shard_id: Uuid) -> MetadataResult<ShardStatus>;
    async fn shard_fetch_project_id(&self, shard_id: Uuid) -> MetadataResult<Uuid>;
}

fn shard_from_row(row: &PgRow) -> MetadataResult<Shard> {
    Ok(Shard {
        id: row.try_get("id")?,
        project_id: row.try_get("project_id")?,
        shard_index: row.try_get("shard_index")?,
        status: ShardStatus::parse(&row.try_get::<String, _>("status")?)?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl ShardStore for PgMetadata {
    async fn shard_add(&self, project_id: Uuid) -> MetadataResult<Shard> {
        let row = sqlx::query(
            "INSERT INTO shards (id, project_id, shard_index, status) \
             VALUES ($1, $2, \
                 COALESCE((SELECT MAX(shard_index) + 1 FROM shards WHERE project_id = $2), 0), \
                 'inactive') \
             RETURNING id, project_id, shard_index, status, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(project_id)
        .fetch_one(self.pool())
        .await?;
        shard_from_row(&row)
    }

    async fn shard_list(&self, project_id: Uuid) -> MetadataResult<Vec<Shard>> {
        let rows = sqlx::query(
            "SELECT id, project_id, shard_index, status, created_at \
             FROM shards WHERE project_id = $1 ORDER BY shard_index",
        )
        .bind(project_id)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(shard_from_row).collect()
    }

    async fn shard_activate(&self, shard_id: Uuid) -> MetadataResult<()> {
        let result = sqlx::query("UPDATE shards SET status = 'active' WHERE id = $1")
            .bind(shard_id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound);
        }
        Ok(())
    }

    async fn shard_deactivate(&self, shard_id: Uuid) -> MetadataResult<()> {
        let result = sqlx::query("UPDATE shards SET status = 'inactive' WHERE id = $1")
            .bind(shard_id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound);
        }
        Ok(())
    }

    async fn shard_delete(&self, shard_id: Uuid) -> MetadataResult<()> {
        let mut tx = self.pool().begin().await?;

        let status: String = sqlx::query_scalar("SELECT status FROM shards WHERE id = $1")
            .bind(shard_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(MetadataError::from_query)?;
        if ShardStatus::parse(&status)? == ShardStatus::Active {
            return Err(MetadataError::ShardActive);
        }

        sqlx::query("DELETE FROM shards WHERE id = $1")
            .bind(shard_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn shard_delete_all(&self, project_id: Uuid) -> MetadataResult<()> {
        sqlx::query("DELETE FROM shards WHERE project_id = $1")
            .bind(project_id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    async fn shard_fetch_status(&self, shard_id: Uuid) -> MetadataResult<ShardStatus> {
        let status: String = sqlx::query_scalar("SELECT status FROM shards WHERE id = $1")
            .bind(shard_id)
            .fetch_one(self.pool())
            .await
            .map_err(MetadataError::from_query)?;
        ShardStatus::parse(&status)
    }

    async fn shard_fetch_project_id(&self, shard_id: Uuid) -> MetadataResult<Uuid> {
        sqlx::query_scalar("SELECT project_id FROM shards WHERE id = $1")
            .bind(shard_id)
            .fetch_one(self.pool())
            .await
            .map_err(MetadataError::from_query)
    }
}
