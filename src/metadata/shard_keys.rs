//! Chosen shard keys per (project, table).
//!
//! Automatic re-inference must not clobber operator decisions: the replace
//! primitive deletes only rows with `is_manual_override = false` and the
//! upsert refuses to overwrite a manual row.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use super::errors::MetadataResult;
use super::models::{ShardKey, ShardKeyRecord};
use super::PgMetadata;

/// Persistent operations on shard-key rows.
#[async_trait]
pub trait ShardKeyStore: Send + Sync {
    async fn shard_keys_fetch(&self, project_id: Uuid) -> MetadataResult<Vec<ShardKey>>;
    /// Replace all non-manual rows with `records` in one transaction,
    /// preserving manual overrides.
    async fn shard_keys_replace(
        &self,
        project_id: Uuid,
        records: &[ShardKeyRecord],
    ) -> MetadataResult<()>;
    /// Insert or update one row; an existing manual override wins.
    async fn shard_key_upsert(
        &self,
        project_id: Uuid,
        record: &ShardKeyRecord,
    ) -> MetadataResult<()>;
    async fn shard_key_delete(&self, project_id: Uuid, table_name: &str) -> MetadataResult<()>;
}

const UPSERT_QUERY: &str = "INSERT INTO table_shard_keys \
         (project_id, table_name, shard_key_column, is_manual_override) \
     VALUES ($1, $2, $3, $4) \
     ON CONFLICT (project_id, table_name) DO UPDATE SET \
         shard_key_column = EXCLUDED.shard_key_column, \
         is_manual_override = EXCLUDED.is_manual_override, \
         updated_at = now() \
     WHERE table_shard_keys.is_manual_override = FALSE";

fn key_from_row(row: &PgRow) -> MetadataResult<ShardKey> {
    Ok(ShardKey {
        project_id: row.try_get("project_id")?,
        table_name: row.try_get("table_name")?,
        shard_key_column: row.try_get("shard_key_column")?,
        is_manual_override: row.try_get("is_manual_override")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl ShardKeyStore for PgMetadata {
    async fn shard_keys_fetch(&self, project_id: Uuid) -> MetadataResult<Vec<ShardKey>> {
        let rows = sqlx::query(
            "SELECT project_id, table_name, shard_key_column, is_manual_override, updated_at \
             FROM table_shard_keys WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(key_from_row).collect()
    }

    async fn shard_keys_replace(
        &self,
        project_id: Uuid,
        records: &[ShardKeyRecord],
    ) -> MetadataResult<()> {
        let mut tx = self.pool().begin().await?;

        sqlx::query(
            "DELETE FROM table_shard_keys \
             WHERE project_id = $1 AND is_manual_override = FALSE",
        )
        .bind(project_id)
        .execute(&mut *tx)
        .await?;

        for record in records {
            sqlx::query(UPSERT_QUERY)
                .bind(project_id)
                .bind(&record.table_name)
                .bind(&record.shard_key_column)
                .bind(record.is_manual)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn shard_key_upsert(
        &self,
        project_id: Uuid,
        record: &ShardKeyRecord,
    ) -> MetadataResult<()> {
        sqlx::query(UPSERT_QUERY)
            .bind(project_id)
            .bind(&record.table_name)
            .bind(&record.shard_key_column)
            .bind(record.is_manual)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    async fn shard_key_delete(&self, project_id: Uuid, table_name: &str) -> MetadataResult<()> {
        sqlx::query("DELETE FROM table_shard_keys WHERE project_id = $1 AND table_name = $2")
            .bind(project_id)
            .bind(table_name)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}
