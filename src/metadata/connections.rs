//! Shard connection rows. One per shard; the password is stored opaquely
//! and never logged.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use super::errors::{MetadataError, MetadataResult};
use super::models::ShardConnection;
use super::PgMetadata;

/// Write DTO for creating or replacing a shard's connection details.
#[derive(Debug, Clone)]
pub struct ShardConnectionParams {
    pub shard_id: Uuid,
    pub host: String,
    pub port: i32,
    pub database_name: String,
    pub username: String,
    pub password: String,
}

/// Persistent operations on shard connection details.
#[async_trait]
pub trait ShardConnectionStore: Send + Sync {
    async fn connection_create(&self, params: &ShardConnectionParams) -> MetadataResult<()>;
    async fn connection_update(&self, params: &ShardConnectionParams) -> MetadataResult<()>;
    async fn connection_remove(&self, shard_id: Uuid) -> MetadataResult<()>;
    async fn connection_fetch(&self, shard_id: Uuid) -> MetadataResult<ShardConnection>;
}

fn connection_from_row(row: &PgRow) -> MetadataResult<ShardConnection> {
    Ok(ShardConnection {
        shard_id: row.try_get("shard_id")?,
        host: row.try_get("host")?,
        port: row.try_get("port")?,
        database_name: row.try_get("database_name")?,
        username: row.try_get("username")?,
        password: row.try_get("password")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl ShardConnectionStore for PgMetadata {
    async fn connection_create(&self, params: &ShardConnectionParams) -> MetadataResult<()> {
        sqlx::query(
            "INSERT INTO shard_connections \
                 (shard_id, host, port, database_name, username, password) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(params.shard_id)
        .bind(&params.host)
        .bind(params.port)
        .bind(&params.database_name)
        .bind(&params.username)
        .bind(&params.password)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn connection_update(&self, params: &ShardConnectionParams) -> MetadataResult<()> {
        let result = sqlx::query(
            "UPDATE shard_connections \
             SET host = $1, port = $2, database_name = $3, username = $4, password = $5, \
                 updated_at = now() \
             WHERE shard_id = $6",
        )
        .bind(&params.host)
        .bind(params.port)
        .bind(&params.database_name)
        .bind(&params.username)
        .bind(&params.password)
        .bind(params.shard_id)
        .execute(self.pool())
        .await?;
        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound);
        }
        Ok(())
    }

    async fn connection_remove(&self, shard_id: Uuid) -> MetadataResult<()> {
        sqlx::query("DELETE FROM shard_connections WHERE shard_id = $1")
            .bind(shard_id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    async fn connection_fetch(&self, shard_id: Uuid) -> MetadataResult<ShardConnection> {
        let row = sqlx::query(
            "SELECT shard_id, host, port, database_name, username, password, \
                    created_at, updated_at \
             FROM shard_connections WHERE shard_id = $1",
        )
        .bind(shard_id)
        .fetch_one(self.pool())
        .await
        .map_err(MetadataError::from_query)?;
        connection_from_row(&row)
    }
}
