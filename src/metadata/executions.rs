//! Schema execution records, one per (schema, shard) during rollout.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use super::errors::{MetadataError, MetadataResult};
use super::models::{ExecutionState, SchemaExecution};
use super::PgMetadata;

/// Persistent operations on execution records.
#[async_trait]
pub trait SchemaExecutionStore: Send + Sync {
    /// Insert a record in `pending` for the pair.
    async fn execution_create(&self, schema_id: Uuid, shard_id: Uuid) -> MetadataResult<()>;
    /// Set state and error message, stamping `executed_at`.
    async fn execution_update_state(
        &self,
        schema_id: Uuid,
        shard_id: Uuid,
        state: ExecutionState,
        error: Option<&str>,
    ) -> MetadataResult<()>;
    /// Back to `pending`, clearing error and `executed_at`.
    async fn execution_reset(&self, schema_id: Uuid, shard_id: Uuid) -> MetadataResult<()>;
    async fn execution_fetch_all(&self, schema_id: Uuid) -> MetadataResult<Vec<SchemaExecution>>;
    async fn execution_fetch_failed(
        &self,
        schema_id: Uuid,
    ) -> MetadataResult<Vec<SchemaExecution>>;
    /// True when every record of the schema is `applied`.
    async fn execution_all_applied(&self, schema_id: Uuid) -> MetadataResult<bool>;
}

fn execution_from_row(row: &PgRow) -> MetadataResult<SchemaExecution> {
    Ok(SchemaExecution {
        id: row.try_get("id")?,
        schema_id: row.try_get("schema_id")?,
        shard_id: row.try_get("shard_id")?,
        state: ExecutionState::parse(&row.try_get::<String, _>("state")?)?,
        error_message: row.try_get("error_message")?,
        executed_at: row.try_get("executed_at")?,
    })
}

#[async_trait]
impl SchemaExecutionStore for PgMetadata {
    async fn execution_create(&self, schema_id: Uuid, shard_id: Uuid) -> MetadataResult<()> {
        sqlx::query(
            "INSERT INTO schema_execution_status (id, schema_id, shard_id, state) \
             VALUES ($1, $2, $3, 'pending') \
             ON CONFLICT (schema_id, shard_id) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(schema_id)
        .bind(shard_id)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn execution_update_state(
        &self,
        schema_id: Uuid,
        shard_id: Uuid,
        state: ExecutionState,
        error: Option<&str>,
    ) -> MetadataResult<()> {
        let result = sqlx::query(
            "UPDATE schema_execution_status \
             SET state = $1, error_message = $2, executed_at = now() \
             WHERE schema_id = $3 AND shard_id = $4",
        )
        .bind(state.as_str())
        .bind(error)
        .bind(schema_id)
        .bind(shard_id)
        .execute(self.pool())
        .await?;
        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound);
        }
        Ok(())
    }

    async fn execution_reset(&self, schema_id: Uuid, shard_id: Uuid) -> MetadataResult<()> {
        let result = sqlx::query(
            "UPDATE schema_execution_status \
             SET state = 'pending', error_message = NULL, executed_at = NULL \
             WHERE schema_id = $1 AND shard_id = $2",
        )
        .bind(schema_id)
        .bind(shard_id)
        .execute(self.pool())
        .await?;
        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound);
        }
        Ok(())
    }

    async fn execution_fetch_all(&self, schema_id: Uuid) -> MetadataResult<Vec<SchemaExecution>> {
        let rows = sqlx::query(
            "SELECT id, schema_id, shard_id, state, error_message, executed_at \
             FROM schema_execution_status WHERE schema_id = $1",
        )
        .bind(schema_id)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(execution_from_row).collect()
    }

    async fn execution_fetch_failed(
        &self,
        schema_id: Uuid,
    ) -> MetadataResult<Vec<SchemaExecution>> {
        let rows = sqlx::query(
            "SELECT id, schema_id, shard_id, state, error_message, executed_at \
             FROM schema_execution_status WHERE schema_id = $1 AND state = 'failed'",
        )
        .bind(schema_id)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(execution_from_row).collect()
    }

    async fn execution_all_applied(&self, schema_id: Uuid) -> MetadataResult<bool> {
        let remaining: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM schema_execution_status \
             WHERE schema_id = $1 AND state != 'applied'",
        )
        .bind(schema_id)
        .fetch_one(self.pool())
        .await?;
        Ok(remaining == 0)
    }
}
