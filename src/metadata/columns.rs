//! Flattened logical-schema columns. Rewritten wholesale on every
//! committed schema.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use super::errors::MetadataResult;
use super::models::ColumnRecord;
use super::PgMetadata;

/// Persistent operations on column rows.
#[async_trait]
pub trait ColumnStore: Send + Sync {
    async fn columns_fetch(&self, project_id: Uuid) -> MetadataResult<Vec<ColumnRecord>>;
    /// Delete-then-insert for the project, one transaction.
    async fn columns_replace(
        &self,
        project_id: Uuid,
        records: &[ColumnRecord],
    ) -> MetadataResult<()>;
}

fn column_from_row(row: &PgRow) -> MetadataResult<ColumnRecord> {
    Ok(ColumnRecord {
        project_id: row.try_get("project_id")?,
        table_name: row.try_get("table_name")?,
        column_name: row.try_get("column_name")?,
        data_type: row.try_get("data_type")?,
        nullable: row.try_get("nullable")?,
        is_primary_key: row.try_get("is_primary_key")?,
    })
}

#[async_trait]
impl ColumnStore for PgMetadata {
    async fn columns_fetch(&self, project_id: Uuid) -> MetadataResult<Vec<ColumnRecord>> {
        let rows = sqlx::query(
            "SELECT project_id, table_name, column_name, data_type, nullable, is_primary_key \
             FROM columns WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(column_from_row).collect()
    }

    async fn columns_replace(
        &self,
        project_id: Uuid,
        records: &[ColumnRecord],
    ) -> MetadataResult<()> {
        let mut tx = self.pool().begin().await?;

        sqlx::query("DELETE FROM columns WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;

        for record in records {
            sqlx::query(
                "INSERT INTO columns \
                     (project_id, table_name, column_name, data_type, nullable, is_primary_key) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(project_id)
            .bind(&record.table_name)
            .bind(&record.column_name)
            .bind(&record.data_type)
            .bind(record.nullable)
            .bind(record.is_primary_key)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
