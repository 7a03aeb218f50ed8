//! Flattened foreign-key edges. Rewritten wholesale on every committed
//! schema.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use super::errors::MetadataResult;
use super::models::FkEdgeRecord;
use super::PgMetadata;

/// Persistent operations on foreign-key edge rows.
#[async_trait]
pub trait FkEdgeStore: Send + Sync {
    async fn fk_edges_fetch(&self, project_id: Uuid) -> MetadataResult<Vec<FkEdgeRecord>>;
    /// Delete-then-insert for the project, one transaction.
    async fn fk_edges_replace(
        &self,
        project_id: Uuid,
        records: &[FkEdgeRecord],
    ) -> MetadataResult<()>;
}

fn edge_from_row(row: &PgRow) -> MetadataResult<FkEdgeRecord> {
    Ok(FkEdgeRecord {
        project_id: row.try_get("project_id")?,
        child_table: row.try_get("child_table")?,
        child_column: row.try_get("child_column")?,
        parent_table: row.try_get("parent_table")?,
        parent_column: row.try_get("parent_column")?,
    })
}

#[async_trait]
impl FkEdgeStore for PgMetadata {
    async fn fk_edges_fetch(&self, project_id: Uuid) -> MetadataResult<Vec<FkEdgeRecord>> {
        let rows = sqlx::query(
            "SELECT project_id, child_table, child_column, parent_table, parent_column \
             FROM fk_edges WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(edge_from_row).collect()
    }

    async fn fk_edges_replace(
        &self,
        project_id: Uuid,
        records: &[FkEdgeRecord],
    ) -> MetadataResult<()> {
        let mut tx = self.pool().begin().await?;

        sqlx::query("DELETE FROM fk_edges WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;

        for record in records {
            sqlx::query(
                "INSERT INTO fk_edges \
                     (project_id, child_table, child_column, parent_table, parent_column) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(project_id)
            .bind(&record.child_table)
            .bind(&record.child_column)
            .bind(&record.parent_table)
            .bind(&record.parent_column)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
