//! Project schema rows.
//!
//! Versions are monotone within a project (max + 1 on draft create).
//! `applied_at` is stamped when a schema reaches `applied`; `committed_at`
//! when a draft is committed.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use super::errors::{MetadataError, MetadataResult};
use super::models::{ProjectSchema, SchemaState};
use super::PgMetadata;

const SCHEMA_COLUMNS: &str = "id, project_id, version, state, ddl_sql, error_message, \
     created_at, committed_at, applied_at";

/// Persistent operations on schema versions.
#[async_trait]
pub trait ProjectSchemaStore: Send + Sync {
    async fn schema_create_draft(
        &self,
        project_id: Uuid,
        ddl_sql: &str,
    ) -> MetadataResult<ProjectSchema>;
    /// draft → pending, stamping `committed_at`.
    async fn schema_commit_draft(&self, schema_id: Uuid) -> MetadataResult<()>;
    async fn schema_set_applying(&self, schema_id: Uuid) -> MetadataResult<()>;
    /// Set state and error message; stamps `applied_at` on `applied`.
    async fn schema_update_state(
        &self,
        schema_id: Uuid,
        state: SchemaState,
        error: Option<&str>,
    ) -> MetadataResult<()>;
    /// Highest-version schema of the project, if any.
    async fn schema_get_latest(&self, project_id: Uuid) -> MetadataResult<Option<ProjectSchema>>;
    async fn schema_fetch(&self, schema_id: Uuid) -> MetadataResult<ProjectSchema>;
    async fn schema_get_state(&self, schema_id: Uuid) -> MetadataResult<SchemaState>;
    /// Deletes only rows still in `draft`.
    async fn schema_delete_draft(&self, schema_id: Uuid) -> MetadataResult<()>;
    /// Latest `pending` schema of the project.
    async fn schema_get_pending(&self, project_id: Uuid) -> MetadataResult<ProjectSchema>;
    async fn schema_history(&self, project_id: Uuid) -> MetadataResult<Vec<ProjectSchema>>;
    async fn schema_latest_applied(
        &self,
        project_id: Uuid,
    ) -> MetadataResult<Option<ProjectSchema>>;
}

fn schema_from_row(row: &PgRow) -> MetadataResult<ProjectSchema> {
    Ok(ProjectSchema {
        id: row.try_get("id")?,
        project_id: row.try_get("project_id")?,
        version: row.try_get("version")?,
        state: SchemaState::parse(&row.try_get::<String, _>("state")?)?,
        ddl_sql: row.try_get("ddl_sql")?,
        error_message: row.try_get("error_message")?,
        created_at: row.try_get("created_at")?,
        committed_at: row.try_get("committed_at")?,
        applied_at: row.try_get("applied_at")?,
    })
}

#[async_trait]
impl ProjectSchemaStore for PgMetadata {
    async fn schema_create_draft(
        &self,
        project_id: Uuid,
        ddl_sql: &str,
    ) -> MetadataResult<ProjectSchema> {
        let query = format!(
            "INSERT INTO project_schemas (id, project_id, version, state, ddl_sql) \
             VALUES ($1, $2, \
                 COALESCE((SELECT MAX(version) FROM project_schemas WHERE project_id = $2), 0) + 1, \
                 'draft', $3) \
             RETURNING {SCHEMA_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(project_id)
            .bind(ddl_sql)
            .fetch_one(self.pool())
            .await?;
        schema_from_row(&row)
    }

    async fn schema_commit_draft(&self, schema_id: Uuid) -> MetadataResult<()> {
        let result = sqlx::query(
            "UPDATE project_schemas SET state = 'pending', committed_at = now() WHERE id = $1",
        )
        .bind(schema_id)
        .execute(self.pool())
        .await?;
        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound);
        }
        Ok(())
    }

    async fn schema_set_applying(&self, schema_id: Uuid) -> MetadataResult<()> {
        self.schema_update_state(schema_id, SchemaState::Applying, None)
            .await
    }

    async fn schema_update_state(
        &self,
        schema_id: Uuid,
        state: SchemaState,
        error: Option<&str>,
    ) -> MetadataResult<()> {
        let result = sqlx::query(
            "UPDATE project_schemas \
             SET state = $1, error_message = $2, \
                 applied_at = CASE WHEN $1 = 'applied' THEN now() ELSE applied_at END \
             WHERE id = $3",
        )
        .bind(state.as_str())
        .bind(error)
        .bind(schema_id)
        .execute(self.pool())
        .await?;
        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound);
        }
        Ok(())
    }

    async fn schema_get_latest(&self, project_id: Uuid) -> MetadataResult<Option<ProjectSchema>> {
        let query = format!(
            "SELECT {SCHEMA_COLUMNS} FROM project_schemas \
             WHERE project_id = $1 ORDER BY version DESC LIMIT 1"
        );
        let row = sqlx::query(&query)
            .bind(project_id)
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(schema_from_row).transpose()
    }

    async fn schema_fetch(&self, schema_id: Uuid) -> MetadataResult<ProjectSchema> {
        let query = format!("SELECT {SCHEMA_COLUMNS} FROM project_schemas WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(schema_id)
            .fetch_one(self.pool())
            .await
            .map_err(MetadataError::from_query)?;
        schema_from_row(&row)
    }

    async fn schema_get_state(&self, schema_id: Uuid) -> MetadataResult<SchemaState> {
        let state: String = sqlx::query_scalar("SELECT state FROM project_schemas WHERE id = $1")
            .bind(schema_id)
            .fetch_one(self.pool())
            .await
            .map_err(MetadataError::from_query)?;
        SchemaState::parse(&state)
    }

    async fn schema_delete_draft(&self, schema_id: Uuid) -> MetadataResult<()> {
        let result =
            sqlx::query("DELETE FROM project_schemas WHERE id = $1 AND state = 'draft'")
                .bind(schema_id)
                .execute(self.pool())
                .await?;
        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound);
        }
        Ok(())
    }

    async fn schema_get_pending(&self, project_id: Uuid) -> MetadataResult<ProjectSchema> {
        let query = format!(
            "SELECT {SCHEMA_COLUMNS} FROM project_schemas \
             WHERE project_id = $1 AND state = 'pending' \
             ORDER BY version DESC LIMIT 1"
        );
        let row = sqlx::query(&query)
            .bind(project_id)
            .fetch_one(self.pool())
            .await
            .map_err(MetadataError::from_query)?;
        schema_from_row(&row)
    }

    async fn schema_history(&self, project_id: Uuid) -> MetadataResult<Vec<ProjectSchema>> {
        let query = format!(
            "SELECT {SCHEMA_COLUMNS} FROM project_schemas \
             WHERE project_id = $1 ORDER BY version ASC"
        );
        let rows = sqlx::query(&query)
            .bind(project_id)
            .fetch_all(self.pool())
            .await?;
        rows.iter().map(schema_from_row).collect()
    }

    async fn schema_latest_applied(
        &self,
        project_id: Uuid,
    ) -> MetadataResult<Option<ProjectSchema>> {
        let query = format!(
            "SELECT {SCHEMA_COLUMNS} FROM project_schemas \
             WHERE project_id = $1 AND state = 'applied' \
             ORDER BY version DESC LIMIT 1"
        );
        let row = sqlx::query(&query)
            .bind(project_id)
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(schema_from_row).transpose()
    }
}
