//! Project rows.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use super::errors::{MetadataError, MetadataResult};
use super::models::{Project, ProjectStatus};
use super::PgMetadata;

const PROJECT_COLUMNS: &str = "p.id, p.name, p.description, p.status, p.created_at, \
     (SELECT COUNT(*) FROM shards s WHERE s.project_id = p.id) AS shard_count";

/// Persistent operations on projects.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn project_add(&self, name: &str, description: &str) -> MetadataResult<Project>;
    async fn project_list(&self) -> MetadataResult<Vec<Project>>;
    async fn project_fetch(&self, id: Uuid) -> MetadataResult<Project>;
    async fn project_remove(&self, id: Uuid) -> MetadataResult<()>;
    async fn project_activate(&self, id: Uuid) -> MetadataResult<()>;
    async fn project_deactivate(&self, id: Uuid) -> MetadataResult<()>;
    async fn project_fetch_status(&self, id: Uuid) -> MetadataResult<ProjectStatus>;
    /// At most one project is active; absent when none is.
    async fn project_fetch_active(&self) -> MetadataResult<Option<Uuid>>;
}

fn project_from_row(row: &PgRow) -> MetadataResult<Project> {
    Ok(Project {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        status: ProjectStatus::parse(&row.try_get::<String, _>("status")?)?,
        shard_count: row.try_get("shard_count")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl ProjectStore for PgMetadata {
    async fn project_add(&self, name: &str, description: &str) -> MetadataResult<Project> {
        let id = Uuid::new_v4();
        let query = format!(
            "INSERT INTO projects AS p (id, name, description, status) \
             VALUES ($1, $2, $3, 'inactive') \
             RETURNING {PROJECT_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(name)
            .bind(description)
            .fetch_one(self.pool())
            .await?;
        project_from_row(&row)
    }

    async fn project_list(&self) -> MetadataResult<Vec<Project>> {
        let query = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects p ORDER BY p.created_at DESC"
        );
        let rows = sqlx::query(&query).fetch_all(self.pool()).await?;
        rows.iter().map(project_from_row).collect()
    }

    async fn project_fetch(&self, id: Uuid) -> MetadataResult<Project> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects p WHERE p.id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_one(self.pool())
            .await
            .map_err(MetadataError::from_query)?;
        project_from_row(&row)
    }

    async fn project_remove(&self, id: Uuid) -> MetadataResult<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound);
        }
        Ok(())
    }

    async fn project_activate(&self, id: Uuid) -> MetadataResult<()> {
        let result = sqlx::query("UPDATE projects SET status = 'active' WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound);
        }
        Ok(())
    }

    async fn project_deactivate(&self, id: Uuid) -> MetadataResult<()> {
        let result = sqlx::query("UPDATE projects SET status = 'inactive' WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound);
        }
        Ok(())
    }

    async fn project_fetch_status(&self, id: Uuid) -> MetadataResult<ProjectStatus> {
        let status: String = sqlx::query_scalar("SELECT status FROM projects WHERE id = $1")
            .bind(id)
            .fetch_one(self.pool())
            .await
            .map_err(MetadataError::from_query)?;
        ProjectStatus::parse(&status)
    }

    async fn project_fetch_active(&self) -> MetadataResult<Option<Uuid>> {
        let id: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM projects WHERE status = 'active' LIMIT 1")
                .fetch_optional(self.pool())
                .await?;
        Ok(id)
    }
}
