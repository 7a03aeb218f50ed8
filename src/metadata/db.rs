//! Metadata database bootstrap.
//!
//! Connects to the metadata database, creating it through the maintenance
//! database when it does not exist yet, and applies the embedded schema.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::MetadataDbConfig;

use super::errors::MetadataResult;

/// Embedded bootstrap DDL.
const BOOTSTRAP_SCHEMA: &str = include_str!("schema.sql");

/// Open the metadata pool, creating the database on first run.
pub async fn connect(cfg: &MetadataDbConfig) -> MetadataResult<PgPool> {
    let pool = match PgPoolOptions::new()
        .min_connections(1)
        .max_connections(10)
        .connect(&cfg.dsn())
        .await
    {
        Ok(pool) => pool,
        // 3D000: the target database does not exist yet.
        Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("3D000") => {
            create_database(cfg).await?;
            PgPoolOptions::new()
                .min_connections(1)
                .max_connections(10)
                .connect(&cfg.dsn())
                .await?
        }
        Err(err) => return Err(err.into()),
    };

    apply_bootstrap_schema(&pool).await?;
    Ok(pool)
}

async fn create_database(cfg: &MetadataDbConfig) -> MetadataResult<()> {
    let admin = PgPoolOptions::new()
        .max_connections(1)
        .connect(&cfg.admin_dsn())
        .await?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&cfg.database)
            .fetch_one(&admin)
            .await?;

    if !exists {
        // Identifiers cannot be bound; the name comes from trusted config.
        sqlx::query(&format!("CREATE DATABASE \"{}\"", cfg.database))
            .execute(&admin)
            .await?;
    }

    admin.close().await;
    Ok(())
}

/// Apply the embedded bootstrap DDL statement by statement.
pub async fn apply_bootstrap_schema(pool: &PgPool) -> MetadataResult<()> {
    for statement in bootstrap_statements(BOOTSTRAP_SCHEMA) {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

fn bootstrap_statements(schema: &str) -> Vec<&str> {
    schema
        .split(';')
        .filter_map(|statement| {
            let trimmed = statement.trim();
            if trimmed.is_empty() {
                return None;
            }
            let has_sql = trimmed.lines().any(|line| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with("--")
            });
            has_sql.then_some(trimmed)
        })
        .collect()
}
