//! The sqlx-backed shard handle.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::errors::RegistryError;
use super::store::BackendHandle;

/// One shard's backend pool. Long-lived; owned by the registry, which is
/// the only party that closes it.
pub struct ShardHandle {
    pool: PgPool,
}

impl ShardHandle {
    /// Open a pool against the shard. Fails fast when the backend is not
    /// reachable so initialization can skip the shard with a warning.
    pub async fn open(dsn: &str) -> Result<Self, RegistryError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect(dsn)
            .await
            .map_err(RegistryError::Open)?;
        Ok(Self { pool })
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BackendHandle for ShardHandle {
    async fn ping(&self) -> Result<(), RegistryError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|err| RegistryError::Unhealthy(err.to_string()))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
