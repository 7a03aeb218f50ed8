//! Metadata store.
//!
//! Persistent row operations for projects, shards, connections, schema
//! versions, execution records, the flattened logical schema, and chosen
//! shard keys. Each entity gets its own trait so the engines above can be
//! exercised against in-memory doubles; `PgMetadata` is the PostgreSQL
//! implementation used in production. Every operation is a single
//! statement or a single transaction, so write-then-read sequences always
//! see their own writes.

mod columns;
mod connections;
mod db;
mod errors;
mod executions;
mod fk_edges;
mod models;
mod projects;
mod schemas;
mod shard_keys;
mod shards;

pub use columns::ColumnStore;
pub use connections::{ShardConnectionParams, ShardConnectionStore};
pub use db::{apply_bootstrap_schema, connect};
pub use errors::{MetadataError, MetadataResult};
pub use executions::SchemaExecutionStore;
pub use fk_edges::FkEdgeStore;
pub use models::{
    ColumnRecord, ExecutionState, FkEdgeRecord, Project, ProjectSchema, ProjectStatus,
    SchemaExecution, SchemaState, Shard, ShardConnection, ShardKey, ShardKeyRecord, ShardStatus,
};
pub use projects::ProjectStore;
pub use schemas::ProjectSchemaStore;
pub use shard_keys::ShardKeyStore;
pub use shards::ShardStore;

use sqlx::PgPool;

/// Union of all store traits; the control plane holds one of these.
pub trait MetadataStore:
    ProjectStore
    + ShardStore
    + ShardConnectionStore
    + ProjectSchemaStore
    + SchemaExecutionStore
    + ColumnStore
    + FkEdgeStore
    + ShardKeyStore
{
}

impl<T> MetadataStore for T where
    T: ProjectStore
        + ShardStore
        + ShardConnectionStore
        + ProjectSchemaStore
        + SchemaExecutionStore
        + ColumnStore
        + FkEdgeStore
        + ShardKeyStore
{
}

/// PostgreSQL-backed metadata store.
#[derive(Clone)]
pub struct PgMetadata {
    pool: PgPool,
}

impl PgMetadata {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }
}
