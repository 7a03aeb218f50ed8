//! Schema engine error types.

use thiserror::Error;
use uuid::Uuid;

use crate::metadata::MetadataError;
use crate::sql::ParseError;

/// Errors raised while building, validating, or rolling out schemas.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The DDL text failed to parse.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Destructive DDL after the first committed schema.
    #[error("destructive DDL is not allowed after initial schema")]
    DestructiveDdl,

    /// Retry was requested but the latest schema is not `failed`.
    #[error("schema is not in failed state")]
    NotFailed,

    /// Rollout hit a shard that is not active.
    #[error("shard inactive")]
    ShardInactive { shard_id: Uuid },

    /// The backend rejected the DDL on a shard.
    #[error("ddl execution failed on shard: {message}")]
    ShardDdl { shard_id: Uuid, message: String },

    /// Metadata store failure.
    #[error(transparent)]
    Store(#[from] MetadataError),
}
