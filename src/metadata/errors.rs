//! Metadata store error types.

use thiserror::Error;

/// Result type for metadata operations
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Errors raised by the metadata store.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The addressed row does not exist.
    #[error("row not found")]
    NotFound,

    /// Deleting a shard that is still active is refused at the row level.
    #[error("cannot delete an active shard")]
    ShardActive,

    /// A stored value could not be decoded into its domain type.
    #[error("invalid {field} value: {value}")]
    InvalidValue { field: &'static str, value: String },

    /// Underlying database failure.
    #[error("metadata database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl MetadataError {
    /// Collapse sqlx's row-not-found into the domain variant so callers
    /// can match on one shape.
    pub fn from_query(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => MetadataError::NotFound,
            other => MetadataError::Database(other),
        }
    }

    /// True when the error is the absence of a row.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MetadataError::NotFound)
    }
}
