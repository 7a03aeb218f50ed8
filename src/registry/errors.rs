//! Registry error types.

use thiserror::Error;

/// Errors raised by the connection registry and its handles.
///
/// Messages deliberately omit DSNs; connection failures carry only the
/// driver's own description.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No handle stored under the (project, shard) key.
    #[error("no connection found for shard")]
    NotFound,

    /// Opening a backend connection failed.
    #[error("failed to open shard connection: {0}")]
    Open(#[source] sqlx::Error),

    /// A health probe against the handle failed.
    #[error("shard health probe failed: {0}")]
    Unhealthy(String),

    /// The metadata rows needed to build the handle could not be read.
    #[error(transparent)]
    Metadata(#[from] crate::metadata::MetadataError),
}
