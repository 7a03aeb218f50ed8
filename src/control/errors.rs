//! Control-plane error types.
//!
//! Precondition failures carry symbolic codes so hosts can branch on
//! them without parsing messages.

use thiserror::Error;

use crate::metadata::MetadataError;
use crate::registry::RegistryError;
use crate::router::{RouterError, RoutingError};
use crate::schema::SchemaError;

/// Result type for control-plane operations
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors surfaced by the control-plane façade.
#[derive(Debug, Error)]
pub enum ControlError {
    // Preconditions
    #[error("cannot delete active shard")]
    CannotDeleteActiveShard,

    #[error("another project is already active")]
    AnotherProjectActive,

    #[error("all shards must be active")]
    ShardsNotActive,

    #[error("shard connection is not reachable")]
    ShardUnreachable,

    #[error("project must be inactive to modify schema")]
    ProjectActive,

    #[error("schema must be in draft state to commit")]
    SchemaNotDraft,

    #[error("another schema change is already in progress")]
    SchemaInFlight,

    #[error("destructive DDL is not allowed after initial schema")]
    DestructiveDdl,

    #[error("schema execution not allowed")]
    ExecutionNotAllowed,

    // Wrapped subsystem failures
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Router(#[from] RouterError),

    #[error(transparent)]
    Routing(#[from] RoutingError),
}

impl ControlError {
    /// Symbolic code for hosts.
    pub fn code(&self) -> &'static str {
        match self {
            ControlError::CannotDeleteActiveShard => "CANNOT_DELETE_ACTIVE_SHARD",
            ControlError::AnotherProjectActive => "ANOTHER_PROJECT_ACTIVE",
            ControlError::ShardsNotActive => "SHARDS_NOT_ACTIVE",
            ControlError::ShardUnreachable => "SHARD_UNREACHABLE",
            ControlError::ProjectActive => "PROJECT_ACTIVE",
            ControlError::SchemaNotDraft => "SCHEMA_NOT_DRAFT",
            ControlError::SchemaInFlight => "SCHEMA_IN_FLIGHT",
            ControlError::DestructiveDdl => "DESTRUCTIVE_DDL",
            ControlError::ExecutionNotAllowed => "EXECUTION_NOT_ALLOWED",
            ControlError::Schema(_) => "SCHEMA_ERROR",
            ControlError::Metadata(_) => "METADATA_ERROR",
            ControlError::Registry(_) => "CONNECTION_ERROR",
            ControlError::Router(_) => "ROUTER_ERROR",
            ControlError::Routing(_) => "ROUTING_REJECTED",
        }
    }
}
