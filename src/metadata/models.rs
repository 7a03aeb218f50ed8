//! Row models for the metadata database.
//!
//! Statuses and lifecycle states are stored as text and decoded into
//! enums at the boundary; an unrecognized value is a hard error, never a
//! silent default.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::MetadataError;

/// Project status. At most one project is active process-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Inactive,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Inactive => "inactive",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, MetadataError> {
        match raw {
            "active" => Ok(ProjectStatus::Active),
            "inactive" => Ok(ProjectStatus::Inactive),
            other => Err(MetadataError::InvalidValue {
                field: "project status",
                value: other.to_string(),
            }),
        }
    }
}

/// Shard status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShardStatus {
    Active,
    Inactive,
}

impl ShardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShardStatus::Active => "active",
            ShardStatus::Inactive => "inactive",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, MetadataError> {
        match raw {
            "active" => Ok(ShardStatus::Active),
            "inactive" => Ok(ShardStatus::Inactive),
            other => Err(MetadataError::InvalidValue {
                field: "shard status",
                value: other.to_string(),
            }),
        }
    }
}

/// Lifecycle state of a schema version.
///
/// draft → pending → applying → applied | failed, with failed → pending
/// allowed only through retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaState {
    Draft,
    Pending,
    Applying,
    Applied,
    Failed,
}

impl SchemaState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaState::Draft => "draft",
            SchemaState::Pending => "pending",
            SchemaState::Applying => "applying",
            SchemaState::Applied => "applied",
            SchemaState::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, MetadataError> {
        match raw {
            "draft" => Ok(SchemaState::Draft),
            "pending" => Ok(SchemaState::Pending),
            "applying" => Ok(SchemaState::Applying),
            "applied" => Ok(SchemaState::Applied),
            "failed" => Ok(SchemaState::Failed),
            other => Err(MetadataError::InvalidValue {
                field: "schema state",
                value: other.to_string(),
            }),
        }
    }

    /// A schema in one of these states blocks further commits for its
    /// project.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SchemaState::Pending | SchemaState::Applying)
    }
}

/// State of one (schema, shard) execution record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionState {
    Pending,
    Applied,
    Failed,
}

impl ExecutionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionState::Pending => "pending",
            ExecutionState::Applied => "applied",
            ExecutionState::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, MetadataError> {
        match raw {
            "pending" => Ok(ExecutionState::Pending),
            "applied" => Ok(ExecutionState::Applied),
            "failed" => Ok(ExecutionState::Failed),
            other => Err(MetadataError::InvalidValue {
                field: "execution state",
                value: other.to_string(),
            }),
        }
    }
}

/// A tenancy unit. `shard_count` is derived from the shards table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub shard_count: i64,
    pub created_at: DateTime<Utc>,
}

/// One backing database inside a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shard {
    pub id: Uuid,
    pub project_id: Uuid,
    pub shard_index: i32,
    pub status: ShardStatus,
    pub created_at: DateTime<Utc>,
}

/// DSN components for reaching a shard. One row per shard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardConnection {
    pub shard_id: Uuid,
    pub host: String,
    pub port: i32,
    pub database_name: String,
    pub username: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A DDL version of a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSchema {
    pub id: Uuid,
    pub project_id: Uuid,
    pub version: i32,
    pub state: SchemaState,
    pub ddl_sql: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub committed_at: Option<DateTime<Utc>>,
    pub applied_at: Option<DateTime<Utc>>,
}

/// One row per (schema, shard) during rollout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaExecution {
    pub id: Uuid,
    pub schema_id: Uuid,
    pub shard_id: Uuid,
    pub state: ExecutionState,
    pub error_message: Option<String>,
    pub executed_at: Option<DateTime<Utc>>,
}

/// Flattened logical-schema column, keyed by (project, table, column).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRecord {
    pub project_id: Uuid,
    pub table_name: String,
    pub column_name: String,
    pub data_type: String,
    pub nullable: bool,
    pub is_primary_key: bool,
}

/// Flattened foreign-key edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FkEdgeRecord {
    pub project_id: Uuid,
    pub child_table: String,
    pub child_column: String,
    pub parent_table: String,
    pub parent_column: String,
}

/// Chosen shard key for one table (read model).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardKey {
    pub project_id: Uuid,
    pub table_name: String,
    pub shard_key_column: String,
    pub is_manual_override: bool,
    pub updated_at: DateTime<Utc>,
}

/// Write-only DTO for shard-key replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardKeyRecord {
    pub table_name: String,
    pub shard_key_column: String,
    pub is_manual: bool,
}
