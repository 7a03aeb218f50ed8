//! Per-shard execution results.

use serde::Serialize;
use uuid::Uuid;

/// Outcome of one statement on one shard. Exactly one of the payload
/// groups is set: columns+rows for query-style results, rows_affected
/// for DML, error when the shard could not be used.
#[derive(Debug, Clone, Serialize)]
pub struct ShardResult {
    pub shard_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Vec<serde_json::Value>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_affected: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ShardResult {
    pub fn rows(shard_id: Uuid, columns: Vec<String>, rows: Vec<Vec<serde_json::Value>>) -> Self {
        Self {
            shard_id,
            columns: Some(columns),
            rows: Some(rows),
            rows_affected: None,
            error: None,
        }
    }

    pub fn affected(shard_id: Uuid, count: u64) -> Self {
        Self {
            shard_id,
            columns: None,
            rows: None,
            rows_affected: Some(count),
            error: None,
        }
    }

    pub fn error(shard_id: Uuid, message: String) -> Self {
        Self {
            shard_id,
            columns: None,
            rows: None,
            rows_affected: None,
            error: Some(message),
        }
    }
}
