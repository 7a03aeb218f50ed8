//! Inference pipeline types.

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

/// Identifies a column uniquely across the schema.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

/// Hard-elimination output: table name → surviving candidate columns.
pub type CandidateSet = BTreeMap<String, Vec<ColumnRef>>;

/// Incoming-reference statistics for one candidate column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutStats {
    /// Number of FK edges whose parent side is this column.
    pub incoming_fks: u32,
    /// Distinct child tables among those edges.
    pub referencing_tables: u32,
}

/// A scored candidate for one table.
#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    pub column: ColumnRef,
    pub score: i32,
    pub reasons: Vec<String>,
}

/// The chosen shard key for one table.
#[derive(Debug, Clone, Serialize)]
pub struct ShardKeyDecision {
    pub table: String,
    pub column: ColumnRef,
    pub score: i32,
    pub reasons: Vec<String>,
}

/// Whole-project inference output.
#[derive(Debug, Clone, Serialize)]
pub struct InferenceResult {
    pub project_id: Uuid,
    pub decisions: Vec<ShardKeyDecision>,
}
