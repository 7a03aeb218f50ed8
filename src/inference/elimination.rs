//! Hard elimination.
//!
//! This stage removes only fundamentally invalid shard keys: nullable
//! columns, technical metadata columns, and low-cardinality columns.
//! Everything judgement-based belongs to ranking.

use crate::schema::{Column, LogicalSchema};

use super::types::{CandidateSet, ColumnRef};

/// Collect per-table candidate sets. Tables whose every column is
/// eliminated produce no entry.
pub fn extract_candidates(schema: &LogicalSchema) -> CandidateSet {
    let mut candidates = CandidateSet::new();

    for (table_name, table) in &schema.tables {
        let mut local = Vec::new();

        for column in table.columns.values() {
            if elimination_reason(column).is_some() {
                continue;
            }
            local.push(ColumnRef {
                table: table_name.clone(),
                column: column.name.clone(),
            });
        }

        if !local.is_empty() {
            candidates.insert(table_name.clone(), local);
        }
    }

    candidates
}

/// Why a column cannot be a shard key, if it cannot.
pub fn elimination_reason(column: &Column) -> Option<&'static str> {
    if column.nullable {
        return Some("column is nullable");
    }
    if is_technical(column) {
        return Some("technical metadata column");
    }
    if is_low_cardinality(column) {
        return Some("low cardinality column");
    }
    None
}

fn is_technical(column: &Column) -> bool {
    matches!(
        column.name.to_lowercase().as_str(),
        "created_at" | "updated_at" | "deleted_at" | "version"
    )
}

fn is_low_cardinality(column: &Column) -> bool {
    if matches!(column.data_type.to_lowercase().as_str(), "bool" | "boolean") {
        return true;
    }

    let name = column.name.to_lowercase();
    name.starts_with("is_") || name.contains("flag") || name.contains("status")
}
