//! Candidate ranking.
//!
//! Additive scoring over fanout, ownership, root affinity, identity, and
//! content signals. Reasons accumulate as human-readable strings so a
//! decision can always be explained back to the operator.

use std::collections::BTreeMap;

use crate::schema::{Column, LogicalSchema, Table};

use super::types::{ColumnRef, FanoutStats, RankedCandidate};

/// Rank the candidates of a single table, best first. Ties break
/// lexicographically by (table, column), so the order is total.
pub fn rank_table_candidates(
    table_name: &str,
    local: &[ColumnRef],
    fanout: &BTreeMap<ColumnRef, FanoutStats>,
    schema: &LogicalSchema,
) -> Vec<RankedCandidate> {
    let Some(table) = schema.tables.get(table_name) else {
        return Vec::new();
    };

    let mut ranked: Vec<RankedCandidate> = local
        .iter()
        .filter_map(|column_ref| {
            let column = table.columns.get(&column_ref.column)?;
            let stats = fanout.get(column_ref).copied().unwrap_or_default();
            let (score, reasons) = score_column(column_ref, column, stats, table, fanout);
            Some(RankedCandidate {
                column: column_ref.clone(),
                score,
                reasons,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| (&a.column.table, &a.column.column).cmp(&(&b.column.table, &b.column.column)))
    });

    ranked
}

fn score_column(
    column_ref: &ColumnRef,
    column: &Column,
    stats: FanoutStats,
    table: &Table,
    fanout: &BTreeMap<ColumnRef, FanoutStats>,
) -> (i32, Vec<String>) {
    let mut score = 0;
    let mut reasons = Vec::new();

    if stats.incoming_fks > 0 {
        score += stats.incoming_fks as i32 * 10;
        reasons.push(format!("referenced by {} foreign keys", stats.incoming_fks));
    }

    if stats.referencing_tables > 0 {
        score += stats.referencing_tables as i32 * 5;
        reasons.push(format!("shared across {} tables", stats.referencing_tables));
    }

    if is_foreign_key(&column_ref.column, table) {
        score += 20;
        reasons.push("foreign key (ownership column)".to_string());

        if let Some((bonus, reason)) = root_affinity_bonus(&column_ref.column, table, fanout) {
            score += bonus;
            reasons.push(reason);
        }
    }

    if column.is_primary_key {
        score += 10;
        reasons.push("primary key (identity column)".to_string());
    }

    if is_textual(column) {
        score -= 15;
        reasons.push("textual/content column".to_string());
    }

    score += 1;
    reasons.push("local column".to_string());

    (score, reasons)
}

/// Prefer FKs that point at root tables — parents that are themselves
/// heavily referenced.
fn root_affinity_bonus(
    column_name: &str,
    table: &Table,
    fanout: &BTreeMap<ColumnRef, FanoutStats>,
) -> Option<(i32, String)> {
    for fk in table.fks.values() {
        if fk.child_column != column_name {
            continue;
        }

        let parent = ColumnRef {
            table: fk.parent_table.clone(),
            column: fk.parent_column.clone(),
        };
        let stats = fanout.get(&parent)?;

        if stats.incoming_fks > 0 {
            let bonus = stats.incoming_fks as i32 * 5;
            return Some((
                bonus,
                format!(
                    "points to root table ({} incoming references)",
                    stats.incoming_fks
                ),
            ));
        }
    }

    None
}

fn is_foreign_key(column_name: &str, table: &Table) -> bool {
    table.fks.values().any(|fk| fk.child_column == column_name)
}

fn is_textual(column: &Column) -> bool {
    matches!(
        column.data_type.to_lowercase().as_str(),
        "text" | "varchar" | "char" | "character varying"
    )
}
