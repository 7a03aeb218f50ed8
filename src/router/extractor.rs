//! Shard-key predicate extraction.
//!
//! Pulls the shard-key values out of a parsed statement. INSERT … VALUES
//! reads the constant at the shard-key column position of every row;
//! SELECT/UPDATE/DELETE walk the WHERE clause, accepting only
//! conjunctions of `shard_key = <constant>` comparisons.

use crate::sql::{CompareOp, Expr, InsertStatement, SqlValue, Statement};

use super::errors::{RoutingError, RoutingErrorKind};

/// Shape of the extracted predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateKind {
    Equals,
    In,
    /// Reserved; the current extractor never produces it.
    Range,
}

/// The shard-key constraint found in a statement.
#[derive(Debug, Clone)]
pub struct ExtractedPredicate {
    pub table: String,
    pub column: String,
    pub kind: PredicateKind,
    pub values: Vec<SqlValue>,
    pub range_start: Option<SqlValue>,
    pub range_end: Option<SqlValue>,
}

impl ExtractedPredicate {
    fn from_values(table: &str, column: &str, values: Vec<SqlValue>) -> Self {
        let kind = if values.len() > 1 {
            PredicateKind::In
        } else {
            PredicateKind::Equals
        };
        Self {
            table: table.to_string(),
            column: column.to_string(),
            kind,
            values,
            range_start: None,
            range_end: None,
        }
    }
}

/// Extract the shard-key predicate from one statement.
pub fn extract_shard_predicate(
    statement: &Statement,
    table: &str,
    shard_key: &str,
) -> Result<ExtractedPredicate, RoutingError> {
    match statement {
        Statement::Insert(insert) => extract_from_insert(insert, table, shard_key),
        Statement::Select(select) => extract_from_where(&select.where_clause, table, shard_key),
        Statement::Update(update) => extract_from_where(&update.where_clause, table, shard_key),
        Statement::Delete(delete) => extract_from_where(&delete.where_clause, table, shard_key),
        _ => Err(RoutingError::new(
            RoutingErrorKind::UnsupportedPredicate,
            "unsupported statement type",
        )),
    }
}

fn extract_from_insert(
    insert: &InsertStatement,
    table: &str,
    shard_key: &str,
) -> Result<ExtractedPredicate, RoutingError> {
    if insert.from_select {
        return Err(RoutingError::new(
            RoutingErrorKind::UnsupportedPredicate,
            "insert-select not supported",
        ));
    }

    let Some(column_index) = insert.columns.iter().position(|name| name == shard_key) else {
        return Err(RoutingError::new(
            RoutingErrorKind::ShardKeyNotInQuery,
            "shard key not present in insert columns",
        ));
    };

    let mut values = Vec::with_capacity(insert.rows.len());
    for row in &insert.rows {
        let Some(expr) = row.get(column_index) else {
            return Err(RoutingError::new(
                RoutingErrorKind::ShardKeyNotInQuery,
                "shard key value missing in values",
            ));
        };
        match expr {
            Expr::Literal(value) => values.push(value.clone()),
            _ => {
                return Err(RoutingError::new(
                    RoutingErrorKind::UnsupportedPredicate,
                    "non-constant shard key in insert",
                ));
            }
        }
    }

    Ok(ExtractedPredicate::from_values(table, shard_key, values))
}

fn extract_from_where(
    where_clause: &Option<Expr>,
    table: &str,
    shard_key: &str,
) -> Result<ExtractedPredicate, RoutingError> {
    let Some(expr) = where_clause else {
        return Err(RoutingError::new(
            RoutingErrorKind::ShardKeyNotInQuery,
            "missing where clause",
        ));
    };

    let values = walk_where(expr, shard_key)?;
    if values.is_empty() {
        return Err(RoutingError::new(
            RoutingErrorKind::ShardKeyNotInQuery,
            "shard key not constrained",
        ));
    }

    Ok(ExtractedPredicate::from_values(table, shard_key, values))
}

/// Collect shard-key values from a conjunction. Comparisons on other
/// columns contribute nothing; OR anywhere is a rejection.
fn walk_where(expr: &Expr, shard_key: &str) -> Result<Vec<SqlValue>, RoutingError> {
    match expr {
        Expr::And(left, right) => {
            let mut values = walk_where(left, shard_key)?;
            values.extend(walk_where(right, shard_key)?);
            Ok(values)
        }
        Expr::Or(_, _) => Err(RoutingError::new(
            RoutingErrorKind::UnsupportedPredicate,
            "OR predicates not supported",
        )),
        Expr::Compare { op, left, right } => extract_from_comparison(*op, left, right, shard_key),
        _ => Ok(Vec::new()),
    }
}

fn extract_from_comparison(
    op: CompareOp,
    left: &Expr,
    right: &Expr,
    shard_key: &str,
) -> Result<Vec<SqlValue>, RoutingError> {
    let Expr::Column(column) = left else {
        return Ok(Vec::new());
    };
    if column != shard_key {
        return Ok(Vec::new());
    }

    if op != CompareOp::Eq {
        return Err(RoutingError::new(
            RoutingErrorKind::UnsupportedPredicate,
            "unsupported operator on shard key",
        ));
    }

    match right {
        Expr::Literal(value) => Ok(vec![value.clone()]),
        _ => Err(RoutingError::new(
            RoutingErrorKind::UnsupportedPredicate,
            "non-constant shard key comparison",
        )),
    }
}
