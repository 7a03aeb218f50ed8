//! Statement execution against one shard backend.
//!
//! A single round trip serves both statement shapes: when the backend
//! returns a row set, the outcome is the rectangular rows with their
//! column names; otherwise it is the affected-row count. Row cells are
//! decoded into JSON values by column type, with a textual fallback for
//! types outside the common set.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{Column, Either, Executor as SqlxExecutor, Row, TypeInfo};
use thiserror::Error;

use crate::registry::ShardHandle;

/// Backend failure, reduced to its message for per-shard reporting.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct BackendError(pub String);

/// What one statement produced on one shard.
#[derive(Debug, Clone)]
pub enum ShardOutcome {
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
    Affected(u64),
}

/// Statement execution surface the executor needs from a handle.
#[async_trait]
pub trait SqlBackend: Send + Sync + 'static {
    async fn run(&self, sql: &str) -> Result<ShardOutcome, BackendError>;
}

#[async_trait]
impl SqlBackend for ShardHandle {
    async fn run(&self, sql: &str) -> Result<ShardOutcome, BackendError> {
        let mut stream = self.pool().fetch_many(sqlx::query(sql));

        let mut columns: Option<Vec<String>> = None;
        let mut rows: Vec<Vec<Value>> = Vec::new();
        let mut affected: u64 = 0;

        while let Some(item) = stream
            .try_next()
            .await
            .map_err(|err| BackendError(err.to_string()))?
        {
            match item {
                Either::Left(result) => affected += result.rows_affected(),
                Either::Right(row) => {
                    if columns.is_none() {
                        columns = Some(
                            row.columns()
                                .iter()
                                .map(|column| column.name().to_string())
                                .collect(),
                        );
                    }
                    rows.push(decode_row(&row));
                }
            }
        }

        match columns {
            Some(columns) => Ok(ShardOutcome::Rows { columns, rows }),
            None => Ok(ShardOutcome::Affected(affected)),
        }
    }
}

fn decode_row(row: &PgRow) -> Vec<Value> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(index, column)| decode_cell(row, index, column.type_info().name()))
        .collect()
}

fn decode_cell(row: &PgRow, index: usize, type_name: &str) -> Value {
    match type_name {
        "BOOL" => match row.try_get::<Option<bool>, _>(index) {
            Ok(Some(value)) => Value::Bool(value),
            _ => Value::Null,
        },
        "INT2" => int_cell(row.try_get::<Option<i16>, _>(index).map(|v| v.map(i64::from))),
        "INT4" => int_cell(row.try_get::<Option<i32>, _>(index).map(|v| v.map(i64::from))),
        "INT8" => int_cell(row.try_get::<Option<i64>, _>(index)),
        "FLOAT4" => float_cell(
            row.try_get::<Option<f32>, _>(index)
                .map(|v| v.map(f64::from)),
        ),
        "FLOAT8" => float_cell(row.try_get::<Option<f64>, _>(index)),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => text_cell(row.try_get(index)),
        "UUID" => match row.try_get::<Option<uuid::Uuid>, _>(index) {
            Ok(Some(value)) => Value::String(value.to_string()),
            _ => Value::Null,
        },
        "TIMESTAMPTZ" => match row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(index) {
            Ok(Some(value)) => Value::String(value.to_rfc3339()),
            _ => Value::Null,
        },
        "TIMESTAMP" => match row.try_get::<Option<chrono::NaiveDateTime>, _>(index) {
            Ok(Some(value)) => Value::String(value.to_string()),
            _ => Value::Null,
        },
        "DATE" => match row.try_get::<Option<chrono::NaiveDate>, _>(index) {
            Ok(Some(value)) => Value::String(value.to_string()),
            _ => Value::Null,
        },
        "JSON" | "JSONB" => match row.try_get::<Option<Value>, _>(index) {
            Ok(Some(value)) => value,
            _ => Value::Null,
        },
        _ => text_cell(row.try_get(index)),
    }
}

fn int_cell(value: Result<Option<i64>, sqlx::Error>) -> Value {
    match value {
        Ok(Some(value)) => Value::Number(value.into()),
        _ => Value::Null,
    }
}

fn float_cell(value: Result<Option<f64>, sqlx::Error>) -> Value {
    match value {
        Ok(Some(value)) => serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

fn text_cell(value: Result<Option<String>, sqlx::Error>) -> Value {
    match value {
        Ok(Some(value)) => Value::String(value),
        _ => Value::Null,
    }
}
