//! The logical schema IR.
//!
//! A plain table-keyed mapping with value-typed FK records keyed by
//! (child_column, parent_table, parent_column); no back-pointers, so
//! mutually referencing tables cannot form a reference cycle. BTreeMaps
//! keep every walk over the schema deterministic.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::metadata::{ColumnRecord, FkEdgeRecord};

/// One column of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub is_primary_key: bool,
}

/// Identifies a foreign key inside its child table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FkKey {
    pub child_column: String,
    pub parent_table: String,
    pub parent_column: String,
}

/// A foreign-key relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fk {
    pub child_table: String,
    pub child_column: String,
    pub parent_table: String,
    pub parent_column: String,
}

/// All columns and outgoing foreign keys of one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: BTreeMap<String, Column>,
    pub fks: BTreeMap<FkKey, Fk>,
}

/// Every table of a project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogicalSchema {
    pub project_id: Uuid,
    pub tables: BTreeMap<String, Table>,
}

impl LogicalSchema {
    pub fn new(project_id: Uuid) -> Self {
        Self {
            project_id,
            tables: BTreeMap::new(),
        }
    }

    /// Get-or-insert a table entry.
    pub fn table_entry(&mut self, name: &str) -> &mut Table {
        self.tables.entry(name.to_string()).or_default()
    }
}

/// Flatten a schema back into the two metadata row sets. Inverse of
/// [`build_from_metadata`](super::build_from_metadata).
pub fn flatten(schema: &LogicalSchema) -> (Vec<ColumnRecord>, Vec<FkEdgeRecord>) {
    let mut columns = Vec::new();
    let mut edges = Vec::new();

    for (table_name, table) in &schema.tables {
        for column in table.columns.values() {
            columns.push(ColumnRecord {
                project_id: schema.project_id,
                table_name: table_name.clone(),
                column_name: column.name.clone(),
                data_type: column.data_type.clone(),
                nullable: column.nullable,
                is_primary_key: column.is_primary_key,
            });
        }
        for fk in table.fks.values() {
            edges.push(FkEdgeRecord {
                project_id: schema.project_id,
                child_table: table_name.clone(),
                child_column: fk.child_column.clone(),
                parent_table: fk.parent_table.clone(),
                parent_column: fk.parent_column.clone(),
            });
        }
    }

    (columns, edges)
}
