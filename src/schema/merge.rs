//! Merging a DDL delta onto a base schema.

use super::model::LogicalSchema;

/// Return a new schema with `delta` overlaid on `base`.
///
/// Tables are unioned; within a table, columns and FK entries from the
/// delta overwrite base entries by key (last writer wins). The merge
/// never deletes anything — destructive DDL is rejected before it gets
/// here.
pub fn merge(base: &LogicalSchema, delta: &LogicalSchema) -> LogicalSchema {
    let mut merged = base.clone();

    for (table_name, delta_table) in &delta.tables {
        let entry = merged.table_entry(table_name);
        for (column_name, column) in &delta_table.columns {
            entry.columns.insert(column_name.clone(), column.clone());
        }
        for (key, fk) in &delta_table.fks {
            entry.fks.insert(key.clone(), fk.clone());
        }
    }

    merged
}
