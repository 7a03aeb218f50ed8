//! Building the IR from DDL text or persisted metadata.

use uuid::Uuid;

use crate::metadata::{ColumnRecord, FkEdgeRecord};
use crate::sql::{self, AlterTableOp, ColumnDef, Statement, TableConstraint};

use super::errors::SchemaError;
use super::model::{Column, Fk, FkKey, LogicalSchema};

/// Parse DDL text and build the delta schema it describes.
///
/// Only CREATE TABLE and ALTER TABLE … ADD COLUMN | ADD CONSTRAINT are
/// walked; every other statement kind is ignored at this stage.
pub fn build_from_ddl(project_id: Uuid, ddl: &str) -> Result<LogicalSchema, SchemaError> {
    let statements = sql::parse(ddl)?;
    let mut schema = LogicalSchema::new(project_id);

    for statement in statements {
        match statement {
            Statement::CreateTable(create) => {
                let table = create.table;
                schema.table_entry(&table);
                for def in &create.columns {
                    add_column(&mut schema, &table, def);
                }
                for constraint in &create.constraints {
                    add_constraint(&mut schema, &table, constraint);
                }
            }
            Statement::AlterTable(alter) => {
                let table = alter.table;
                schema.table_entry(&table);
                for operation in &alter.operations {
                    match operation {
                        AlterTableOp::AddColumn(def) => add_column(&mut schema, &table, def),
                        AlterTableOp::AddConstraint(constraint) => {
                            add_constraint(&mut schema, &table, constraint)
                        }
                        AlterTableOp::Other => {}
                    }
                }
            }
            _ => {}
        }
    }

    Ok(schema)
}

/// Index persisted column and edge rows into the IR. Pure.
pub fn build_from_metadata(
    project_id: Uuid,
    columns: &[ColumnRecord],
    edges: &[FkEdgeRecord],
) -> LogicalSchema {
    let mut schema = LogicalSchema::new(project_id);

    for record in columns {
        schema.table_entry(&record.table_name).columns.insert(
            record.column_name.clone(),
            Column {
                name: record.column_name.clone(),
                data_type: record.data_type.clone(),
                nullable: record.nullable,
                is_primary_key: record.is_primary_key,
            },
        );
    }

    for record in edges {
        let key = FkKey {
            child_column: record.child_column.clone(),
            parent_table: record.parent_table.clone(),
            parent_column: record.parent_column.clone(),
        };
        schema.table_entry(&record.child_table).fks.insert(
            key,
            Fk {
                child_table: record.child_table.clone(),
                child_column: record.child_column.clone(),
                parent_table: record.parent_table.clone(),
                parent_column: record.parent_column.clone(),
            },
        );
    }

    schema
}

fn add_column(schema: &mut LogicalSchema, table: &str, def: &ColumnDef) {
    schema.table_entry(table).columns.insert(
        def.name.clone(),
        Column {
            name: def.name.clone(),
            data_type: def.data_type.clone(),
            nullable: !def.not_null,
            is_primary_key: def.primary_key,
        },
    );
}

fn add_constraint(schema: &mut LogicalSchema, table: &str, constraint: &TableConstraint) {
    match constraint {
        TableConstraint::PrimaryKey { columns } => {
            let entry = schema.table_entry(table);
            for name in columns {
                if let Some(column) = entry.columns.get_mut(name) {
                    column.is_primary_key = true;
                }
            }
        }
        TableConstraint::ForeignKey {
            columns,
            parent_table,
            parent_columns,
        } => {
            let entry = schema.table_entry(table);
            for (child_column, parent_column) in columns.iter().zip(parent_columns.iter()) {
                let key = FkKey {
                    child_column: child_column.clone(),
                    parent_table: parent_table.clone(),
                    parent_column: parent_column.clone(),
                };
                entry.fks.insert(
                    key,
                    Fk {
                        child_table: table.to_string(),
                        child_column: child_column.clone(),
                        parent_table: parent_table.clone(),
                        parent_column: parent_column.clone(),
                    },
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ddl_schema(ddl: &str) -> LogicalSchema {
        build_from_ddl(Uuid::nil(), ddl).unwrap()
    }

    #[test]
    fn test_create_table_columns() {
        let schema = ddl_schema(
            "CREATE TABLE users (\
                 id BIGINT PRIMARY KEY NOT NULL, \
                 email TEXT NOT NULL, \
                 created_at TIMESTAMPTZ NOT NULL\
             )",
        );
        let users = &schema.tables["users"];
        assert_eq!(users.columns.len(), 3);
        let id = &users.columns["id"];
        assert!(id.is_primary_key);
        assert!(!id.nullable);
        assert!(users.columns["email"].data_type.contains("text"));
    }

    #[test]
    fn test_table_level_pk_marks_existing_columns() {
        let schema = ddl_schema("CREATE TABLE pairs (a INT, b INT, PRIMARY KEY (a, b))");
        let pairs = &schema.tables["pairs"];
        assert!(pairs.columns["a"].is_primary_key);
        assert!(pairs.columns["b"].is_primary_key);
        // Without an explicit NOT NULL the IR keeps the column nullable.
        assert!(pairs.columns["a"].nullable);
    }

    #[test]
    fn test_foreign_keys_land_on_the_child_table() {
        let schema = ddl_schema(
            "CREATE TABLE users (id BIGINT PRIMARY KEY NOT NULL); \
             CREATE TABLE orders (\
                 id BIGINT PRIMARY KEY, \
                 user_id BIGINT NOT NULL, \
                 FOREIGN KEY (user_id) REFERENCES users (id)\
             )",
        );
        let orders = &schema.tables["orders"];
        assert_eq!(orders.fks.len(), 1);
        let fk = orders.fks.values().next().unwrap();
        assert_eq!(fk.child_table, "orders");
        assert_eq!(fk.child_column, "user_id");
        assert_eq!(fk.parent_table, "users");
        assert_eq!(fk.parent_column, "id");
    }

    #[test]
    fn test_alter_table_adds_columns_and_constraints() {
        let schema = ddl_schema(
            "ALTER TABLE orders \
                 ADD COLUMN region TEXT NOT NULL, \
                 ADD CONSTRAINT fk_region FOREIGN KEY (region) REFERENCES regions (code)",
        );
        let orders = &schema.tables["orders"];
        assert!(orders.columns.contains_key("region"));
        assert_eq!(orders.fks.len(), 1);
    }

    #[test]
    fn test_non_ddl_statements_are_ignored() {
        let schema = ddl_schema("SELECT 1; CREATE TABLE t (id INT)");
        assert_eq!(schema.tables.len(), 1);
    }

    #[test]
    fn test_metadata_round_trip() {
        let project = Uuid::new_v4();
        let columns = vec![
            ColumnRecord {
                project_id: project,
                table_name: "users".into(),
                column_name: "id".into(),
                data_type: "bigint".into(),
                nullable: false,
                is_primary_key: true,
            },
            ColumnRecord {
                project_id: project,
                table_name: "orders".into(),
                column_name: "user_id".into(),
                data_type: "bigint".into(),
                nullable: false,
                is_primary_key: false,
            },
        ];
        let edges = vec![FkEdgeRecord {
            project_id: project,
            child_table: "orders".into(),
            child_column: "user_id".into(),
            parent_table: "users".into(),
            parent_column: "id".into(),
        }];

        let schema = build_from_metadata(project, &columns, &edges);
        let (mut out_columns, out_edges) = super::super::model::flatten(&schema);

        out_columns.sort_by(|a, b| (&a.table_name, &a.column_name).cmp(&(&b.table_name, &b.column_name)));
        let mut in_columns = columns.clone();
        in_columns.sort_by(|a, b| (&a.table_name, &a.column_name).cmp(&(&b.table_name, &b.column_name)));

        assert_eq!(out_columns, in_columns);
        assert_eq!(out_edges, edges);
    }
}
