//! Logical schema model invariants.
//!
//! - metadata → IR → metadata round-trips as multisets
//! - merge is associative, idempotent without new keys, and never deletes
//! - the destructive-DDL guard matches its statement set

use shardrail::metadata::{ColumnRecord, FkEdgeRecord};
use shardrail::schema::{
    build_from_ddl, build_from_metadata, flatten, is_destructive_ddl, merge,
};
use uuid::Uuid;

fn column(project: Uuid, table: &str, name: &str, data_type: &str) -> ColumnRecord {
    ColumnRecord {
        project_id: project,
        table_name: table.into(),
        column_name: name.into(),
        data_type: data_type.into(),
        nullable: false,
        is_primary_key: name == "id",
    }
}

fn edge(project: Uuid, child: (&str, &str), parent: (&str, &str)) -> FkEdgeRecord {
    FkEdgeRecord {
        project_id: project,
        child_table: child.0.into(),
        child_column: child.1.into(),
        parent_table: parent.0.into(),
        parent_column: parent.1.into(),
    }
}

fn sorted_columns(mut records: Vec<ColumnRecord>) -> Vec<ColumnRecord> {
    records.sort_by(|a, b| {
        (&a.table_name, &a.column_name).cmp(&(&b.table_name, &b.column_name))
    });
    records
}

fn sorted_edges(mut records: Vec<FkEdgeRecord>) -> Vec<FkEdgeRecord> {
    records.sort_by(|a, b| {
        (&a.child_table, &a.child_column, &a.parent_table, &a.parent_column).cmp(&(
            &b.child_table,
            &b.child_column,
            &b.parent_table,
            &b.parent_column,
        ))
    });
    records
}

#[test]
fn test_flatten_inverts_build_from_metadata() {
    let project = Uuid::new_v4();
    let columns = vec![
        column(project, "users", "id", "bigint"),
        column(project, "users", "email", "text"),
        column(project, "orders", "id", "bigint"),
        column(project, "orders", "user_id", "bigint"),
    ];
    let edges = vec![edge(project, ("orders", "user_id"), ("users", "id"))];

    let schema = build_from_metadata(project, &columns, &edges);
    let (out_columns, out_edges) = flatten(&schema);

    assert_eq!(sorted_columns(out_columns), sorted_columns(columns));
    assert_eq!(sorted_edges(out_edges), sorted_edges(edges));
}

#[test]
fn test_merge_laws() {
    let project = Uuid::nil();
    let a = build_from_ddl(project, "CREATE TABLE users (id BIGINT NOT NULL)").unwrap();
    let b = build_from_ddl(project, "ALTER TABLE users ADD COLUMN email TEXT NOT NULL").unwrap();
    let c = build_from_ddl(project, "CREATE TABLE orders (id BIGINT NOT NULL)").unwrap();

    // Associativity.
    assert_eq!(merge(&merge(&a, &b), &c), merge(&a, &merge(&b, &c)));

    // Idempotence when the delta brings no new keys.
    let once = merge(&a, &b);
    assert_eq!(once, merge(&once, &b));

    // Merging never removes what the base had.
    let merged = merge(&a, &c);
    assert!(merged.tables.contains_key("users"));
    assert!(merged.tables.contains_key("orders"));
}

#[test]
fn test_merge_overwrite_is_last_writer_wins() {
    let project = Uuid::nil();
    let base = build_from_ddl(project, "CREATE TABLE t (v TEXT)").unwrap();
    let delta = build_from_ddl(project, "ALTER TABLE t ADD COLUMN v BIGINT NOT NULL").unwrap();

    let merged = merge(&base, &delta);
    let v = &merged.tables["t"].columns["v"];
    assert_eq!(v.data_type, "bigint");
    assert!(!v.nullable);
}

#[test]
fn test_ddl_and_metadata_paths_agree() {
    let project = Uuid::new_v4();
    let ddl = "CREATE TABLE users (id BIGINT PRIMARY KEY NOT NULL); \
               CREATE TABLE orders (\
                   id BIGINT NOT NULL, user_id BIGINT NOT NULL, \
                   FOREIGN KEY (user_id) REFERENCES users (id))";

    let from_ddl = build_from_ddl(project, ddl).unwrap();
    let (columns, edges) = flatten(&from_ddl);
    let rebuilt = build_from_metadata(project, &columns, &edges);

    assert_eq!(from_ddl, rebuilt);
}

#[test]
fn test_destructive_guard_statement_set() {
    for destructive in [
        "DROP TABLE orders",
        "drop table orders cascade",
        "ALTER TABLE orders DROP COLUMN notes",
        "TRUNCATE TABLE orders",
        "ALTER TABLE orders DROP CONSTRAINT fk_user",
    ] {
        assert!(is_destructive_ddl(destructive), "{destructive}");
    }

    for additive in [
        "CREATE TABLE orders (id BIGINT)",
        "ALTER TABLE orders ADD COLUMN notes TEXT",
        "ALTER TABLE orders ADD CONSTRAINT fk FOREIGN KEY (user_id) REFERENCES users (id)",
    ] {
        assert!(!is_destructive_ddl(additive), "{additive}");
    }
}
