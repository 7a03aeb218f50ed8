//! Lowering from the third-party parse tree into the stable subset.

use sqlparser::ast as past;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;
use thiserror::Error;

use super::ast::{
    AlterTableOp, AlterTableStatement, ColumnDef, CompareOp, CreateTableStatement,
    DeleteStatement, Expr, InsertStatement, SelectStatement, SqlValue, Statement,
    TableConstraint, UpdateStatement,
};

/// Parse failures surfaced to callers.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("sql parse error: {0}")]
    Syntax(#[from] sqlparser::parser::ParserError),
}

/// Parse SQL text into the statement subset, one entry per statement.
pub fn parse(sql: &str) -> Result<Vec<Statement>, ParseError> {
    let statements = Parser::parse_sql(&PostgreSqlDialect {}, sql)?;
    Ok(statements.into_iter().map(lower_statement).collect())
}

fn lower_statement(stmt: past::Statement) -> Statement {
    match stmt {
        past::Statement::Query(query) => lower_query(*query),
        past::Statement::Insert(insert) => lower_insert(insert),
        past::Statement::Update {
            table, selection, ..
        } => match table_factor_name(&table.relation) {
            Some(name) => Statement::Update(UpdateStatement {
                table: name,
                where_clause: selection.map(lower_expr),
            }),
            None => Statement::Other,
        },
        past::Statement::Delete(delete) => lower_delete(delete),
        past::Statement::CreateTable(create) => lower_create_table(create),
        past::Statement::AlterTable {
            name, operations, ..
        } => lower_alter_table(&name, operations),
        _ => Statement::Other,
    }
}

fn lower_query(query: past::Query) -> Statement {
    match *query.body {
        past::SetExpr::Select(select) => {
            let relation_count = select.from.len();
            let has_joins = select.from.iter().any(|entry| !entry.joins.is_empty());
            let table = select
                .from
                .first()
                .and_then(|entry| table_factor_name(&entry.relation));
            Statement::Select(SelectStatement {
                table,
                relation_count,
                has_joins,
                where_clause: select.selection.map(lower_expr),
            })
        }
        _ => Statement::Other,
    }
}

fn lower_insert(insert: past::Insert) -> Statement {
    let table = match &insert.table {
        past::TableObject::TableName(name) => match object_name(name) {
            Some(name) => name,
            None => return Statement::Other,
        },
        _ => return Statement::Other,
    };

    let columns = insert
        .columns
        .iter()
        .map(|ident| ident.value.clone())
        .collect();

    let (rows, from_select) = match insert.source {
        Some(query) => match *query.body {
            past::SetExpr::Values(values) => {
                let rows = values
                    .rows
                    .into_iter()
                    .map(|row| row.into_iter().map(lower_expr).collect())
                    .collect();
                (rows, false)
            }
            _ => (Vec::new(), true),
        },
        None => (Vec::new(), true),
    };

    Statement::Insert(InsertStatement {
        table,
        columns,
        rows,
        from_select,
    })
}

fn lower_delete(delete: past::Delete) -> Statement {
    let tables = match &delete.from {
        past::FromTable::WithFromKeyword(tables) => tables,
        past::FromTable::WithoutKeyword(tables) => tables,
    };
    match tables.first().and_then(|entry| table_factor_name(&entry.relation)) {
        Some(name) => Statement::Delete(DeleteStatement {
            table: name,
            where_clause: delete.selection.map(lower_expr),
        }),
        None => Statement::Other,
    }
}

fn lower_create_table(create: past::CreateTable) -> Statement {
    let table = match object_name(&create.name) {
        Some(name) => name,
        None => return Statement::Other,
    };

    let mut constraints = Vec::new();
    let mut columns = Vec::new();

    for column in &create.columns {
        let (def, inline_fks) = lower_column_def(column);
        columns.push(def);
        constraints.extend(inline_fks);
    }

    for constraint in &create.constraints {
        if let Some(lowered) = lower_table_constraint(constraint) {
            constraints.push(lowered);
        }
    }

    Statement::CreateTable(CreateTableStatement {
        table,
        columns,
        constraints,
    })
}

fn lower_alter_table(
    name: &past::ObjectName,
    operations: Vec<past::AlterTableOperation>,
) -> Statement {
    let table = match object_name(name) {
        Some(name) => name,
        None => return Statement::Other,
    };

    let mut lowered = Vec::new();
    for operation in operations {
        match operation {
            past::AlterTableOperation::AddColumn { column_def, .. } => {
                let (def, inline_fks) = lower_column_def(&column_def);
                lowered.push(AlterTableOp::AddColumn(def));
                lowered.extend(inline_fks.into_iter().map(AlterTableOp::AddConstraint));
            }
            past::AlterTableOperation::AddConstraint { constraint, .. } => {
                match lower_table_constraint(&constraint) {
                    Some(lowered_constraint) => {
                        lowered.push(AlterTableOp::AddConstraint(lowered_constraint));
                    }
                    None => lowered.push(AlterTableOp::Other),
                }
            }
            _ => lowered.push(AlterTableOp::Other),
        }
    }

    Statement::AlterTable(AlterTableStatement {
        table,
        operations: lowered,
    })
}

fn lower_column_def(column: &past::ColumnDef) -> (ColumnDef, Vec<TableConstraint>) {
    let mut not_null = false;
    let mut primary_key = false;
    let mut inline_fks = Vec::new();

    for option in &column.options {
        match &option.option {
            past::ColumnOption::NotNull => not_null = true,
            past::ColumnOption::Unique { is_primary, .. } if *is_primary => primary_key = true,
            past::ColumnOption::ForeignKey {
                foreign_table,
                referred_columns,
                ..
            } => {
                if let Some(parent_table) = object_name(foreign_table) {
                    if !referred_columns.is_empty() {
                        inline_fks.push(TableConstraint::ForeignKey {
                            columns: vec![column.name.value.clone()],
                            parent_table,
                            parent_columns: ident_values(referred_columns),
                        });
                    }
                }
            }
            _ => {}
        }
    }

    let def = ColumnDef {
        name: column.name.value.clone(),
        data_type: normalize_type(&column.data_type),
        not_null,
        primary_key,
    };
    (def, inline_fks)
}

fn lower_table_constraint(constraint: &past::TableConstraint) -> Option<TableConstraint> {
    match constraint {
        past::TableConstraint::PrimaryKey { columns, .. } => Some(TableConstraint::PrimaryKey {
            columns: columns.iter().filter_map(index_column_name).collect(),
        }),
        past::TableConstraint::ForeignKey {
            columns,
            foreign_table,
            referred_columns,
            ..
        } => object_name(foreign_table).map(|parent_table| TableConstraint::ForeignKey {
            columns: ident_values(columns),
            parent_table,
            parent_columns: ident_values(referred_columns),
        }),
        _ => None,
    }
}

fn lower_expr(expr: past::Expr) -> Expr {
    match expr {
        past::Expr::Identifier(ident) => Expr::Column(ident.value),
        past::Expr::Value(value) => lower_value(value.value),
        past::Expr::Nested(inner) => lower_expr(*inner),
        past::Expr::BinaryOp { left, op, right } => match op {
            past::BinaryOperator::And => {
                Expr::And(Box::new(lower_expr(*left)), Box::new(lower_expr(*right)))
            }
            past::BinaryOperator::Or => {
                Expr::Or(Box::new(lower_expr(*left)), Box::new(lower_expr(*right)))
            }
            other => Expr::Compare {
                op: lower_compare_op(&other),
                left: Box::new(lower_expr(*left)),
                right: Box::new(lower_expr(*right)),
            },
        },
        past::Expr::UnaryOp {
            op: past::UnaryOperator::Minus,
            expr,
        } => match lower_expr(*expr) {
            Expr::Literal(SqlValue::Int(value)) => Expr::Literal(SqlValue::Int(-value)),
            Expr::Literal(SqlValue::Float(text)) => Expr::Literal(SqlValue::Float(format!("-{text}"))),
            _ => Expr::Unsupported,
        },
        _ => Expr::Unsupported,
    }
}

fn lower_compare_op(op: &past::BinaryOperator) -> CompareOp {
    match op {
        past::BinaryOperator::Eq => CompareOp::Eq,
        past::BinaryOperator::NotEq => CompareOp::NotEq,
        past::BinaryOperator::Lt => CompareOp::Lt,
        past::BinaryOperator::LtEq => CompareOp::LtEq,
        past::BinaryOperator::Gt => CompareOp::Gt,
        past::BinaryOperator::GtEq => CompareOp::GtEq,
        _ => CompareOp::Other,
    }
}

fn lower_value(value: past::Value) -> Expr {
    match value {
        past::Value::Number(text, _) => match text.parse::<i64>() {
            Ok(int) => Expr::Literal(SqlValue::Int(int)),
            Err(_) => Expr::Literal(SqlValue::Float(text)),
        },
        past::Value::SingleQuotedString(text)
        | past::Value::EscapedStringLiteral(text)
        | past::Value::NationalStringLiteral(text) => Expr::Literal(SqlValue::Str(text)),
        past::Value::DollarQuotedString(text) => Expr::Literal(SqlValue::Str(text.value)),
        past::Value::Boolean(flag) => Expr::Literal(SqlValue::Bool(flag)),
        _ => Expr::Unsupported,
    }
}

fn object_name(name: &past::ObjectName) -> Option<String> {
    name.0
        .last()
        .and_then(|part| part.as_ident())
        .map(|ident| ident.value.clone())
}

fn table_factor_name(factor: &past::TableFactor) -> Option<String> {
    match factor {
        past::TableFactor::Table { name, .. } => object_name(name),
        _ => None,
    }
}

fn index_column_name(column: &past::IndexColumn) -> Option<String> {
    match &column.column.expr {
        past::Expr::Identifier(ident) => Some(ident.value.clone()),
        _ => None,
    }
}

/// Lowercase the rendered type and strip any length suffix, so
/// `VARCHAR(64)` and `varchar` compare equal downstream.
fn normalize_type(data_type: &past::DataType) -> String {
    let rendered = data_type.to_string().to_lowercase();
    match rendered.find('(') {
        Some(idx) => rendered[..idx].trim().to_string(),
        None => rendered,
    }
}

fn ident_values(idents: &[past::Ident]) -> Vec<String> {
    idents.iter().map(|ident| ident.value.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(sql: &str) -> Statement {
        let mut statements = parse(sql).unwrap();
        assert_eq!(statements.len(), 1);
        statements.remove(0)
    }

    #[test]
    fn test_select_with_conjunction() {
        let stmt = parse_one("SELECT * FROM orders WHERE user_id = 'u-1' AND total > 5");
        let select = match stmt {
            Statement::Select(select) => select,
            other => panic!("unexpected statement: {other:?}"),
        };
        assert_eq!(select.table.as_deref(), Some("orders"));
        assert_eq!(select.relation_count, 1);
        assert!(!select.has_joins);
        match select.where_clause.unwrap() {
            Expr::And(left, _) => match *left {
                Expr::Compare { op, left, right } => {
                    assert_eq!(op, CompareOp::Eq);
                    assert_eq!(*left, Expr::Column("user_id".into()));
                    assert_eq!(*right, Expr::Literal(SqlValue::Str("u-1".into())));
                }
                other => panic!("unexpected expr: {other:?}"),
            },
            other => panic!("unexpected expr: {other:?}"),
        }
    }

    #[test]
    fn test_select_join_is_visible() {
        let stmt =
            parse_one("SELECT * FROM orders o JOIN users u ON o.user_id = u.id WHERE u.id = 1");
        match stmt {
            Statement::Select(select) => assert!(select.has_joins),
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn test_insert_values_rows() {
        let stmt = parse_one(
            "INSERT INTO orders (id, user_id, total) VALUES (1, 'u-1', 10), (2, 'u-2', -20)",
        );
        let insert = match stmt {
            Statement::Insert(insert) => insert,
            other => panic!("unexpected statement: {other:?}"),
        };
        assert_eq!(insert.table, "orders");
        assert_eq!(insert.columns, vec!["id", "user_id", "total"]);
        assert!(!insert.from_select);
        assert_eq!(insert.rows.len(), 2);
        assert_eq!(insert.rows[0][1], Expr::Literal(SqlValue::Str("u-1".into())));
        assert_eq!(insert.rows[1][2], Expr::Literal(SqlValue::Int(-20)));
    }

    #[test]
    fn test_insert_select_is_flagged() {
        let stmt = parse_one("INSERT INTO orders (id) SELECT id FROM staging");
        match stmt {
            Statement::Insert(insert) => {
                assert!(insert.from_select);
                assert!(insert.rows.is_empty());
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn test_update_and_delete_tables() {
        match parse_one("UPDATE orders SET total = 1 WHERE user_id = 'u-1'") {
            Statement::Update(update) => {
                assert_eq!(update.table, "orders");
                assert!(update.where_clause.is_some());
            }
            other => panic!("unexpected statement: {other:?}"),
        }
        match parse_one("DELETE FROM orders WHERE user_id = 'u-1'") {
            Statement::Delete(delete) => {
                assert_eq!(delete.table, "orders");
                assert!(delete.where_clause.is_some());
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn test_create_table_columns_and_constraints() {
        let stmt = parse_one(
            "CREATE TABLE orders (\
                 id BIGINT PRIMARY KEY, \
                 user_id TEXT NOT NULL, \
                 notes VARCHAR(64), \
                 FOREIGN KEY (user_id) REFERENCES users (id)\
             )",
        );
        let create = match stmt {
            Statement::CreateTable(create) => create,
            other => panic!("unexpected statement: {other:?}"),
        };
        assert_eq!(create.table, "orders");
        assert_eq!(create.columns.len(), 3);

        let id = &create.columns[0];
        assert!(id.primary_key);
        assert!(!id.not_null);
        assert_eq!(id.data_type, "bigint");

        let user_id = &create.columns[1];
        assert!(user_id.not_null);
        assert!(!user_id.primary_key);

        assert_eq!(create.columns[2].data_type, "varchar");

        assert_eq!(
            create.constraints,
            vec![TableConstraint::ForeignKey {
                columns: vec!["user_id".into()],
                parent_table: "users".into(),
                parent_columns: vec!["id".into()],
            }]
        );
    }

    #[test]
    fn test_inline_references_becomes_fk() {
        let stmt =
            parse_one("CREATE TABLE orders (user_id BIGINT NOT NULL REFERENCES users (id))");
        match stmt {
            Statement::CreateTable(create) => {
                assert_eq!(create.constraints.len(), 1);
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn test_table_level_primary_key() {
        let stmt = parse_one("CREATE TABLE pairs (a INT, b INT, PRIMARY KEY (a, b))");
        match stmt {
            Statement::CreateTable(create) => {
                assert_eq!(
                    create.constraints,
                    vec![TableConstraint::PrimaryKey {
                        columns: vec!["a".into(), "b".into()],
                    }]
                );
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn test_alter_table_operations() {
        let stmt = parse_one(
            "ALTER TABLE orders \
             ADD COLUMN region TEXT NOT NULL, \
             ADD CONSTRAINT fk_region FOREIGN KEY (region) REFERENCES regions (code)",
        );
        let alter = match stmt {
            Statement::AlterTable(alter) => alter,
            other => panic!("unexpected statement: {other:?}"),
        };
        assert_eq!(alter.table, "orders");
        assert!(matches!(alter.operations[0], AlterTableOp::AddColumn(_)));
        assert!(matches!(
            alter.operations[1],
            AlterTableOp::AddConstraint(TableConstraint::ForeignKey { .. })
        ));
    }

    #[test]
    fn test_out_of_subset_statement_is_other() {
        assert!(matches!(
            parse_one("CREATE INDEX idx_orders ON orders (user_id)"),
            Statement::Other
        ));
    }

    #[test]
    fn test_multiple_statements_preserved() {
        let statements = parse("SELECT 1; SELECT 2").unwrap();
        assert_eq!(statements.len(), 2);
    }

    #[test]
    fn test_parse_error_surfaces() {
        assert!(parse("SELECT FROM WHERE").is_err());
    }
}
