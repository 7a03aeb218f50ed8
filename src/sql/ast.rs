//! Stable AST subset.

use std::fmt;

/// Literal constant kinds carried by predicates and VALUES rows.
///
/// Floats keep their textual form; they are never compared numerically,
/// only hashed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SqlValue {
    Int(i64),
    Float(String),
    Bool(bool),
    Str(String),
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Int(v) => write!(f, "{v}"),
            SqlValue::Float(v) => write!(f, "{v}"),
            SqlValue::Bool(v) => write!(f, "{v}"),
            SqlValue::Str(v) => write!(f, "{v}"),
        }
    }
}

/// Comparison operators surfaced to the predicate extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    /// Any operator outside the subset.
    Other,
}

/// Expression subset: column references, literals, boolean composition,
/// and binary comparisons. Anything else is `Unsupported`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(String),
    Literal(SqlValue),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unsupported,
}

/// A SELECT reduced to what routing needs.
#[derive(Debug, Clone)]
pub struct SelectStatement {
    /// Name of the first FROM relation, when it is a plain table.
    pub table: Option<String>,
    /// Number of FROM entries; more than one means a join.
    pub relation_count: usize,
    /// True when any FROM entry carries explicit JOIN clauses.
    pub has_joins: bool,
    pub where_clause: Option<Expr>,
}

/// An INSERT reduced to target columns and VALUES rows.
#[derive(Debug, Clone)]
pub struct InsertStatement {
    pub table: String,
    pub columns: Vec<String>,
    /// One entry per VALUES row; empty when the source is a SELECT.
    pub rows: Vec<Vec<Expr>>,
    /// True for INSERT … SELECT.
    pub from_select: bool,
}

#[derive(Debug, Clone)]
pub struct UpdateStatement {
    pub table: String,
    pub where_clause: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct DeleteStatement {
    pub table: String,
    pub where_clause: Option<Expr>,
}

/// Column definition from CREATE TABLE or ADD COLUMN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    /// Lowercased type name with any length suffix stripped
    /// (`varchar(64)` → `varchar`).
    pub data_type: String,
    pub not_null: bool,
    pub primary_key: bool,
}

/// Table-level constraints in the subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableConstraint {
    PrimaryKey {
        columns: Vec<String>,
    },
    ForeignKey {
        columns: Vec<String>,
        parent_table: String,
        parent_columns: Vec<String>,
    },
}

#[derive(Debug, Clone)]
pub struct CreateTableStatement {
    pub table: String,
    pub columns: Vec<ColumnDef>,
    pub constraints: Vec<TableConstraint>,
}

/// ALTER TABLE operations in the subset.
#[derive(Debug, Clone)]
pub enum AlterTableOp {
    AddColumn(ColumnDef),
    AddConstraint(TableConstraint),
    Other,
}

#[derive(Debug, Clone)]
pub struct AlterTableStatement {
    pub table: String,
    pub operations: Vec<AlterTableOp>,
}

/// The statement subset.
#[derive(Debug, Clone)]
pub enum Statement {
    Select(SelectStatement),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    CreateTable(CreateTableStatement),
    AlterTable(AlterTableStatement),
    /// Any statement kind outside the subset.
    Other,
}

impl Statement {
    /// Human-readable kind for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::Select(_) => "select",
            Statement::Insert(_) => "insert",
            Statement::Update(_) => "update",
            Statement::Delete(_) => "delete",
            Statement::CreateTable(_) => "create table",
            Statement::AlterTable(_) => "alter table",
            Statement::Other => "other",
        }
    }
}
