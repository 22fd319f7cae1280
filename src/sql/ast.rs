//! Abstract syntax tree for the statement grammar
//!
//! The parser produces one of six command descriptors; the executor
//! routes them to database/table operations. Parsing has no execution
//! side effects.

use std::fmt;

use crate::catalog::DataType;
use crate::storage::Value;

/// A parsed statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE TABLE statement
    CreateTable(CreateTableStatement),
    /// INSERT statement
    Insert(InsertStatement),
    /// SELECT statement (optionally with a two-table join)
    Select(SelectStatement),
    /// UPDATE statement
    Update(UpdateStatement),
    /// DELETE statement
    Delete(DeleteStatement),
    /// DROP TABLE statement
    DropTable(DropTableStatement),
}

/// A possibly table-qualified column reference
///
/// In join context the qualifier decides which side a name belongs to;
/// unqualified names are resolved against both schemas at execution
/// time and rejected when ambiguous.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    /// Table qualifier, if written as `table.column`
    pub qualifier: Option<String>,
    /// Column name
    pub column: String,
}

impl ColumnRef {
    /// An unqualified reference
    pub fn bare(column: impl Into<String>) -> Self {
        Self {
            qualifier: None,
            column: column.into(),
        }
    }

    /// A `table.column` reference
    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            qualifier: Some(table.into()),
            column: column.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{}.{}", q, self.column),
            None => write!(f, "{}", self.column),
        }
    }
}

/// One equality condition of a WHERE clause (AND-combined)
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Column reference
    pub column: ColumnRef,
    /// Literal the column must equal
    pub value: Value,
}

/// Column definition in CREATE TABLE
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name
    pub name: String,
    /// Declared type
    pub data_type: DataType,
    /// PRIMARY KEY constraint
    pub primary_key: bool,
    /// UNIQUE constraint
    pub unique: bool,
}

/// CREATE TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    /// Table name
    pub table_name: String,
    /// Column definitions
    pub columns: Vec<ColumnDef>,
}

/// INSERT statement (one VALUES tuple)
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// Table name
    pub table_name: String,
    /// Literal values, positionally aligned with the schema
    pub values: Vec<Value>,
}

/// JOIN clause of a SELECT
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    /// Joined (right) table name
    pub table_name: String,
    /// Left side of the ON equality, as written
    pub on_left: ColumnRef,
    /// Right side of the ON equality, as written
    pub on_right: ColumnRef,
}

/// SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    /// Base (left) table name
    pub table_name: String,
    /// Requested columns; `None` means `*`
    pub columns: Option<Vec<ColumnRef>>,
    /// Optional two-table inner join
    pub join: Option<JoinClause>,
    /// WHERE conditions, AND-combined
    pub where_clause: Vec<Condition>,
}

/// One `column = literal` pair of an UPDATE's SET list
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Column name
    pub column: String,
    /// New value
    pub value: Value,
}

/// UPDATE statement
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    /// Table name
    pub table_name: String,
    /// SET assignments
    pub assignments: Vec<Assignment>,
    /// WHERE conditions, AND-combined
    pub where_clause: Vec<Condition>,
}

/// DELETE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    /// Table name
    pub table_name: String,
    /// WHERE conditions, AND-combined
    pub where_clause: Vec<Condition>,
}

/// DROP TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStatement {
    /// Table name
    pub table_name: String,
}
