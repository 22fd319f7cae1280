//! Statement executor
//!
//! The executor owns the database, parses statement text, resolves
//! column references against the schemas involved, and dispatches to
//! the storage layer. Its public surface never propagates errors:
//! every statement yields a [`QueryResult`], with failures carried in
//! the `error` field so a caller can print a uniform report per
//! statement.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::catalog::Column;
use crate::error::{Error, Result};
use crate::sql::ast::*;
use crate::sql::Parser;
use crate::storage::{Database, Table, Value};

/// Query result
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    /// Column names (non-empty only for SELECT)
    pub columns: Vec<String>,
    /// Result rows, aligned with `columns`
    pub rows: Vec<Vec<Value>>,
    /// Number of affected rows (for INSERT/UPDATE/DELETE)
    pub affected_rows: usize,
    /// Status message (for successful non-SELECT statements)
    pub message: Option<String>,
    /// Error report, when the statement failed
    pub error: Option<String>,
}

impl QueryResult {
    /// A result carrying a status message
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            affected_rows: 0,
            message: Some(message.into()),
            error: None,
        }
    }

    /// A result carrying an affected-rows count and a status message
    pub fn with_affected_rows(count: usize, message: impl Into<String>) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            affected_rows: count,
            message: Some(message.into()),
            error: None,
        }
    }

    /// A SELECT result
    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns,
            rows,
            affected_rows: 0,
            message: None,
            error: None,
        }
    }

    /// A failed statement's result
    pub fn with_error(report: impl Into<String>) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            affected_rows: 0,
            message: None,
            error: Some(report.into()),
        }
    }

    /// Did the statement fail?
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Statement executor
#[derive(Debug)]
pub struct Executor {
    /// The database being operated on
    db: Database,
    /// When set, the database is rewritten here after every
    /// successful mutating statement
    persist_path: Option<PathBuf>,
}

impl Executor {
    /// Create an executor over an empty in-memory database
    pub fn new() -> Self {
        Self {
            db: Database::new(),
            persist_path: None,
        }
    }

    /// Create an executor over an existing database
    pub fn with_database(db: Database) -> Self {
        Self {
            db,
            persist_path: None,
        }
    }

    /// Open an executor backed by a database file.
    ///
    /// Loads the file if it exists; starts empty otherwise. Mutating
    /// statements rewrite the file after they commit.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let db = if path.exists() {
            Database::load_from_file(&path)?
        } else {
            Database::new()
        };

        Ok(Self {
            db,
            persist_path: Some(path),
        })
    }

    /// The underlying database
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// The backing file, if any
    pub fn persist_path(&self) -> Option<&Path> {
        self.persist_path.as_deref()
    }

    /// Execute one statement.
    ///
    /// Parse, resolution, and execution failures all surface as an
    /// error-carrying result; they never panic or propagate.
    pub fn execute(&mut self, sql: &str) -> QueryResult {
        debug!(statement = sql, "executing statement");
        match self.try_execute(sql) {
            Ok(result) => result,
            Err(err) => QueryResult::with_error(format!("Error: {}", err)),
        }
    }

    fn try_execute(&mut self, sql: &str) -> Result<QueryResult> {
        let statement = Parser::new(sql)?.parse()?;
        match statement {
            Statement::CreateTable(stmt) => self.execute_create_table(stmt),
            Statement::Insert(stmt) => self.execute_insert(stmt),
            Statement::Select(stmt) => self.execute_select(stmt),
            Statement::Update(stmt) => self.execute_update(stmt),
            Statement::Delete(stmt) => self.execute_delete(stmt),
            Statement::DropTable(stmt) => self.execute_drop_table(stmt),
        }
    }

    // ========== DDL ==========

    fn execute_create_table(&mut self, stmt: CreateTableStatement) -> Result<QueryResult> {
        let columns: Vec<Column> = stmt
            .columns
            .into_iter()
            .map(|def| {
                Column::new(def.name, def.data_type)
                    .primary_key(def.primary_key)
                    .unique(def.unique)
            })
            .collect();

        self.db.create_table(&stmt.table_name, columns)?;
        self.persist()?;
        Ok(QueryResult::with_message(format!(
            "Table '{}' created.",
            stmt.table_name
        )))
    }

    fn execute_drop_table(&mut self, stmt: DropTableStatement) -> Result<QueryResult> {
        self.db.drop_table(&stmt.table_name)?;
        self.persist()?;
        Ok(QueryResult::with_message(format!(
            "Table '{}' dropped.",
            stmt.table_name
        )))
    }

    // ========== DML ==========

    fn execute_insert(&mut self, stmt: InsertStatement) -> Result<QueryResult> {
        let table = self.db.get_table_mut(&stmt.table_name)?;
        table.insert_row(stmt.values)?;
        self.persist()?;
        Ok(QueryResult::with_affected_rows(1, "1 row inserted."))
    }

    fn execute_update(&mut self, stmt: UpdateStatement) -> Result<QueryResult> {
        let table = self.db.get_table_mut(&stmt.table_name)?;
        let conditions = resolve_single_table(table, &stmt.where_clause)?;
        let assignments: Vec<(String, Value)> = stmt
            .assignments
            .into_iter()
            .map(|a| (a.column, a.value))
            .collect();

        let count = table.update(&assignments, &conditions)?;
        self.persist()?;
        Ok(QueryResult::with_affected_rows(
            count,
            format!("{} rows updated.", count),
        ))
    }

    fn execute_delete(&mut self, stmt: DeleteStatement) -> Result<QueryResult> {
        let table = self.db.get_table_mut(&stmt.table_name)?;
        let conditions = resolve_single_table(table, &stmt.where_clause)?;

        let count = table.delete(&conditions)?;
        self.persist()?;
        Ok(QueryResult::with_affected_rows(
            count,
            format!("{} rows deleted.", count),
        ))
    }

    // ========== SELECT ==========

    fn execute_select(&mut self, stmt: SelectStatement) -> Result<QueryResult> {
        match &stmt.join {
            None => self.execute_plain_select(&stmt),
            Some(join) => self.execute_join_select(&stmt, join),
        }
    }

    fn execute_plain_select(&self, stmt: &SelectStatement) -> Result<QueryResult> {
        let table = self.db.get_table(&stmt.table_name)?;

        let projection: Option<Vec<String>> = match &stmt.columns {
            None => None,
            Some(refs) => Some(
                refs.iter()
                    .map(|r| resolve_column(table, r))
                    .collect::<Result<_>>()?,
            ),
        };
        let conditions = resolve_single_table(table, &stmt.where_clause)?;

        let names = match &projection {
            None => table.schema().column_names().iter().map(|n| n.to_string()).collect(),
            Some(names) => names.clone(),
        };
        let rows = table.select(projection.as_deref(), &conditions)?;
        Ok(result_from_rows(names, rows))
    }

    fn execute_join_select(&self, stmt: &SelectStatement, join: &JoinClause) -> Result<QueryResult> {
        let left = self.db.get_table(&stmt.table_name)?;
        let right = self.db.get_table(&join.table_name)?;

        // ON sides may arrive in either order; pin each to its table
        let (left_key, right_key) = resolve_on_clause(left, right, &join.on_left, &join.on_right)?;
        let left_col = column_of(&left_key);
        let right_col = column_of(&right_key);

        let projection: Option<Vec<String>> = match &stmt.columns {
            None => None,
            Some(refs) => Some(
                refs.iter()
                    .map(|r| resolve_joined_column(left, right, r))
                    .collect::<Result<_>>()?,
            ),
        };
        let conditions: Vec<(String, Value)> = stmt
            .where_clause
            .iter()
            .map(|c| {
                resolve_joined_column(left, right, &c.column).map(|key| (key, c.value.clone()))
            })
            .collect::<Result<_>>()?;

        let names = match &projection {
            None => left.joined_column_keys(right),
            Some(names) => names.clone(),
        };
        let rows = left.inner_join(right, left_col, right_col, projection.as_deref(), &conditions)?;
        Ok(result_from_rows(names, rows))
    }

    // ========== Persistence ==========

    fn persist(&self) -> Result<()> {
        if let Some(path) = &self.persist_path {
            self.db.save_to_file(path)?;
        }
        Ok(())
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

// ========== Name resolution ==========

/// Resolve one reference against a single table's schema
fn resolve_column(table: &Table, r: &ColumnRef) -> Result<String> {
    if let Some(qualifier) = &r.qualifier {
        if qualifier != table.name() {
            return Err(Error::UnresolvedColumn(r.to_string()));
        }
    }
    if !table.schema().has_column(&r.column) {
        return Err(Error::ColumnNotFound(
            r.column.clone(),
            table.name().to_string(),
        ));
    }
    Ok(r.column.clone())
}

/// Resolve a WHERE clause against a single table
fn resolve_single_table(table: &Table, clause: &[Condition]) -> Result<Vec<(String, Value)>> {
    clause
        .iter()
        .map(|c| resolve_column(table, &c.column).map(|name| (name, c.value.clone())))
        .collect()
}

/// Resolve one reference against a joined pair of schemas to a
/// qualified `table.column` key.
///
/// An unqualified name present in both schemas is ambiguous and is
/// rejected rather than guessed at.
fn resolve_joined_column(left: &Table, right: &Table, r: &ColumnRef) -> Result<String> {
    match &r.qualifier {
        Some(qualifier) => {
            let table = if qualifier == left.name() {
                left
            } else if qualifier == right.name() {
                right
            } else {
                return Err(Error::UnresolvedColumn(r.to_string()));
            };
            if !table.schema().has_column(&r.column) {
                return Err(Error::ColumnNotFound(
                    r.column.clone(),
                    table.name().to_string(),
                ));
            }
            Ok(format!("{}.{}", table.name(), r.column))
        }
        None => {
            let in_left = left.schema().has_column(&r.column);
            let in_right = right.schema().has_column(&r.column);
            match (in_left, in_right) {
                (true, true) => Err(Error::AmbiguousColumn(r.column.clone())),
                (true, false) => Ok(format!("{}.{}", left.name(), r.column)),
                (false, true) => Ok(format!("{}.{}", right.name(), r.column)),
                (false, false) => Err(Error::UnresolvedColumn(r.column.clone())),
            }
        }
    }
}

/// Pin the two ON sides to the left and right tables, whichever order
/// they were written in
fn resolve_on_clause(
    left: &Table,
    right: &Table,
    a: &ColumnRef,
    b: &ColumnRef,
) -> Result<(String, String)> {
    let a_key = resolve_joined_column(left, right, a)?;
    let b_key = resolve_joined_column(left, right, b)?;

    let a_is_left = qualifier_of(&a_key) == left.name();
    let b_is_left = qualifier_of(&b_key) == left.name();
    match (a_is_left, b_is_left) {
        (true, false) => Ok((a_key, b_key)),
        (false, true) => Ok((b_key, a_key)),
        _ => Err(Error::SyntaxError(
            "join condition must reference both tables".to_string(),
        )),
    }
}

fn qualifier_of(key: &str) -> &str {
    key.split('.').next().unwrap_or(key)
}

fn column_of(key: &str) -> &str {
    key.split_once('.').map(|(_, col)| col).unwrap_or(key)
}

/// Flatten name-keyed result rows into positional rows
fn result_from_rows(
    columns: Vec<String>,
    rows: Vec<crate::storage::ResultRow>,
) -> QueryResult {
    let flattened = rows
        .into_iter()
        .map(|row| {
            columns
                .iter()
                .filter_map(|name| row.get(name).cloned())
                .collect()
        })
        .collect();
    QueryResult::with_rows(columns, flattened)
}
