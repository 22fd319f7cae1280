//! Database catalog and persistence for relite
//!
//! A database is a name -> table map. The whole database is the unit
//! of persistence: one JSON document holding every table's schema and
//! rows. Indexes are never persisted; they are rebuilt by re-inserting
//! every row on load.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use super::table::Table;
use super::value::Value;
use crate::catalog::{Column, DataType, Schema};
use crate::error::{Error, Result};

/// A database: an ordered map from table name to table
#[derive(Debug, Default, Clone)]
pub struct Database {
    tables: IndexMap<String, Table>,
}

/// Serializable proxy for one table
#[derive(Serialize, Deserialize)]
struct TableData {
    columns: Vec<(String, DataType)>,
    primary_key: Option<String>,
    unique_columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

/// Serializable proxy for the whole database
#[derive(Serialize, Deserialize)]
struct DatabaseFile {
    tables: IndexMap<String, TableData>,
}

impl Database {
    /// Create a new empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new table from a column list
    pub fn create_table(&mut self, name: &str, columns: Vec<Column>) -> Result<()> {
        if self.tables.contains_key(name) {
            return Err(Error::TableAlreadyExists(name.to_string()));
        }
        let schema = Schema::from_columns(name, columns)?;
        self.tables
            .insert(name.to_string(), Table::new(name, schema));
        info!(table = name, "table created");
        Ok(())
    }

    /// Get a table by name
    pub fn get_table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Get a mutable table by name
    pub fn get_table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Drop a table
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        if self.tables.shift_remove(name).is_none() {
            return Err(Error::TableNotFound(name.to_string()));
        }
        info!(table = name, "table dropped");
        Ok(())
    }

    /// Table names in creation order
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(|s| s.as_str()).collect()
    }

    /// Iterate over the tables in creation order
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Number of tables
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    // ========== Persistence ==========

    /// Save the whole database to a JSON file.
    ///
    /// The document is written to a sibling temp file first and renamed
    /// over the target, so a crash mid-write cannot truncate an
    /// existing good file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = DatabaseFile {
            tables: self
                .tables
                .iter()
                .map(|(name, table)| {
                    (
                        name.clone(),
                        TableData {
                            columns: table
                                .columns()
                                .iter()
                                .map(|c| (c.name.clone(), c.data_type))
                                .collect(),
                            primary_key: table.primary_key().map(String::from),
                            unique_columns: table
                                .unique_columns()
                                .iter()
                                .map(|s| s.to_string())
                                .collect(),
                            rows: table.row_values().cloned().collect(),
                        },
                    )
                })
                .collect(),
        };

        let json =
            serde_json::to_string_pretty(&data).map_err(|e| Error::Serialization(e.to_string()))?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = std::path::PathBuf::from(tmp);
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;

        debug!(path = %path.display(), tables = self.tables.len(), "database saved");
        Ok(())
    }

    /// Load a database from a JSON file.
    ///
    /// Returns a fresh instance; the caller's previous state is only
    /// replaced when this succeeds. Every constrained index is rebuilt
    /// by re-inserting rows in storage order, so a file whose rows
    /// violate a uniqueness constraint is reported as corrupt.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Database> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let data: DatabaseFile =
            serde_json::from_str(&json).map_err(|e| Error::CorruptFile(e.to_string()))?;

        let mut db = Database::new();
        for (name, table_data) in data.tables {
            let columns = table_data
                .columns
                .into_iter()
                .map(|(col_name, data_type)| {
                    let pk = table_data.primary_key.as_deref() == Some(col_name.as_str());
                    let unique = table_data.unique_columns.iter().any(|u| *u == col_name);
                    Column::new(col_name, data_type).primary_key(pk).unique(unique)
                })
                .collect();

            let schema =
                Schema::from_columns(&name, columns).map_err(|e| Error::CorruptFile(e.to_string()))?;
            let mut table = Table::new(&name, schema);
            for row in table_data.rows {
                table
                    .insert_row(row)
                    .map_err(|e| Error::CorruptFile(e.to_string()))?;
            }
            db.tables.insert(name, table);
        }

        debug!(path = %path.display(), tables = db.tables.len(), "database loaded");
        Ok(db)
    }
}
