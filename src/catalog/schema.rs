//! Schema definitions for relite
//!
//! A schema is an ordered sequence of columns, fixed at table-creation
//! time. At most one column may be the primary key; any number may be
//! UNIQUE. The primary key is implicitly unique.

use super::types::DataType;
use crate::error::{Error, Result};
use std::collections::HashMap;

/// Column definition in a table
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Declared data type
    pub data_type: DataType,
    /// Is this the primary key column?
    pub primary_key: bool,
    /// Is this column unique?
    pub unique: bool,
}

impl Column {
    /// Create a plain column with no constraints
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            primary_key: false,
            unique: false,
        }
    }

    /// Set primary key flag
    pub fn primary_key(mut self, pk: bool) -> Self {
        self.primary_key = pk;
        self
    }

    /// Set unique flag
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// A column is constrained if it is backed by a uniqueness index
    pub fn is_constrained(&self) -> bool {
        self.primary_key || self.unique
    }
}

/// Table schema - the ordered column list plus a name lookup map
#[derive(Debug, Clone)]
pub struct Schema {
    /// Ordered list of columns
    columns: Vec<Column>,
    /// Column name to position mapping
    name_to_index: HashMap<String, usize>,
}

impl Schema {
    /// Build a schema from a column list.
    ///
    /// Fails on duplicate column names or more than one primary key.
    pub fn from_columns(table: &str, columns: Vec<Column>) -> Result<Self> {
        let mut name_to_index = HashMap::new();
        let mut pk_count = 0;

        for (idx, col) in columns.iter().enumerate() {
            if name_to_index.insert(col.name.clone(), idx).is_some() {
                return Err(Error::DuplicateColumn(col.name.clone(), table.to_string()));
            }
            if col.primary_key {
                pk_count += 1;
                if pk_count > 1 {
                    return Err(Error::MultiplePrimaryKeys(table.to_string()));
                }
            }
        }

        Ok(Self {
            columns,
            name_to_index,
        })
    }

    /// Get column by name
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.name_to_index.get(name).map(|&idx| &self.columns[idx])
    }

    /// Get column position by name
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// Check if column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// Get all columns in declaration order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get column names in declaration order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get the primary key column name, if declared
    pub fn primary_key(&self) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.primary_key)
            .map(|c| c.name.as_str())
    }

    /// Get the UNIQUE column names (excluding the primary key)
    pub fn unique_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.unique && !c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Get the constrained (index-backed) columns in declaration order
    pub fn constrained_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_constrained()).collect()
    }
}
