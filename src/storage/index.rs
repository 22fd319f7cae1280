//! Hash index for constraint enforcement and equality lookups
//!
//! An index maps a column's value to the set of row ids holding that
//! value. Unique indexes reject a second row for an already present
//! value. Row ids are permanent surrogate identifiers, so deleting a
//! row elsewhere in the table never requires touching entries for
//! other rows.

use std::collections::{HashMap, HashSet};

use super::table::RowId;
use super::value::Value;
use crate::error::{Error, Result};

/// A hash index over one column
#[derive(Debug, Clone)]
pub struct Index {
    /// Column this index covers
    column: String,
    /// Does this index enforce uniqueness?
    unique: bool,
    /// value -> set of row ids
    entries: HashMap<Value, HashSet<RowId>>,
}

impl Index {
    /// Create a new empty index
    pub fn new(column: impl Into<String>, unique: bool) -> Self {
        Self {
            column: column.into(),
            unique,
            entries: HashMap::new(),
        }
    }

    /// Add a row id under a value.
    ///
    /// Fails with a constraint violation if the index is unique and the
    /// value already maps to a row.
    pub fn insert(&mut self, value: &Value, row: RowId) -> Result<()> {
        if self.unique && self.entries.contains_key(value) {
            return Err(Error::ConstraintViolation {
                column: self.column.clone(),
                value: value.to_string(),
            });
        }
        self.entries.entry(value.clone()).or_default().insert(row);
        Ok(())
    }

    /// Remove a row id from a value's set, dropping the key once the set
    /// is empty. No-op if the value or row is absent.
    pub fn remove(&mut self, value: &Value, row: RowId) {
        if let Some(rows) = self.entries.get_mut(value) {
            rows.remove(&row);
            if rows.is_empty() {
                self.entries.remove(value);
            }
        }
    }

    /// Move a row from one value to another.
    ///
    /// No-op if the values are equal. Otherwise uniqueness is validated
    /// against the new value before anything is mutated; since
    /// `old != new`, an existing entry under `new` is necessarily a
    /// different row.
    pub fn update(&mut self, old: &Value, new: &Value, row: RowId) -> Result<()> {
        if old == new {
            return Ok(());
        }
        if self.unique && self.entries.contains_key(new) {
            return Err(Error::ConstraintViolation {
                column: self.column.clone(),
                value: new.to_string(),
            });
        }
        self.remove(old, row);
        self.entries.entry(new.clone()).or_default().insert(row);
        Ok(())
    }

    /// Row ids currently stored under a value. Absence of the key yields
    /// the empty set, never an error.
    pub fn lookup(&self, value: &Value) -> HashSet<RowId> {
        self.entries.get(value).cloned().unwrap_or_default()
    }

    /// Borrowing variant of [`lookup`](Self::lookup)
    pub fn rows_for(&self, value: &Value) -> Option<&HashSet<RowId>> {
        self.entries.get(value)
    }

    /// Is the index empty?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
