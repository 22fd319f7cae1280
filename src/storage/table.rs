//! Table storage for relite
//!
//! A table owns its schema, an insertion-ordered row arena, and one
//! hash index per constrained (primary-key/unique) column.
//!
//! Rows are addressed by a permanent surrogate [`RowId`] assigned at
//! insertion and never reused. Index entries are keyed by row id, not
//! by physical position, so deleting a row never requires re-keying
//! entries for other rows. Scans iterate the arena in insertion order,
//! which is what callers observe as row order.

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

use super::index::Index;
use super::value::Value;
use crate::catalog::{Column, Schema};
use crate::error::{Error, Result};

/// Permanent surrogate identifier for a row within one table
pub type RowId = u64;

/// A materialized result row: column name -> value, in projection order
pub type ResultRow = IndexMap<String, Value>;

/// A table: schema, ordered row arena, and constraint indexes
#[derive(Debug, Clone)]
pub struct Table {
    /// Table name
    name: String,
    /// Fixed schema
    schema: Schema,
    /// Row arena in insertion order
    rows: IndexMap<RowId, Vec<Value>>,
    /// One index per constrained column, keyed by column name
    indexes: HashMap<String, Index>,
    /// Next row id to hand out
    next_row_id: RowId,
}

impl Table {
    /// Create an empty table. Indexes are built from the schema's
    /// primary-key/unique columns.
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        let name = name.into();
        let indexes = schema
            .constrained_columns()
            .iter()
            .map(|col| (col.name.clone(), Index::new(&col.name, true)))
            .collect();

        Self {
            name,
            schema,
            rows: IndexMap::new(),
            indexes,
            next_row_id: 0,
        }
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Table schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Columns in declaration order (schema introspection)
    pub fn columns(&self) -> &[Column] {
        self.schema.columns()
    }

    /// Primary key column name, if declared
    pub fn primary_key(&self) -> Option<&str> {
        self.schema.primary_key()
    }

    /// UNIQUE column names, excluding the primary key
    pub fn unique_columns(&self) -> Vec<&str> {
        self.schema.unique_columns()
    }

    /// Number of live rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The index on a column, if one exists
    pub fn index(&self, column: &str) -> Option<&Index> {
        self.indexes.get(column)
    }

    fn column_position(&self, name: &str) -> Result<usize> {
        self.schema
            .get_column_index(name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string(), self.name.clone()))
    }

    /// (column name, position) pairs for constrained columns, schema order
    fn constrained_positions(&self) -> Vec<(String, usize)> {
        self.schema
            .constrained_columns()
            .iter()
            .filter_map(|col| {
                self.schema
                    .get_column_index(&col.name)
                    .map(|pos| (col.name.clone(), pos))
            })
            .collect()
    }

    /// Validate arity and conform each value to its declared column type
    fn conform_row(&self, values: Vec<Value>) -> Result<Vec<Value>> {
        if values.len() != self.schema.column_count() {
            return Err(Error::ColumnCountMismatch {
                table: self.name.clone(),
                expected: self.schema.column_count(),
                found: values.len(),
            });
        }
        values
            .into_iter()
            .zip(self.schema.columns())
            .map(|(value, col)| value.conform_to(&col.name, col.data_type))
            .collect()
    }

    // ========== Insert ==========

    /// Insert a row.
    ///
    /// All constrained columns are validated through their indexes before
    /// the row is stored; if any index rejects the value, entries already
    /// added for this call are rolled back and nothing changes.
    pub fn insert_row(&mut self, values: Vec<Value>) -> Result<RowId> {
        let values = self.conform_row(values)?;
        let row_id = self.next_row_id;
        let constrained = self.constrained_positions();

        let mut applied: Vec<(String, usize)> = Vec::new();
        for (col, pos) in &constrained {
            if let Some(index) = self.indexes.get_mut(col.as_str()) {
                if let Err(e) = index.insert(&values[*pos], row_id) {
                    for (c, p) in &applied {
                        if let Some(ix) = self.indexes.get_mut(c.as_str()) {
                            ix.remove(&values[*p], row_id);
                        }
                    }
                    return Err(e);
                }
                applied.push((col.clone(), *pos));
            }
        }

        self.rows.insert(row_id, values);
        self.next_row_id += 1;
        Ok(row_id)
    }

    // ========== Matching ==========

    /// Validate condition columns and conform each literal to its
    /// column's declared type, so a predicate matches by the same rules
    /// the value was stored under (an integer literal finds the FLOAT
    /// it became on insert).
    fn conform_conditions(&self, conditions: &[(String, Value)]) -> Result<Vec<(String, Value)>> {
        conditions
            .iter()
            .map(|(col, value)| {
                let pos = self.column_position(col)?;
                let expected = self.schema.columns()[pos].data_type;
                value
                    .clone()
                    .conform_to(col, expected)
                    .map(|v| (col.clone(), v))
            })
            .collect()
    }

    /// Narrow the scan with indexed predicates: intersect the candidate
    /// sets of every indexed condition, short-circuiting once empty.
    /// `None` means "no indexed predicate, scan everything".
    fn candidate_rows(&self, conditions: &[(String, Value)]) -> Option<HashSet<RowId>> {
        let mut candidates: Option<HashSet<RowId>> = None;

        for (col, value) in conditions {
            if let Some(index) = self.indexes.get(col) {
                let rows = index.lookup(value);
                candidates = Some(match candidates {
                    None => rows,
                    Some(prev) => prev.intersection(&rows).copied().collect(),
                });
                if candidates.as_ref().is_some_and(|c| c.is_empty()) {
                    break;
                }
            }
        }

        candidates
    }

    /// Re-check every condition against the stored row. Candidates from
    /// an index are verified here as well.
    fn row_matches(&self, row: &[Value], conditions: &[(String, Value)]) -> bool {
        conditions.iter().all(|(col, value)| {
            self.schema
                .get_column_index(col)
                .is_some_and(|pos| &row[pos] == value)
        })
    }

    /// Row ids matching the conditions, snapshotted in storage order
    fn matching_row_ids(&self, conditions: &[(String, Value)]) -> Result<Vec<RowId>> {
        let conditions = self.conform_conditions(conditions)?;
        let candidates = self.candidate_rows(&conditions);

        Ok(self
            .rows
            .iter()
            .filter(|(id, _)| candidates.as_ref().is_none_or(|c| c.contains(id)))
            .filter(|(_, row)| self.row_matches(row, &conditions))
            .map(|(id, _)| *id)
            .collect())
    }

    // ========== Select ==========

    /// Select rows matching the equality conditions, projected to the
    /// requested columns (`None` = all columns in schema order), in
    /// storage order.
    pub fn select(
        &self,
        columns: Option<&[String]>,
        conditions: &[(String, Value)],
    ) -> Result<Vec<ResultRow>> {
        let projection = self.resolve_projection(columns)?;
        let ids = self.matching_row_ids(conditions)?;

        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(row) = self.rows.get(&id) {
                let mut out = ResultRow::new();
                for (name, pos) in &projection {
                    out.insert(name.clone(), row[*pos].clone());
                }
                results.push(out);
            }
        }
        Ok(results)
    }

    /// Resolve a projection to (name, position) pairs
    pub(crate) fn resolve_projection(
        &self,
        columns: Option<&[String]>,
    ) -> Result<Vec<(String, usize)>> {
        match columns {
            None => Ok(self
                .schema
                .columns()
                .iter()
                .enumerate()
                .map(|(pos, col)| (col.name.clone(), pos))
                .collect()),
            Some(names) => names
                .iter()
                .map(|name| self.column_position(name).map(|pos| (name.clone(), pos)))
                .collect(),
        }
    }

    // ========== Delete ==========

    /// Delete rows matching the conditions. Returns the count removed.
    ///
    /// Index entries are keyed by row id, so removing one row never
    /// disturbs the entries of another.
    pub fn delete(&mut self, conditions: &[(String, Value)]) -> Result<usize> {
        let targets = self.matching_row_ids(conditions)?;
        let constrained = self.constrained_positions();

        let mut count = 0;
        for id in targets {
            let row = match self.rows.get(&id) {
                Some(row) => row.clone(),
                None => continue,
            };
            for (col, pos) in &constrained {
                if let Some(index) = self.indexes.get_mut(col.as_str()) {
                    index.remove(&row[*pos], id);
                }
            }
            self.rows.shift_remove(&id);
            count += 1;
        }
        Ok(count)
    }

    // ========== Update ==========

    /// Update rows matching the conditions. Returns the count updated.
    ///
    /// Each row is updated atomically: if a constrained column's new
    /// value collides with another row, index changes already applied
    /// for that row are undone and the call aborts. Rows committed
    /// earlier in the same call stay updated.
    pub fn update(
        &mut self,
        assignments: &[(String, Value)],
        conditions: &[(String, Value)],
    ) -> Result<usize> {
        // Validate and conform the SET list up front
        let mut set: Vec<(usize, Value)> = Vec::with_capacity(assignments.len());
        for (col, value) in assignments {
            let pos = self.column_position(col)?;
            let expected = self.schema.columns()[pos].data_type;
            set.push((pos, value.clone().conform_to(col, expected)?));
        }

        let targets = self.matching_row_ids(conditions)?;
        let constrained = self.constrained_positions();

        let mut count = 0;
        for id in targets {
            let old_row = match self.rows.get(&id) {
                Some(row) => row.clone(),
                None => continue,
            };
            let mut new_row = old_row.clone();
            for (pos, value) in &set {
                new_row[*pos] = value.clone();
            }

            // Apply index moves for changed constrained columns; undo on failure
            let mut applied: Vec<(String, usize)> = Vec::new();
            for (col, pos) in &constrained {
                if old_row[*pos] == new_row[*pos] {
                    continue;
                }
                if let Some(index) = self.indexes.get_mut(col.as_str()) {
                    if let Err(e) = index.update(&old_row[*pos], &new_row[*pos], id) {
                        for (c, p) in applied.iter().rev() {
                            if let Some(ix) = self.indexes.get_mut(c.as_str()) {
                                // Moving back cannot collide: the old slot was just vacated
                                let _ = ix.update(&new_row[*p], &old_row[*p], id);
                            }
                        }
                        return Err(e);
                    }
                    applied.push((col.clone(), *pos));
                }
            }

            // IndexMap::insert on an existing key replaces in place
            self.rows.insert(id, new_row);
            count += 1;
        }
        Ok(count)
    }

    // ========== Join ==========

    /// Inner join with another table on `self.left_col = other.right_col`.
    ///
    /// Joined rows carry `table.column` keys for both sides. The
    /// requested projection and the conditions must use those qualified
    /// keys (the executor resolves loose references beforehand). Reuses
    /// `other`'s index on the join column when one exists; otherwise a
    /// transient value -> rows map is built for the call.
    pub fn inner_join(
        &self,
        other: &Table,
        left_col: &str,
        right_col: &str,
        columns: Option<&[String]>,
        conditions: &[(String, Value)],
    ) -> Result<Vec<ResultRow>> {
        let left_pos = self.column_position(left_col)?;
        let right_pos = other.column_position(right_col)?;

        // Every joined row has the same key set; validate references once
        let joined_keys = self.joined_column_keys(other);
        if let Some(names) = columns {
            for name in names {
                if !joined_keys.iter().any(|k| k == name) {
                    return Err(Error::UnresolvedColumn(name.clone()));
                }
            }
        }
        let mut conditions: Vec<(String, Value)> = conditions.to_vec();
        for (key, value) in &mut conditions {
            if !joined_keys.iter().any(|k| k == key) {
                return Err(Error::UnresolvedColumn(key.clone()));
            }
            // Conform the literal to the referenced column's declared type
            let (table, col) = key.split_once('.').unwrap_or(("", key.as_str()));
            let side = if table == self.name { self } else { other };
            if let Some(column) = side.schema.get_column(col) {
                *value = value.clone().conform_to(col, column.data_type)?;
            }
        }

        // Probe side: reuse other's index, or build a transient map
        let transient: Option<HashMap<&Value, Vec<RowId>>> = if other.index(right_col).is_some() {
            None
        } else {
            let mut map: HashMap<&Value, Vec<RowId>> = HashMap::new();
            for (id, row) in &other.rows {
                map.entry(&row[right_pos]).or_default().push(*id);
            }
            Some(map)
        };

        let right_type = other.schema.columns()[right_pos].data_type;

        let mut results = Vec::new();
        for left_row in self.rows.values() {
            // Probe with the left value conformed to the right column's
            // type; incomparable types simply never match
            let probe = match left_row[left_pos].clone().conform_to(right_col, right_type) {
                Ok(value) => value,
                Err(_) => continue,
            };

            // Matching right row ids, in right-table storage order
            let matches: Vec<RowId> = match (&transient, other.index(right_col)) {
                (Some(map), _) => map.get(&probe).cloned().unwrap_or_default(),
                (None, Some(index)) => {
                    let mut ids: Vec<RowId> = index
                        .rows_for(&probe)
                        .map(|rows| rows.iter().copied().collect())
                        .unwrap_or_default();
                    ids.sort_by_key(|id| other.rows.get_index_of(id));
                    ids
                }
                (None, None) => Vec::new(),
            };

            for right_id in matches {
                let right_row = match other.rows.get(&right_id) {
                    Some(row) => row,
                    None => continue,
                };

                let mut joined = ResultRow::new();
                for (col, value) in self.schema.columns().iter().zip(left_row) {
                    joined.insert(format!("{}.{}", self.name, col.name), value.clone());
                }
                for (col, value) in other.schema.columns().iter().zip(right_row) {
                    joined.insert(format!("{}.{}", other.name, col.name), value.clone());
                }

                let matched = conditions
                    .iter()
                    .all(|(col, value)| joined.get(col) == Some(value));
                if !matched {
                    continue;
                }

                if let Some(names) = columns {
                    let mut projected = ResultRow::new();
                    for name in names {
                        if let Some(value) = joined.get(name) {
                            projected.insert(name.clone(), value.clone());
                        }
                    }
                    results.push(projected);
                } else {
                    results.push(joined);
                }
            }
        }

        Ok(results)
    }

    /// All qualified `table.column` keys a join against this pair of
    /// tables produces, left side first
    pub fn joined_column_keys(&self, other: &Table) -> Vec<String> {
        self.schema
            .columns()
            .iter()
            .map(|c| format!("{}.{}", self.name, c.name))
            .chain(
                other
                    .schema
                    .columns()
                    .iter()
                    .map(|c| format!("{}.{}", other.name, c.name)),
            )
            .collect()
    }

    /// Row values in storage order (persistence snapshot)
    pub(crate) fn row_values(&self) -> impl Iterator<Item = &Vec<Value>> {
        self.rows.values()
    }
}
