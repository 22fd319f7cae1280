//! Storage engine module
//!
//! This module contains the row store and its supporting pieces:
//! - Tagged values
//! - Hash indexes for primary-key/unique constraints
//! - Tables (row arena + constraint-enforcing indexes)
//! - The database catalog with whole-state persistence

pub mod database;
pub mod index;
pub mod table;
pub mod value;

pub use database::Database;
pub use index::Index;
pub use table::{ResultRow, RowId, Table};
pub use value::Value;
