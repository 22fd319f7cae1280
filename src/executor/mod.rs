//! Statement execution module
//!
//! Routes parsed statements to database and table operations and
//! packages every outcome, success or failure, as a [`QueryResult`].

pub mod executor;

pub use executor::{Executor, QueryResult};
