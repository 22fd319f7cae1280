//! relite - A minimal embeddable relational data engine
//!
//! This library provides the core components of a small SQL engine:
//! - Statement parsing (lexer, parser, AST)
//! - Typed row storage with primary-key/unique hash indexes
//! - Equality-filtered queries and two-table inner joins
//! - Whole-database persistence to a JSON file
//!
//! The engine is meant to be embedded: a caller (console shell, web
//! handler) feeds statement text to [`executor::Executor::execute`] and
//! renders the uniform [`executor::QueryResult`] it gets back. No error
//! ever escapes that boundary.

pub mod catalog;
pub mod error;
pub mod executor;
pub mod sql;
pub mod storage;

pub use error::{Error, Result};
