//! Statement parsing module
//!
//! This module contains the lexer, parser, and AST for the fixed
//! single-statement grammar.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::Statement;
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::Token;
