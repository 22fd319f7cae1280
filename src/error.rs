//! Error types for relite
//!
//! One enum covers every failure the engine can produce: malformed
//! statement text, schema mismatches, constraint violations, join
//! reference resolution failures, and persistence I/O. Everything is
//! caught at the executor boundary and rendered as a textual error
//! result; nothing propagates past `Executor::execute`.

use thiserror::Error;

/// The main error type for relite
#[derive(Error, Debug)]
pub enum Error {
    // ========== Lexer Errors ==========
    #[error("Syntax error: unexpected character '{0}' at position {1}")]
    UnexpectedCharacter(char, usize),

    #[error("Syntax error: unterminated string literal starting at position {0}")]
    UnterminatedString(usize),

    #[error("Syntax error: invalid number format at position {0}")]
    InvalidNumber(usize),

    // ========== Parser Errors ==========
    #[error("Syntax error: unexpected token '{found}', expected {expected}")]
    UnexpectedToken { expected: String, found: String },

    #[error("Syntax error: unexpected end of input, expected {0}")]
    UnexpectedEof(String),

    #[error("Syntax error: {0}")]
    SyntaxError(String),

    #[error("Syntax error: multiple primary keys defined for table '{0}'")]
    MultiplePrimaryKeys(String),

    // ========== Schema Errors ==========
    #[error("Schema error: table '{0}' not found")]
    TableNotFound(String),

    #[error("Schema error: table '{0}' already exists")]
    TableAlreadyExists(String),

    #[error("Schema error: column '{0}' not found in table '{1}'")]
    ColumnNotFound(String, String),

    #[error("Schema error: duplicate column '{0}' in table '{1}'")]
    DuplicateColumn(String, String),

    #[error("Schema error: table '{table}' expects {expected} values, got {found}")]
    ColumnCountMismatch {
        table: String,
        expected: usize,
        found: usize,
    },

    #[error("Type error: column '{column}' is {expected}, got {found}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    // ========== Constraint Errors ==========
    #[error("Constraint violation: duplicate value {value} for unique column '{column}'")]
    ConstraintViolation { column: String, value: String },

    // ========== Resolution Errors ==========
    #[error("Resolution error: column '{0}' is ambiguous, qualify it as table.column")]
    AmbiguousColumn(String),

    #[error("Resolution error: cannot resolve column reference '{0}'")]
    UnresolvedColumn(String),

    // ========== Storage Errors ==========
    #[error("Storage error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Storage error: database file is corrupt: {0}")]
    CorruptFile(String),

    #[error("Storage error: serialization failed: {0}")]
    Serialization(String),
}

/// Result type alias for relite operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::TableNotFound("users".to_string());
        assert_eq!(err.to_string(), "Schema error: table 'users' not found");

        let err = Error::UnexpectedCharacter('@', 5);
        assert_eq!(
            err.to_string(),
            "Syntax error: unexpected character '@' at position 5"
        );

        let err = Error::ConstraintViolation {
            column: "id".to_string(),
            value: "1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Constraint violation: duplicate value 1 for unique column 'id'"
        );
    }
}
