//! Statement parser
//!
//! Recursive-descent parser producing one command descriptor per
//! statement. Statements are pre-split by the caller on the terminator
//! character; a trailing semicolon is tolerated, trailing garbage is a
//! syntax error.

use super::ast::*;
use super::lexer::Lexer;
use super::token::Token;
use crate::catalog::DataType;
use crate::error::{Error, Result};
use crate::storage::Value;

/// Statement parser
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    /// Create a new parser from statement text
    pub fn new(sql: &str) -> Result<Self> {
        let mut lexer = Lexer::new(sql);
        let tokens = lexer.tokenize()?;

        Ok(Self {
            tokens,
            position: 0,
        })
    }

    /// Parse a single statement
    pub fn parse(&mut self) -> Result<Statement> {
        let stmt = self.parse_statement()?;

        // Consume optional semicolon
        if self.check(&Token::Semicolon) {
            self.advance();
        }
        // Nothing else may follow
        if !self.check(&Token::Eof) {
            return Err(Error::UnexpectedToken {
                expected: "end of statement".to_string(),
                found: format!("{}", self.current()),
            });
        }

        Ok(stmt)
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.current() {
            Token::Create => self.parse_create_table().map(Statement::CreateTable),
            Token::Insert => self.parse_insert().map(Statement::Insert),
            Token::Select => self.parse_select().map(Statement::Select),
            Token::Update => self.parse_update().map(Statement::Update),
            Token::Delete => self.parse_delete().map(Statement::Delete),
            Token::Drop => self.parse_drop_table().map(Statement::DropTable),
            _ => Err(Error::UnexpectedToken {
                expected: "CREATE, INSERT, SELECT, UPDATE, DELETE, or DROP".to_string(),
                found: format!("{}", self.current()),
            }),
        }
    }

    // ========== CREATE TABLE ==========

    fn parse_create_table(&mut self) -> Result<CreateTableStatement> {
        self.expect(&Token::Create)?;
        self.expect(&Token::Table)?;
        let table_name = self.expect_identifier()?;
        self.expect(&Token::LParen)?;

        let mut columns = Vec::new();
        let mut saw_primary_key = false;
        loop {
            let column = self.parse_column_def()?;
            if column.primary_key {
                if saw_primary_key {
                    return Err(Error::MultiplePrimaryKeys(table_name));
                }
                saw_primary_key = true;
            }
            columns.push(column);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        self.expect(&Token::RParen)?;

        Ok(CreateTableStatement {
            table_name,
            columns,
        })
    }

    fn parse_column_def(&mut self) -> Result<ColumnDef> {
        let name = self.expect_identifier()?;
        let data_type = self.parse_data_type()?;

        let mut primary_key = false;
        let mut unique = false;
        loop {
            if self.check(&Token::Primary) {
                self.advance();
                self.expect(&Token::Key)?;
                primary_key = true;
            } else if self.check(&Token::Unique) {
                self.advance();
                unique = true;
            } else {
                break;
            }
        }

        Ok(ColumnDef {
            name,
            data_type,
            primary_key,
            unique,
        })
    }

    fn parse_data_type(&mut self) -> Result<DataType> {
        // Type names are ordinary identifiers in this grammar
        if let Token::Identifier(name) = self.current() {
            if let Some(dt) = DataType::from_keyword(name) {
                self.advance();
                return Ok(dt);
            }
        }
        Err(Error::UnexpectedToken {
            expected: "data type".to_string(),
            found: format!("{}", self.current()),
        })
    }

    // ========== INSERT ==========

    fn parse_insert(&mut self) -> Result<InsertStatement> {
        self.expect(&Token::Insert)?;
        self.expect(&Token::Into)?;
        let table_name = self.expect_identifier()?;
        self.expect(&Token::Values)?;
        self.expect(&Token::LParen)?;

        let mut values = Vec::new();
        loop {
            values.push(self.parse_literal()?);
            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        self.expect(&Token::RParen)?;

        Ok(InsertStatement { table_name, values })
    }

    // ========== SELECT ==========

    fn parse_select(&mut self) -> Result<SelectStatement> {
        self.expect(&Token::Select)?;

        let columns = if self.check(&Token::Asterisk) {
            self.advance();
            None
        } else {
            let mut cols = Vec::new();
            loop {
                cols.push(self.parse_column_ref()?);
                if !self.check(&Token::Comma) {
                    break;
                }
                self.advance();
            }
            Some(cols)
        };

        self.expect(&Token::From)?;
        let table_name = self.expect_identifier()?;

        let join = if self.check(&Token::Join) {
            self.advance();
            let join_table = self.expect_identifier()?;
            self.expect(&Token::On)?;
            let on_left = self.parse_column_ref()?;
            self.expect(&Token::Eq)?;
            let on_right = self.parse_column_ref()?;
            Some(JoinClause {
                table_name: join_table,
                on_left,
                on_right,
            })
        } else {
            None
        };

        let where_clause = self.parse_where_clause()?;

        Ok(SelectStatement {
            table_name,
            columns,
            join,
            where_clause,
        })
    }

    // ========== UPDATE ==========

    fn parse_update(&mut self) -> Result<UpdateStatement> {
        self.expect(&Token::Update)?;
        let table_name = self.expect_identifier()?;
        self.expect(&Token::Set)?;

        let mut assignments = Vec::new();
        loop {
            let column = self.expect_identifier()?;
            self.expect(&Token::Eq)?;
            let value = self.parse_literal()?;
            assignments.push(Assignment { column, value });

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        let where_clause = self.parse_where_clause()?;

        Ok(UpdateStatement {
            table_name,
            assignments,
            where_clause,
        })
    }

    // ========== DELETE ==========

    fn parse_delete(&mut self) -> Result<DeleteStatement> {
        self.expect(&Token::Delete)?;
        self.expect(&Token::From)?;
        let table_name = self.expect_identifier()?;
        let where_clause = self.parse_where_clause()?;

        Ok(DeleteStatement {
            table_name,
            where_clause,
        })
    }

    // ========== DROP TABLE ==========

    fn parse_drop_table(&mut self) -> Result<DropTableStatement> {
        self.expect(&Token::Drop)?;
        self.expect(&Token::Table)?;
        let table_name = self.expect_identifier()?;

        Ok(DropTableStatement { table_name })
    }

    // ========== Clauses ==========

    /// `WHERE <ref> = <literal> (AND <ref> = <literal>)*`, or empty
    fn parse_where_clause(&mut self) -> Result<Vec<Condition>> {
        let mut conditions = Vec::new();
        if !self.check(&Token::Where) {
            return Ok(conditions);
        }
        self.advance();

        loop {
            let column = self.parse_column_ref()?;
            self.expect(&Token::Eq)?;
            let value = self.parse_literal()?;
            conditions.push(Condition { column, value });

            if !self.check(&Token::And) {
                break;
            }
            self.advance();
        }

        Ok(conditions)
    }

    /// `<ident>` or `<ident>.<ident>`
    fn parse_column_ref(&mut self) -> Result<ColumnRef> {
        let first = self.expect_identifier()?;
        if self.check(&Token::Dot) {
            self.advance();
            let column = self.expect_identifier()?;
            Ok(ColumnRef::qualified(first, column))
        } else {
            Ok(ColumnRef::bare(first))
        }
    }

    /// A typed literal; the token kind decides the value's tag
    fn parse_literal(&mut self) -> Result<Value> {
        let value = match self.current().clone() {
            Token::IntegerLiteral(n) => Value::Integer(n),
            Token::FloatLiteral(n) => Value::Float(n),
            Token::StringLiteral(s) => Value::Text(s),
            Token::True => Value::Boolean(true),
            Token::False => Value::Boolean(false),
            other => {
                return Err(Error::UnexpectedToken {
                    expected: "literal value".to_string(),
                    found: format!("{}", other),
                })
            }
        };
        self.advance();
        Ok(value)
    }

    // ========== Helpers ==========

    fn current(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn check(&self, token: &Token) -> bool {
        self.current() == token
    }

    fn expect(&mut self, token: &Token) -> Result<()> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else if self.check(&Token::Eof) {
            Err(Error::UnexpectedEof(format!("{}", token)))
        } else {
            Err(Error::UnexpectedToken {
                expected: format!("{}", token),
                found: format!("{}", self.current()),
            })
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        match self.current().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            Token::Eof => Err(Error::UnexpectedEof("identifier".to_string())),
            other => Err(Error::UnexpectedToken {
                expected: "identifier".to_string(),
                found: format!("{}", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sql: &str) -> Result<Statement> {
        Parser::new(sql)?.parse()
    }

    #[test]
    fn test_parse_create_table() {
        let stmt = parse(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, email TEXT UNIQUE)",
        )
        .unwrap();

        let Statement::CreateTable(create) = stmt else {
            panic!("expected CREATE TABLE");
        };
        assert_eq!(create.table_name, "users");
        assert_eq!(create.columns.len(), 3);
        assert!(create.columns[0].primary_key);
        assert_eq!(create.columns[0].data_type, DataType::Integer);
        assert!(!create.columns[1].primary_key);
        assert!(create.columns[2].unique);
    }

    #[test]
    fn test_parse_create_table_rejects_two_primary_keys() {
        let err = parse("CREATE TABLE t (a INTEGER PRIMARY KEY, b INTEGER PRIMARY KEY)")
            .unwrap_err();
        assert!(matches!(err, Error::MultiplePrimaryKeys(_)));
    }

    #[test]
    fn test_parse_create_table_rejects_unknown_type() {
        let err = parse("CREATE TABLE t (a BLOB)").unwrap_err();
        assert!(matches!(err, Error::UnexpectedToken { .. }));
    }

    #[test]
    fn test_parse_insert_literal_tags() {
        let stmt = parse("INSERT INTO t VALUES (1, 'Alice', 3.5, true, -2)").unwrap();
        let Statement::Insert(insert) = stmt else {
            panic!("expected INSERT");
        };
        assert_eq!(insert.table_name, "t");
        assert_eq!(
            insert.values,
            vec![
                Value::Integer(1),
                Value::Text("Alice".into()),
                Value::Float(3.5),
                Value::Boolean(true),
                Value::Integer(-2),
            ]
        );
    }

    #[test]
    fn test_parse_select_star() {
        let stmt = parse("SELECT * FROM users;").unwrap();
        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        assert_eq!(select.table_name, "users");
        assert!(select.columns.is_none());
        assert!(select.join.is_none());
        assert!(select.where_clause.is_empty());
    }

    #[test]
    fn test_parse_select_columns_and_where() {
        let stmt = parse("SELECT id, name FROM users WHERE id = 1 AND name = 'Bob'").unwrap();
        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        assert_eq!(
            select.columns,
            Some(vec![ColumnRef::bare("id"), ColumnRef::bare("name")])
        );
        assert_eq!(select.where_clause.len(), 2);
        assert_eq!(select.where_clause[1].value, Value::Text("Bob".into()));
    }

    #[test]
    fn test_parse_select_join() {
        let stmt = parse(
            "SELECT users.name, orders.item FROM users JOIN orders ON users.id = orders.uid",
        )
        .unwrap();
        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        let join = select.join.unwrap();
        assert_eq!(join.table_name, "orders");
        assert_eq!(join.on_left, ColumnRef::qualified("users", "id"));
        assert_eq!(join.on_right, ColumnRef::qualified("orders", "uid"));
        assert_eq!(
            select.columns,
            Some(vec![
                ColumnRef::qualified("users", "name"),
                ColumnRef::qualified("orders", "item"),
            ])
        );
    }

    #[test]
    fn test_parse_join_with_unqualified_on() {
        let stmt = parse("SELECT * FROM users JOIN orders ON id = uid").unwrap();
        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        let join = select.join.unwrap();
        assert_eq!(join.on_left, ColumnRef::bare("id"));
        assert_eq!(join.on_right, ColumnRef::bare("uid"));
    }

    #[test]
    fn test_parse_update() {
        let stmt = parse("UPDATE users SET name = 'X', age = 3 WHERE id = 7").unwrap();
        let Statement::Update(update) = stmt else {
            panic!("expected UPDATE");
        };
        assert_eq!(update.table_name, "users");
        assert_eq!(update.assignments.len(), 2);
        assert_eq!(update.assignments[0].column, "name");
        assert_eq!(update.where_clause.len(), 1);
    }

    #[test]
    fn test_parse_delete_without_where() {
        let stmt = parse("DELETE FROM users").unwrap();
        let Statement::Delete(delete) = stmt else {
            panic!("expected DELETE");
        };
        assert_eq!(delete.table_name, "users");
        assert!(delete.where_clause.is_empty());
    }

    #[test]
    fn test_parse_drop_table() {
        let stmt = parse("DROP TABLE users").unwrap();
        assert_eq!(
            stmt,
            Statement::DropTable(DropTableStatement {
                table_name: "users".to_string()
            })
        );
    }

    #[test]
    fn test_unknown_leading_keyword() {
        let err = parse("EXPLAIN SELECT * FROM t").unwrap_err();
        assert!(matches!(err, Error::UnexpectedToken { .. }));
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        let err = parse("DROP TABLE users users2").unwrap_err();
        assert!(matches!(err, Error::UnexpectedToken { .. }));
    }

    #[test]
    fn test_truncated_statement() {
        let err = parse("INSERT INTO t VALUES (1,").unwrap_err();
        assert!(matches!(err, Error::UnexpectedToken { .. } | Error::UnexpectedEof(_)));
    }
}
