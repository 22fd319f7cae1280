//! Persistence behavior through the executor: save-on-mutation,
//! reload fidelity, and corrupt-file handling.

use std::fs;

use relite::error::Error;
use relite::executor::Executor;
use relite::storage::{Database, Value};
use tempfile::TempDir;

#[test]
fn test_mutations_round_trip_through_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");

    {
        let mut executor = Executor::open(&path).unwrap();
        executor.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, email TEXT UNIQUE)");
        executor.execute("INSERT INTO users VALUES (1, 'Alice', 'a@x.com')");
        executor.execute("INSERT INTO users VALUES (2, 'Bob', 'b@x.com')");
        executor.execute("DELETE FROM users WHERE id = 1");
        executor.execute("UPDATE users SET name = 'Bobby' WHERE id = 2");
    }

    // Fresh executor over the same file sees the committed state
    let mut executor = Executor::open(&path).unwrap();
    let result = executor.execute("SELECT * FROM users");
    assert!(!result.is_error(), "{:?}", result.error);
    assert_eq!(
        result.rows,
        vec![vec![
            Value::Integer(2),
            Value::Text("Bobby".into()),
            Value::Text("b@x.com".into()),
        ]]
    );

    // Constraints survive the reload
    let result = executor.execute("INSERT INTO users VALUES (3, 'Eve', 'b@x.com')");
    assert!(result.is_error());
}

#[test]
fn test_failed_statement_does_not_rewrite_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");

    let mut executor = Executor::open(&path).unwrap();
    executor.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)");
    executor.execute("INSERT INTO t VALUES (1)");
    let before = fs::read_to_string(&path).unwrap();

    let result = executor.execute("INSERT INTO t VALUES (1)");
    assert!(result.is_error());
    let after = fs::read_to_string(&path).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_select_does_not_create_a_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");

    let mut executor = Executor::open(&path).unwrap();
    let result = executor.execute("SELECT * FROM t");
    assert!(result.is_error());
    assert!(!path.exists());
}

#[test]
fn test_truncated_file_fails_loudly() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");

    {
        let mut executor = Executor::open(&path).unwrap();
        executor.execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)");
        executor.execute("INSERT INTO t VALUES (1, 'a')");
    }

    // Chop the file mid-document
    let contents = fs::read_to_string(&path).unwrap();
    fs::write(&path, &contents[..contents.len() / 2]).unwrap();

    let err = Database::load_from_file(&path).unwrap_err();
    assert!(matches!(err, Error::CorruptFile(_)), "got: {:?}", err);

    let err = Executor::open(&path).unwrap_err();
    assert!(matches!(err, Error::CorruptFile(_)));
}

#[test]
fn test_missing_file_is_an_io_error_on_direct_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.json");

    let err = Database::load_from_file(&path).unwrap_err();
    assert!(matches!(err, Error::IoError(_)));
}

#[test]
fn test_file_format_is_plain_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");

    let mut executor = Executor::open(&path).unwrap();
    executor.execute("CREATE TABLE t (id INTEGER PRIMARY KEY, score FLOAT, ok BOOLEAN)");
    executor.execute("INSERT INTO t VALUES (1, 9.5, true)");

    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let table = &doc["tables"]["t"];
    assert_eq!(table["primary_key"], serde_json::json!("id"));
    assert_eq!(table["columns"][1], serde_json::json!(["score", "FLOAT"]));
    assert_eq!(table["rows"][0], serde_json::json!([1, 9.5, true]));
}
