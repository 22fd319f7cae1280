//! End-to-end statement execution through the public executor surface.

use relite::executor::Executor;
use relite::storage::Value;

fn exec_ok(executor: &mut Executor, sql: &str) {
    let result = executor.execute(sql);
    assert!(
        !result.is_error(),
        "statement failed: {} -> {:?}",
        sql,
        result.error
    );
}

#[test]
fn test_duplicate_primary_key_leaves_table_intact() {
    let mut executor = Executor::new();
    exec_ok(
        &mut executor,
        "CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)",
    );
    exec_ok(&mut executor, "INSERT INTO t VALUES (1, 'Alice')");

    let result = executor.execute("INSERT INTO t VALUES (1, 'Bob')");
    assert!(result.is_error());
    assert!(result.error.as_deref().unwrap().starts_with("Error: "));

    let result = executor.execute("SELECT * FROM t");
    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0][1], Value::Text("Alice".into()));
}

#[test]
fn test_delete_keeps_index_consistent_for_later_rows() {
    let mut executor = Executor::new();
    exec_ok(
        &mut executor,
        "CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)",
    );
    exec_ok(&mut executor, "INSERT INTO t VALUES (1, 'a')");
    exec_ok(&mut executor, "INSERT INTO t VALUES (2, 'b')");
    exec_ok(&mut executor, "INSERT INTO t VALUES (3, 'c')");

    let result = executor.execute("DELETE FROM t WHERE id = 2");
    assert_eq!(result.affected_rows, 1);

    let result = executor.execute("SELECT * FROM t");
    let ids: Vec<&Value> = result.rows.iter().map(|r| &r[0]).collect();
    assert_eq!(ids, vec![&Value::Integer(1), &Value::Integer(3)]);

    // The indexed lookup for the surviving later row still works
    let result = executor.execute("SELECT * FROM t WHERE id = 3");
    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0][1], Value::Text("c".into()));
}

#[test]
fn test_inner_join_skips_users_without_orders() {
    let mut executor = Executor::new();
    exec_ok(
        &mut executor,
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)",
    );
    exec_ok(
        &mut executor,
        "CREATE TABLE orders (oid INTEGER PRIMARY KEY, uid INTEGER, item TEXT)",
    );
    exec_ok(&mut executor, "INSERT INTO users VALUES (1, 'Alice')");
    exec_ok(&mut executor, "INSERT INTO users VALUES (2, 'Bob')");
    exec_ok(&mut executor, "INSERT INTO users VALUES (3, 'Carol')");
    exec_ok(&mut executor, "INSERT INTO orders VALUES (10, 1, 'book')");
    exec_ok(&mut executor, "INSERT INTO orders VALUES (11, 1, 'lamp')");
    exec_ok(&mut executor, "INSERT INTO orders VALUES (12, 2, 'pen')");

    let result = executor.execute(
        "SELECT users.name, orders.item FROM users JOIN orders ON users.id = orders.uid",
    );
    assert!(!result.is_error(), "{:?}", result.error);
    assert_eq!(result.columns, vec!["users.name", "orders.item"]);
    // One joined row per order, none for the order-less user
    assert_eq!(result.rows.len(), 3);
    assert!(!result
        .rows
        .iter()
        .any(|r| r[0] == Value::Text("Carol".into())));
}

#[test]
fn test_join_with_where_filter() {
    let mut executor = Executor::new();
    exec_ok(
        &mut executor,
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)",
    );
    exec_ok(
        &mut executor,
        "CREATE TABLE orders (oid INTEGER PRIMARY KEY, uid INTEGER, item TEXT)",
    );
    exec_ok(&mut executor, "INSERT INTO users VALUES (1, 'Alice')");
    exec_ok(&mut executor, "INSERT INTO users VALUES (2, 'Bob')");
    exec_ok(&mut executor, "INSERT INTO orders VALUES (10, 1, 'book')");
    exec_ok(&mut executor, "INSERT INTO orders VALUES (11, 2, 'book')");

    let result = executor.execute(
        "SELECT * FROM users JOIN orders ON users.id = orders.uid WHERE users.name = 'Bob'",
    );
    assert_eq!(result.rows.len(), 1);
    assert_eq!(
        result.columns,
        vec![
            "users.id",
            "users.name",
            "orders.oid",
            "orders.uid",
            "orders.item"
        ]
    );
}

#[test]
fn test_update_without_match_reports_zero() {
    let mut executor = Executor::new();
    exec_ok(
        &mut executor,
        "CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)",
    );
    exec_ok(&mut executor, "INSERT INTO t VALUES (1, 'a')");

    let result = executor.execute("UPDATE t SET name = 'X' WHERE id = 999");
    assert!(!result.is_error());
    assert_eq!(result.affected_rows, 0);
    assert_eq!(result.message.as_deref(), Some("0 rows updated."));
}

#[test]
fn test_unique_constraint_on_update() {
    let mut executor = Executor::new();
    exec_ok(
        &mut executor,
        "CREATE TABLE t (id INTEGER PRIMARY KEY, email TEXT UNIQUE)",
    );
    exec_ok(&mut executor, "INSERT INTO t VALUES (1, 'a@x.com')");
    exec_ok(&mut executor, "INSERT INTO t VALUES (2, 'b@x.com')");

    let result = executor.execute("UPDATE t SET email = 'a@x.com' WHERE id = 2");
    assert!(result.is_error());

    // The colliding row keeps its old value
    let result = executor.execute("SELECT email FROM t WHERE id = 2");
    assert_eq!(result.rows, vec![vec![Value::Text("b@x.com".into())]]);
}

#[test]
fn test_integer_literal_coerces_into_float_column() {
    let mut executor = Executor::new();
    exec_ok(
        &mut executor,
        "CREATE TABLE t (id INTEGER PRIMARY KEY, score FLOAT)",
    );
    exec_ok(&mut executor, "INSERT INTO t VALUES (1, 4)");

    let result = executor.execute("SELECT score FROM t WHERE id = 1");
    assert_eq!(result.rows, vec![vec![Value::Float(4.0)]]);
}

#[test]
fn test_where_integer_literal_matches_float_column() {
    let mut executor = Executor::new();
    exec_ok(
        &mut executor,
        "CREATE TABLE t (id INTEGER PRIMARY KEY, score FLOAT)",
    );
    exec_ok(&mut executor, "INSERT INTO t VALUES (1, 4)");
    exec_ok(&mut executor, "INSERT INTO t VALUES (2, 4.5)");

    // The same literal that inserted the row finds it again
    let result = executor.execute("SELECT * FROM t WHERE score = 4");
    assert!(!result.is_error(), "{:?}", result.error);
    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0][0], Value::Integer(1));

    let result = executor.execute("UPDATE t SET score = 6 WHERE score = 4");
    assert_eq!(result.affected_rows, 1);

    let result = executor.execute("DELETE FROM t WHERE score = 6");
    assert_eq!(result.affected_rows, 1);

    let result = executor.execute("SELECT * FROM t");
    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0][0], Value::Integer(2));
}

#[test]
fn test_join_on_integer_literal_stored_in_float_column() {
    let mut executor = Executor::new();
    exec_ok(
        &mut executor,
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)",
    );
    exec_ok(
        &mut executor,
        "CREATE TABLE scores (sid INTEGER PRIMARY KEY, uid FLOAT, points FLOAT)",
    );
    exec_ok(&mut executor, "INSERT INTO users VALUES (1, 'Alice')");
    // Both FLOAT values written as integer literals
    exec_ok(&mut executor, "INSERT INTO scores VALUES (10, 1, 80)");

    let result = executor.execute(
        "SELECT users.name, scores.points FROM users JOIN scores ON users.id = scores.uid",
    );
    assert!(!result.is_error(), "{:?}", result.error);
    assert_eq!(
        result.rows,
        vec![vec![Value::Text("Alice".into()), Value::Float(80.0)]]
    );

    // WHERE on the joined float column with an integer literal
    let result = executor.execute(
        "SELECT users.name FROM users JOIN scores ON users.id = scores.uid \
         WHERE scores.points = 80",
    );
    assert_eq!(result.rows, vec![vec![Value::Text("Alice".into())]]);
}

#[test]
fn test_type_mismatch_is_rejected() {
    let mut executor = Executor::new();
    exec_ok(
        &mut executor,
        "CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)",
    );

    let result = executor.execute("INSERT INTO t VALUES (1, 42)");
    assert!(result.is_error());

    let result = executor.execute("SELECT * FROM t");
    assert_eq!(result.rows.len(), 0);
}

#[test]
fn test_errors_never_panic_across_statement_kinds() {
    let mut executor = Executor::new();
    let bad = [
        "SELECT * FROM missing",
        "INSERT INTO missing VALUES (1)",
        "UPDATE missing SET a = 1",
        "DELETE FROM missing",
        "DROP TABLE missing",
        "CREATE TABLE t (a INTEGER PRIMARY KEY, b INTEGER PRIMARY KEY)",
        "SELECT FROM t",
        "not sql at all",
    ];
    for sql in bad {
        let result = executor.execute(sql);
        assert!(result.is_error(), "expected failure for: {}", sql);
        assert!(result.error.as_deref().unwrap().starts_with("Error: "));
    }
}
