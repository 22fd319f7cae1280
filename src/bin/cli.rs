//! relite - interactive console

use std::io::{self, Write};

use relite::executor::{Executor, QueryResult};
use relite::storage::Database;

/// Print welcome banner
fn print_banner() {
    println!(
        r#"
           _ _ _
  _ __ ___| (_) |_ ___
 | '__/ _ \ | | __/ _ \
 | | |  __/ | | ||  __/
 |_|  \___|_|_|\__\___|

 A small relational data engine
 Type '.help' for help, '.quit' to exit
"#
    );
}

/// Print help message
fn print_help() {
    println!(
        r#"
Commands:
  .help              Show this help message
  .quit              Exit relite
  .tables            List all tables
  .describe <table>  Show table schema
  .clear             Clear screen

SQL Commands:
  CREATE TABLE ...   Create a new table
  DROP TABLE ...     Drop a table
  INSERT INTO ...    Insert a row
  SELECT ...         Query data (two-table JOIN supported)
  UPDATE ...         Update rows
  DELETE FROM ...    Delete rows

Examples:
  CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, email TEXT UNIQUE);
  INSERT INTO users VALUES (1, 'Alice', 'a@example.com');
  SELECT * FROM users WHERE id = 1;
  SELECT users.name, orders.item FROM users JOIN orders ON users.id = orders.uid;
"#
    );
}

/// Format a SELECT result as an ASCII table
fn format_results(result: &QueryResult) -> String {
    if result.columns.is_empty() {
        return "(0 rows)\n".to_string();
    }

    // Calculate column widths
    let mut widths: Vec<usize> = result.columns.iter().map(|c| c.len()).collect();
    for row in &result.rows {
        for (i, value) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(format!("{}", value).len());
            }
        }
    }

    let separator: String = widths
        .iter()
        .map(|w| "-".repeat(*w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let separator = format!("+{}+\n", separator);

    let mut output = String::new();
    output.push_str(&separator);
    let header: String = result
        .columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!(" {:^width$} ", c, width = *w))
        .collect::<Vec<_>>()
        .join("|");
    output.push_str(&format!("|{}|\n", header));
    output.push_str(&separator);

    for row in &result.rows {
        let row_str: String = row
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!(" {:>width$} ", format!("{}", v), width = *w))
            .collect::<Vec<_>>()
            .join("|");
        output.push_str(&format!("|{}|\n", row_str));
    }

    if !result.rows.is_empty() {
        output.push_str(&separator);
    }
    output.push_str(&format!("({} rows)\n", result.rows.len()));

    output
}

/// Execute one statement and print its outcome
fn execute_sql(sql: &str, executor: &mut Executor) {
    let sql = sql.trim();
    if sql.is_empty() {
        return;
    }

    let result = executor.execute(sql);
    if let Some(report) = &result.error {
        eprintln!("{}", report);
    } else if let Some(msg) = &result.message {
        println!("{}", msg);
    } else {
        print!("{}", format_results(&result));
    }
}

/// Print one table's schema
fn describe_table(db: &Database, name: &str) {
    match db.get_table(name) {
        Ok(table) => {
            println!("Table: {}", table.name());
            for col in table.columns() {
                let mut constraints = Vec::new();
                if col.primary_key {
                    constraints.push("PRIMARY KEY");
                }
                if col.unique {
                    constraints.push("UNIQUE");
                }
                let suffix = if constraints.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", constraints.join(", "))
                };
                println!("  {} {}{}", col.name, col.data_type, suffix);
            }
        }
        Err(e) => eprintln!("Error: {}", e),
    }
}

/// Handle special dot commands. Returns false when the session should end.
fn handle_special_command(cmd: &str, executor: &Executor) -> bool {
    let parts: Vec<&str> = cmd.split_whitespace().collect();

    match parts.first().copied() {
        Some(".help") => print_help(),
        Some(".quit") | Some(".exit") => {
            println!("Goodbye!");
            return false;
        }
        Some(".tables") => {
            let names = executor.database().table_names();
            if names.is_empty() {
                println!("No tables found.");
            } else {
                println!("Tables:");
                for name in names {
                    println!("  {}", name);
                }
            }
        }
        Some(".describe") => match parts.get(1) {
            Some(name) => describe_table(executor.database(), name),
            None => println!("Usage: .describe <table>"),
        },
        Some(".clear") => {
            print!("\x1B[2J\x1B[1;1H");
            io::stdout().flush().ok();
        }
        Some(cmd) => {
            eprintln!("Unknown command: {}", cmd);
            eprintln!("Type '.help' for available commands.");
        }
        None => {}
    }
    true
}

/// Main REPL loop
fn run_repl(mut executor: Executor) {
    print_banner();
    if let Some(path) = executor.persist_path() {
        println!(" Database file: {}\n", path.display());
    }

    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() { "relite> " } else { "   ...> " };
        print!("{}", prompt);
        if io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                println!();
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                continue;
            }
        }

        let trimmed = line.trim();

        // Dot commands are only recognized on a fresh line
        if buffer.is_empty() && trimmed.starts_with('.') {
            if !handle_special_command(trimmed, &executor) {
                return;
            }
            continue;
        }

        if trimmed.is_empty() && buffer.is_empty() {
            continue;
        }

        buffer.push_str(trimmed);
        buffer.push(' ');

        // Statements run once a terminator arrives; several may share a line
        let (complete, rest) = split_statements(&buffer);
        if !complete.is_empty() {
            buffer = rest;
            for sql in complete {
                execute_sql(&sql, &mut executor);
            }
        }
    }
}

/// Split buffered input on `;` terminators, ignoring semicolons inside
/// single-quoted strings. Returns the terminated statements and the
/// unterminated remainder to keep buffering.
fn split_statements(input: &str) -> (Vec<String>, String) {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_string = false;

    for ch in input.chars() {
        match ch {
            '\'' => {
                in_string = !in_string;
                current.push(ch);
            }
            ';' if !in_string => {
                statements.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }

    (statements, current)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let executor = match std::env::args().nth(1) {
        Some(path) => Executor::open(path)?,
        None => Executor::new(),
    };

    run_repl(executor);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::split_statements;

    #[test]
    fn test_split_on_terminator() {
        let (stmts, rest) = split_statements("SELECT * FROM t; DROP TABLE t; ");
        assert_eq!(stmts, vec!["SELECT * FROM t", " DROP TABLE t"]);
        assert_eq!(rest, " ");
    }

    #[test]
    fn test_semicolon_inside_string_is_not_a_terminator() {
        let (stmts, rest) = split_statements("INSERT INTO t VALUES ('a;b'); ");
        assert_eq!(stmts, vec!["INSERT INTO t VALUES ('a;b')"]);
        assert_eq!(rest, " ");
    }

    #[test]
    fn test_unterminated_statement_stays_buffered() {
        let (stmts, rest) = split_statements("SELECT * FROM t WHERE name = 'a;");
        assert!(stmts.is_empty());
        assert_eq!(rest, "SELECT * FROM t WHERE name = 'a;");
    }

    #[test]
    fn test_escaped_quote_keeps_tracking() {
        let (stmts, _) = split_statements("INSERT INTO t VALUES ('it''s; fine');");
        assert_eq!(stmts, vec!["INSERT INTO t VALUES ('it''s; fine')"]);
    }
}
