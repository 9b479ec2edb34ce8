use rusqlite::Connection;
use snafu::Snafu;

use crate::exec::guard::StatementPolicy;
use crate::exec::value::{QueryResult, Value};

/// Errors raised while running a statement.
#[derive(Debug, Snafu)]
pub enum ExecError {
    /// The store rejected the statement; `message` is its diagnostic text.
    #[snafu(display("{message}"))]
    Execution {
        /// Diagnostic text reported by SQLite.
        message: String,
    },

    /// The statement policy refused the statement before execution.
    #[snafu(display("statement rejected: {reason}"))]
    Rejected {
        /// Why the policy refused it.
        reason: String,
    },
}

impl ExecError {
    fn from_store(err: rusqlite::Error) -> Self {
        ExecutionSnafu {
            message: store_message(&err),
        }
        .build()
    }
}

/// Extract SQLite's own message rather than rusqlite's wrapper text.
fn store_message(err: &rusqlite::Error) -> String {
    match err {
        rusqlite::Error::SqliteFailure(_, Some(message)) => message.clone(),
        other => other.to_string(),
    }
}

/// Run `sql` with no restrictions on statement type.
pub fn execute(conn: &Connection, sql: &str) -> Result<QueryResult, ExecError> {
    execute_with_policy(conn, sql, StatementPolicy::Unrestricted)
}

/// Run `sql` after checking it against `policy`.
pub fn execute_with_policy(
    conn: &Connection,
    sql: &str,
    policy: StatementPolicy,
) -> Result<QueryResult, ExecError> {
    tracing::info!(sql, "executing query");
    if let Err(reason) = policy.check(sql) {
        tracing::warn!(sql, %reason, "statement rejected");
        return RejectedSnafu { reason }.fail();
    }

    let result = run(conn, sql).map_err(|err| {
        tracing::error!(error = %err, "error executing query");
        ExecError::from_store(err)
    })?;

    tracing::info!(rows = result.len(), "query executed successfully");
    Ok(result)
}

fn run(conn: &Connection, sql: &str) -> Result<QueryResult, rusqlite::Error> {
    let mut stmt = conn.prepare(sql)?;

    // Duplicate names keep their first position and their last value.
    let mut columns: Vec<String> = Vec::new();
    let mut source_of: Vec<usize> = Vec::new();
    for (idx, name) in stmt.column_names().into_iter().enumerate() {
        match columns.iter().position(|c| c == name) {
            Some(pos) => source_of[pos] = idx,
            None => {
                columns.push(name.to_string());
                source_of.push(idx);
            }
        }
    }

    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let values = source_of
            .iter()
            .map(|&idx| row.get_ref(idx).map(Value::from))
            .collect::<Result<Vec<_>, _>>()?;
        out.push(values);
    }

    Ok(QueryResult::new(columns, out))
}

/// Check that the store answers a trivial query.
pub fn ping(conn: &Connection) -> Result<(), ExecError> {
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
        .map(|_| ())
        .map_err(ExecError::from_store)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Connection {
        let conn = Connection::open_in_memory().expect("in-memory database should open");
        conn.execute_batch(
            "CREATE TABLE orders (id INTEGER PRIMARY KEY, item TEXT, total REAL);
             INSERT INTO orders VALUES (1, 'tea', 3.5), (2, 'cake', NULL);",
        )
        .expect("fixture should apply");
        conn
    }

    #[test]
    fn rows_keep_result_set_column_order() {
        let result = execute(&seeded(), "SELECT total, id, item FROM orders").unwrap();
        assert_eq!(result.columns(), ["total", "id", "item"]);
        assert_eq!(
            result.rows()[0],
            vec![Value::Real(3.5), Value::Integer(1), Value::Text("tea".into())]
        );
        assert_eq!(result.rows()[1][0], Value::Null);
    }

    #[test]
    fn duplicate_column_names_keep_last_value() {
        let result = execute(&seeded(), "SELECT id AS x, item AS x, total FROM orders").unwrap();
        assert_eq!(result.columns(), ["x", "total"]);
        assert_eq!(result.rows()[0][0], Value::Text("tea".into()));
    }

    #[test]
    fn store_errors_carry_sqlite_text() {
        let err = execute(&seeded(), "SELECT nope FROM orders").unwrap_err();
        match err {
            ExecError::Execution { message } => assert_eq!(message, "no such column: nope"),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = execute(&seeded(), "SELEC * FROM orders").unwrap_err();
        assert!(err.to_string().contains("syntax error"), "{err}");
    }

    #[test]
    fn mutations_run_when_unrestricted() {
        let conn = seeded();
        let result = execute(&conn, "DELETE FROM orders WHERE id = 2").unwrap();
        assert!(result.is_empty());
        assert!(result.columns().is_empty());
        let remaining = execute(&conn, "SELECT * FROM orders").unwrap();
        assert_eq!(remaining.len(), 1);
    }

    #[test]
    fn read_only_policy_blocks_before_execution() {
        let conn = seeded();
        let err =
            execute_with_policy(&conn, "DELETE FROM orders", StatementPolicy::ReadOnly).unwrap_err();
        assert!(matches!(err, ExecError::Rejected { .. }));
        assert_eq!(execute(&conn, "SELECT * FROM orders").unwrap().len(), 2);
    }

    #[test]
    fn ping_answers() {
        assert!(ping(&seeded()).is_ok());
    }
}
