mod support;

use std::process::{Command, Output};

use support::TempDb;

fn nl2sql(db: &TempDb, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_nl2sql"))
        .arg("--db")
        .arg(&db.path)
        .args(args)
        .env_remove("OPENAI_API_KEY")
        .env_remove("DB_URL")
        .env("RUST_LOG", "off")
        .output()
        .expect("should run nl2sql binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("stdout should be UTF-8")
}

#[test]
fn schema_prints_schema_text() {
    let db = TempDb::shop();
    let output = nl2sql(&db, &["schema"]);
    assert!(output.status.success(), "{output:?}");
    insta::assert_snapshot!(stdout(&output).trim_end(), @r"
    Table: customers
    Columns: id, name, city
    Table: orders
    Columns: id, customer_id, item, total
    ");
}

#[test]
fn ask_prints_sql_and_table() {
    let db = TempDb::shop();
    let output = nl2sql(&db, &["ask", "first 3 customers", "--offline"]);
    assert!(output.status.success(), "{output:?}");
    insta::assert_snapshot!(stdout(&output).trim_end(), @r"
    SQL: SELECT * FROM customers LIMIT 3
    Found 3 result(s) for your query.

    id | name  | city
    -- | ----- | ---------
    1  | Ada   | London
    2  | Grace | Arlington
    3  | Linus | NULL
    (3 rows)
    ");
}

#[test]
fn ask_json_matches_http_shape() {
    let db = TempDb::shop();
    let output = nl2sql(&db, &["ask", "show me the last 2 orders", "--offline", "--json"]);
    assert!(output.status.success(), "{output:?}");
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["sql_query"], "SELECT * FROM orders ORDER BY id DESC LIMIT 2");
    assert_eq!(body["row_count"], 2);
    assert_eq!(body["results"][0]["item"], "juice");
}

#[test]
fn ask_with_chart_draws_bar_chart() {
    let db = TempDb::shop();
    let output = nl2sql(&db, &["ask", "last 3 orders", "--offline", "--chart"]);
    assert!(output.status.success(), "{output:?}");
    let out = stdout(&output);
    assert!(out.contains("Bar Chart"), "{out}");
    assert!(out.contains("Scatter Plot"), "{out}");
    assert!(out.contains("id by Index"), "{out}");
}

#[test]
fn load_csv_then_ask() {
    let db = TempDb::empty();
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("pets.csv");
    std::fs::write(&csv_path, "id,name,age\n1,rex,3\n2,tom,5\n").unwrap();

    let output = nl2sql(
        &db,
        &["load-csv", csv_path.to_str().unwrap(), "--table", "pets"],
    );
    assert!(output.status.success(), "{output:?}");
    assert!(stdout(&output).starts_with("CSV uploaded successfully"));

    let output = nl2sql(&db, &["ask", "all pets", "--offline", "--json"]);
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["row_count"], 2);
}

#[test]
fn execution_failure_exits_with_code_2() {
    let db = TempDb::with_sql("CREATE TABLE notes (body TEXT); INSERT INTO notes VALUES ('x');");
    // No id column, so the recency ordering fails in the store.
    let output = nl2sql(&db, &["ask", "the last notes", "--offline"]);
    assert_eq!(output.status.code(), Some(2), "{output:?}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Query execution error: no such column: id"), "{stderr}");
}

#[test]
fn invalid_table_name_exits_with_code_2() {
    let db = TempDb::empty();
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("x.csv");
    std::fs::write(&csv_path, "a\n1\n").unwrap();

    let output = nl2sql(
        &db,
        &["load-csv", csv_path.to_str().unwrap(), "--table", "no-dashes"],
    );
    assert_eq!(output.status.code(), Some(2), "{output:?}");
}
