#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use nl2sql::service::ChatService;
use nl2sql::store::Store;
use nl2sql::translate::{SqlTranslator, TranslateError};
use rusqlite::Connection;
use tempfile::TempDir;

/// The sample shop used across integration tests.
pub(crate) const SHOP_SQL: &str = "
    CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT NOT NULL, city TEXT);
    CREATE TABLE orders (id INTEGER PRIMARY KEY, customer_id INTEGER, item TEXT, total REAL);
    INSERT INTO customers VALUES (1, 'Ada', 'London'), (2, 'Grace', 'Arlington'), (3, 'Linus', NULL);
    INSERT INTO orders VALUES
        (1, 1, 'tea', 3.5),
        (2, 1, 'cake', 4.25),
        (3, 2, 'coffee', 2.0),
        (4, 3, 'bagel', 1.75),
        (5, 2, 'tea', 3.5),
        (6, 1, 'scone', 2.5),
        (7, 3, 'juice', 3.0);
";

/// A database file that lives as long as the fixture.
pub(crate) struct TempDb {
    dir: TempDir,
    pub(crate) path: PathBuf,
}

impl TempDb {
    pub(crate) fn empty() -> Self {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = dir.path().join("test.db");
        Connection::open(&path).expect("database file should be created");
        Self { dir, path }
    }

    pub(crate) fn with_sql(sql: &str) -> Self {
        let db = Self::empty();
        let conn = Connection::open(&db.path).expect("database should open");
        conn.execute_batch(sql).expect("fixture SQL should apply");
        db
    }

    pub(crate) fn shop() -> Self {
        Self::with_sql(SHOP_SQL)
    }

    pub(crate) fn store(&self) -> Store {
        Store::new(&self.path)
    }

    pub(crate) fn service(&self) -> ChatService {
        ChatService::new(self.store())
    }
}

/// Translator that always returns the same statement and counts calls.
pub(crate) struct FixedTranslator {
    sql: String,
    pub(crate) calls: Arc<AtomicUsize>,
}

impl FixedTranslator {
    pub(crate) fn new(sql: &str) -> Self {
        Self {
            sql: sql.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SqlTranslator for FixedTranslator {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn translate(&self, _question: &str, _schema_text: &str) -> Result<String, TranslateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.sql.clone())
    }
}

/// Translator that always fails.
pub(crate) struct FailingTranslator;

#[async_trait]
impl SqlTranslator for FailingTranslator {
    fn name(&self) -> &str {
        "failing"
    }

    async fn translate(&self, _question: &str, _schema_text: &str) -> Result<String, TranslateError> {
        Err(TranslateError::NoToolCall)
    }
}
