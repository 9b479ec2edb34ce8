use serde::Serialize;

use crate::exec::value::QueryResult;

/// The structured answer to one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatAnswer {
    /// Human-readable summary, always `Found <n> result(s) for your query.`
    pub message: String,
    /// The statement that produced `results`.
    pub sql_query: String,
    /// Records in result-set order.
    pub results: QueryResult,
    /// Number of records in `results`.
    pub row_count: usize,
}

/// Package an executed statement and its rows.
pub fn respond(sql_query: impl Into<String>, results: QueryResult) -> ChatAnswer {
    let row_count = results.len();
    tracing::info!(row_count, "returning response");
    ChatAnswer {
        message: format!("Found {row_count} result(s) for your query."),
        sql_query: sql_query.into(),
        results,
        row_count,
    }
}
