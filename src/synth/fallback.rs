use std::fmt;

use crate::schema::model::SchemaDescriptor;
use crate::schema::names::normalize_for_match;
use crate::schema::text;
use crate::synth::limit::extract_limit;

/// Statement returned when the schema names no table at all.
///
/// It lists the catalog instead of querying data; callers must tolerate it.
pub const DISCOVERY_QUERY: &str = "SELECT * FROM sqlite_master WHERE type='table';";

/// Words that make the fallback order by descending `id`.
///
/// "first" is not one of them.
const RECENCY_WORDS: &[&str] = &["last", "recent"];

/// The decisions taken by the fallback heuristic for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackPlan {
    /// Selected table, verbatim from the schema.
    pub table: String,
    /// Whether to append `ORDER BY id DESC`.
    pub newest_first: bool,
    /// Digits to place after `LIMIT`, if any.
    pub limit: Option<String>,
}

impl fmt::Display for FallbackPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT * FROM {}", self.table)?;
        if self.newest_first {
            f.write_str(" ORDER BY id DESC")?;
        }
        if let Some(limit) = &self.limit {
            write!(f, " LIMIT {limit}")?;
        }
        Ok(())
    }
}

/// Decide table, ordering and limit for `question` over `tables`.
///
/// Returns `None` only when `tables` is empty.
pub fn plan<S: AsRef<str>>(question: &str, tables: &[S]) -> Option<FallbackPlan> {
    let first = tables.first()?;
    let question_lower = question.to_lowercase();

    let table = tables
        .iter()
        .find(|table| question_lower.contains(&normalize_for_match(table.as_ref())))
        .unwrap_or(first);

    let newest_first = RECENCY_WORDS
        .iter()
        .any(|word| question_lower.contains(word));

    Some(FallbackPlan {
        table: table.as_ref().to_string(),
        newest_first,
        limit: extract_limit(&question_lower).map(str::to_string),
    })
}

/// Synthesize a statement for `question` from rendered schema text.
///
/// Pure and deterministic: the same inputs always give the same statement.
pub fn synthesize(question: &str, schema_text: &str) -> String {
    synthesize_for_tables(question, &text::table_names(schema_text))
}

/// Synthesize a statement from a structured schema.
///
/// Produces the same statement as [`synthesize`] on the schema's rendered
/// text.
pub fn synthesize_for_schema(question: &str, schema: &SchemaDescriptor) -> String {
    let tables: Vec<&str> = schema.table_names().collect();
    synthesize_for_tables(question, &tables)
}

/// Synthesize a statement from table names in schema order.
pub fn synthesize_for_tables<S: AsRef<str>>(question: &str, tables: &[S]) -> String {
    let sql = match plan(question, tables) {
        Some(plan) => plan.to_string(),
        None => DISCOVERY_QUERY.to_string(),
    };
    tracing::info!(sql = %sql, "fallback query generated");
    sql
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLES: &[&str] = &["customers", "orders", "order_items"];

    #[test]
    fn plan_records_each_decision() {
        let plan = plan("Show me the LAST 5 Orders", TABLES).unwrap();
        assert_eq!(
            plan,
            FallbackPlan {
                table: "orders".to_string(),
                newest_first: true,
                limit: Some("5".to_string()),
            }
        );
    }

    #[test]
    fn plan_is_none_without_tables() {
        assert!(plan::<&str>("anything", &[]).is_none());
        assert_eq!(synthesize_for_tables::<&str>("anything", &[]), DISCOVERY_QUERY);
    }

    #[test]
    fn first_table_in_schema_order_wins_on_overlap() {
        // "order_items" contains "order" but "orders" is not a substring of it.
        let sql = synthesize_for_tables("list order_items", TABLES);
        assert_eq!(sql, "SELECT * FROM order_items");

        let sql = synthesize_for_tables("orders and customers", TABLES);
        assert_eq!(sql, "SELECT * FROM customers");
    }

    #[test]
    fn recency_words_match_anywhere() {
        assert_eq!(
            synthesize_for_tables("blast radius of orders", TABLES),
            "SELECT * FROM orders ORDER BY id DESC"
        );
        assert_eq!(
            synthesize_for_tables("most recently added customers", TABLES),
            "SELECT * FROM customers ORDER BY id DESC"
        );
    }

    #[test]
    fn table_case_is_preserved_in_output() {
        let sql = synthesize_for_tables("show invoices", &["Invoices"]);
        assert_eq!(sql, "SELECT * FROM Invoices");
    }
}
