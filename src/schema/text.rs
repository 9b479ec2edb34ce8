//! The schema-text interchange format.
//!
//! A schema renders as one block per table:
//!
//! ```text
//! Table: orders
//! Columns: id, customer_id, total
//! ```
//!
//! Blocks are joined by a single newline with no trailing newline. An empty
//! schema renders as the empty string. [`render`] and [`table_names`] are the
//! two halves of the same contract and must change together.

use std::fmt::Write;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::model::SchemaDescriptor;

const TABLE_MARKER: &str = "Table: ";
const COLUMNS_MARKER: &str = "Columns: ";

static TABLE_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Table: (\w+)").expect("table marker pattern is valid"));

/// Render a schema descriptor into schema text.
pub fn render(schema: &SchemaDescriptor) -> String {
    let mut out = String::new();
    for (idx, table) in schema.tables.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        write!(
            out,
            "{TABLE_MARKER}{}\n{COLUMNS_MARKER}{}",
            table.name,
            table.columns.join(", ")
        )
        .unwrap();
    }
    out
}

/// Extract every table name that follows a `Table: ` marker, in order.
///
/// Names are word-character runs, so text after the first non-word
/// character on the line is ignored.
pub fn table_names(schema_text: &str) -> Vec<&str> {
    TABLE_LINE_RE
        .captures_iter(schema_text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}
