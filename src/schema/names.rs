use once_cell::sync::Lazy;
use regex::Regex;

static TABLE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("table name pattern is valid"));

/// True when `name` may be interpolated into a metadata or DDL statement.
///
/// Only ASCII letters, digits and underscores are accepted; there is no
/// length limit.
pub fn is_valid_table_name(name: &str) -> bool {
    TABLE_NAME_RE.is_match(name)
}

/// Quote an identifier for SQLite, doubling embedded double quotes.
///
/// Column names coming from uploaded CSV headers are arbitrary text, so they
/// always go through this before reaching a statement.
pub fn quote_identifier(ident: &str) -> String {
    let mut quoted = String::with_capacity(ident.len() + 2);
    quoted.push('"');
    for ch in ident.chars() {
        if ch == '"' {
            quoted.push('"');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

/// Lowercase a name for case-insensitive matching against question text.
pub fn normalize_for_match(name: &str) -> String {
    name.to_lowercase()
}
