use std::fmt;

use rusqlite::types::Value as SqlValue;

/// Storage class chosen for an uploaded column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnAffinity {
    /// Every non-empty cell is a 64-bit integer.
    Integer,
    /// Every non-empty cell is a number, at least one of them not integral.
    Real,
    /// Anything else, including columns with no values at all.
    Text,
}

impl fmt::Display for ColumnAffinity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnAffinity::Integer => write!(f, "INTEGER"),
            ColumnAffinity::Real => write!(f, "REAL"),
            ColumnAffinity::Text => write!(f, "TEXT"),
        }
    }
}

impl ColumnAffinity {
    /// Pick the narrowest affinity that fits every cell.
    pub fn infer<'a>(cells: impl IntoIterator<Item = &'a str>) -> Self {
        let mut seen_value = false;
        let mut all_integer = true;
        for cell in cells {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            seen_value = true;
            if cell.parse::<i64>().is_ok() {
                continue;
            }
            if cell.parse::<f64>().is_ok() {
                all_integer = false;
                continue;
            }
            return ColumnAffinity::Text;
        }
        match (seen_value, all_integer) {
            (false, _) => ColumnAffinity::Text,
            (true, true) => ColumnAffinity::Integer,
            (true, false) => ColumnAffinity::Real,
        }
    }

    /// Convert one cell; empty cells become `NULL`.
    ///
    /// Only called with cells that took part in [`ColumnAffinity::infer`].
    pub fn convert(self, cell: &str) -> SqlValue {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return SqlValue::Null;
        }
        match self {
            ColumnAffinity::Integer => trimmed
                .parse()
                .map(SqlValue::Integer)
                .unwrap_or_else(|_| SqlValue::Text(cell.to_string())),
            ColumnAffinity::Real => trimmed
                .parse()
                .map(SqlValue::Real)
                .unwrap_or_else(|_| SqlValue::Text(cell.to_string())),
            ColumnAffinity::Text => SqlValue::Text(cell.to_string()),
        }
    }
}

/// Make header names usable as distinct column names.
///
/// Blank headers become `Unnamed: <position>`; repeats get `.1`, `.2`, ...
/// suffixes in order of appearance.
pub fn dedupe_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for (idx, raw) in headers.into_iter().enumerate() {
        let base = if raw.trim().is_empty() {
            format!("Unnamed: {idx}")
        } else {
            raw.to_string()
        };
        let mut candidate = base.clone();
        let mut suffix = 1;
        while out.iter().any(|existing| existing.eq_ignore_ascii_case(&candidate)) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        out.push(candidate);
    }
    out
}
