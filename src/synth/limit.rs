use once_cell::sync::Lazy;
use regex::Regex;

/// Either `<number> [qualifier]` (number followed by whitespace, qualifier
/// optional) or `<qualifier> <number>`. The leftmost match wins.
static LIMIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]+)\s+(?:last|first|recent)?|(?:last|first|recent)\s+([0-9]+)")
        .expect("limit pattern is valid")
});

/// Extract the row quantifier from an already lower-cased question.
///
/// Returns the digits verbatim so oversized numbers reach the store
/// unchanged.
pub fn extract_limit(question_lower: &str) -> Option<&str> {
    let caps = LIMIT_RE.captures(question_lower)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}
