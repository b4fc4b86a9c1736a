use regex::Regex;
use std::sync::LazyLock;

/// Letters (any script) and decimal digits. Other numerics such as `½`,
/// `²` or Roman numerals, and combining marks, are delimiters.
static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{Nd}]+").expect("valid word regex"));

/// Breaks text into lower-cased word tokens.
///
/// A token is a maximal run of Unicode letters or decimal digits; every
/// other character is a delimiter and is dropped. Text is lower-cased
/// before it is split, so case mappings that expand into non-word
/// characters act as delimiters too. No stop words, no stemming.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}
