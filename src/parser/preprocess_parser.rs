//! SQL text preprocessing
//!
//! 1. **Line comments**: everything from `--` to the end of the line is removed.
//! 2. **Block comments**: `/* ... */` spans are removed (non-nested, so MySQL
//!    `/*!40101 ... */` conditional blocks go too).
//! 3. **Whitespace**: every whitespace run collapses to one space; the result
//!    is trimmed.
//!
//! Comment removal does not look at quoting, so a `--` inside a string literal
//! truncates that line. Preprocessing never fails.

use once_cell::sync::Lazy;
use regex::Regex;

static LINE_COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"--[^\n]*").expect("Invalid line comment regex"));

static BLOCK_COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("Invalid block comment regex"));

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Strip comments and normalize whitespace.
pub fn preprocess_sql(sql: &str) -> String {
    let without_bom = sql.strip_prefix('\u{FEFF}').unwrap_or(sql);
    let cleaned = LINE_COMMENT_RE.replace_all(without_bom, "");
    let cleaned = BLOCK_COMMENT_RE.replace_all(&cleaned, "");
    let cleaned = WHITESPACE_RE.replace_all(&cleaned, " ");
    cleaned.trim().to_string()
}
