//! Statement and definition splitting, statement classification.
//!
//! All scanners here share one quoting rule: `'`, `"` and `` ` `` open a
//! literal that the same character closes, unless the character right before
//! it is a backslash. Only that one preceding character is checked, so a run
//! like `\\'` is still read as an escaped quote. Exact escaping is dialect
//! specific and this approximation is kept on purpose.

use once_cell::sync::Lazy;
use regex::{Regex, RegexSet};

/// Tracks whether a scan position sits inside a quoted literal.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct QuoteState {
    open: Option<char>,
}

impl QuoteState {
    /// Feed the next character together with the one before it.
    pub(crate) fn observe(&mut self, ch: char, prev: Option<char>) {
        if !matches!(ch, '\'' | '"' | '`') || prev == Some('\\') {
            return;
        }
        match self.open {
            None => self.open = Some(ch),
            Some(quote) if quote == ch => self.open = None,
            Some(_) => {}
        }
    }

    #[inline]
    pub(crate) fn in_literal(&self) -> bool {
        self.open.is_some()
    }
}

/// Split normalized SQL into statements on `;` outside literals.
///
/// Returns trimmed, non-empty statements in source order.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut quotes = QuoteState::default();
    let mut prev = None;

    for ch in sql.chars() {
        quotes.observe(ch, prev);

        if ch == ';' && !quotes.in_literal() {
            push_trimmed(&mut statements, &current);
            current.clear();
        } else {
            current.push(ch);
        }
        prev = Some(ch);
    }
    push_trimmed(&mut statements, &current);

    statements
}

/// Split a table body into definitions on commas at parenthesis depth zero
/// and outside literals.
pub fn split_definitions(body: &str) -> Vec<String> {
    let mut definitions = Vec::new();
    let mut current = String::new();
    let mut quotes = QuoteState::default();
    let mut depth: i32 = 0;
    let mut prev = None;

    for ch in body.chars() {
        quotes.observe(ch, prev);

        if !quotes.in_literal() {
            match ch {
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
        }

        if ch == ',' && !quotes.in_literal() && depth == 0 {
            push_trimmed(&mut definitions, &current);
            current.clear();
        } else {
            current.push(ch);
        }
        prev = Some(ch);
    }
    push_trimmed(&mut definitions, &current);

    definitions
}

/// Return the text between the `(` at byte offset `open` and its balancing `)`.
///
/// `None` if `open` is not a `(` or the group never closes.
pub fn balanced_group(sql: &str, open: usize) -> Option<&str> {
    if sql.as_bytes().get(open) != Some(&b'(') {
        return None;
    }

    let mut quotes = QuoteState::default();
    let mut depth = 0usize;
    let mut prev = None;

    for (offset, ch) in sql[open..].char_indices() {
        quotes.observe(ch, prev);
        prev = Some(ch);
        if quotes.in_literal() {
            continue;
        }
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&sql[open + 1..open + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

fn push_trimmed(out: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

/// What the pipeline does with a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    CreateTable,
    AlterTable,
    /// Known and irrelevant to the schema (DML, transactions, sessions, ...)
    Ignorable,
    /// Not recognised; worth a warning when it is not trivially short
    Unsupported,
}

static CREATE_TABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^CREATE\s+(?:TEMPORARY\s+)?TABLE").expect("Invalid create table regex")
});

static ALTER_TABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^ALTER\s+TABLE").expect("Invalid alter table regex"));

static IGNORABLE_SET: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"(?i)^SET\s+",
        r"(?i)^START\s+TRANSACTION",
        r"(?i)^BEGIN\b",
        r"(?i)^COMMIT",
        r"(?i)^ROLLBACK",
        r"(?i)^INSERT\s+INTO",
        r"(?i)^REPLACE\s+INTO",
        r"(?i)^UPDATE\s+",
        r"(?i)^DELETE\s+FROM",
        r"(?i)^DROP\s+",
        r"(?i)^LOCK\s+TABLES",
        r"(?i)^UNLOCK\s+TABLES",
        r"(?i)^USE\s+",
        r"(?i)^GRANT\s+",
        r"(?i)^REVOKE\s+",
        r"(?i)^CREATE\s+(?:UNIQUE\s+|FULLTEXT\s+|SPATIAL\s+)?INDEX",
        r"(?i)^CREATE\s+(?:OR\s+REPLACE\s+)?(?:ALGORITHM\s*=\s*\w+\s+)?(?:DEFINER\s*=\s*\S+\s+)?(?:SQL\s+SECURITY\s+\w+\s+)?VIEW",
        r"(?i)^CREATE\s+(?:DEFINER\s*=\s*\S+\s+)?(?:PROCEDURE|FUNCTION|TRIGGER|EVENT)",
        r"(?i)^CREATE\s+(?:DATABASE|SCHEMA)",
        r"(?i)^DELIMITER",
        r"^/\*",
    ])
    .expect("Invalid ignorable statement patterns")
});

/// Classify a statement by its leading keywords (case-insensitive).
pub fn classify_statement(stmt: &str) -> StatementKind {
    if CREATE_TABLE_RE.is_match(stmt) {
        StatementKind::CreateTable
    } else if ALTER_TABLE_RE.is_match(stmt) {
        StatementKind::AlterTable
    } else if IGNORABLE_SET.is_match(stmt) {
        StatementKind::Ignorable
    } else {
        StatementKind::Unsupported
    }
}
