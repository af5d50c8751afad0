//! Identifier handling utilities for MySQL DDL.
//!
//! # Examples
//!
//! ```ignore
//! assert_eq!(normalize_identifier("`users`"), "users");
//! ```

use sqlparser::tokenizer::{Token, Word};

/// Strips backticks and double quotes from an identifier and trims it.
pub fn normalize_identifier(ident: &str) -> String {
    ident.trim().replace(['`', '"'], "").trim().to_string()
}

/// Formats a Word token keeping its quote style.
pub fn format_word(word: &Word) -> String {
    match word.quote_style {
        Some('`') => format!("`{}`", word.value),
        Some('"') => format!("\"{}\"", word.value),
        _ => word.value.clone(),
    }
}

/// Converts a token back into SQL text.
pub fn format_token(token: &Token) -> String {
    match token {
        Token::Word(w) => format_word(w),
        Token::Number(n, _) => n.clone(),
        Token::SingleQuotedString(s) => format!("'{}'", s),
        Token::DoubleQuotedString(s) => format!("\"{}\"", s),
        Token::NationalStringLiteral(s) => format!("N'{}'", s),
        Token::LParen => "(".to_string(),
        Token::RParen => ")".to_string(),
        Token::Comma => ",".to_string(),
        Token::Period => ".".to_string(),
        Token::Minus => "-".to_string(),
        Token::Plus => "+".to_string(),
        Token::Whitespace(ws) => ws.to_string(),
        _ => format!("{}", token),
    }
}
