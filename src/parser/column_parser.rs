//! Token-based column definition parsing for MySQL DDL
//!
//! ## Supported Syntax
//!
//! ```sql
//! `name` TYPE[(params)] [UNSIGNED] [ZEROFILL] [NOT NULL | NULL]
//!     [DEFAULT value] [AUTO_INCREMENT] [PRIMARY KEY | KEY] [UNIQUE [KEY]]
//!     [COMMENT 'text'] [CHARACTER SET x] [COLLATE x] [ON UPDATE ...]
//! ```
//!
//! Modifiers may appear in any order. Unrecognised words are skipped, and
//! parenthesized groups outside the type (CHECK, GENERATED ... AS) are skipped
//! whole.

use sqlparser::tokenizer::Token;
use thiserror::Error;

use super::identifier_utils::format_token;
use super::token_parser_base::TokenParser;

/// Result of parsing a column definition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenParsedColumn {
    pub name: String,
    /// Declared type name, upper-cased, without parameters (e.g. "DECIMAL")
    pub raw_type: String,
    /// Type parameter group as written (e.g. "(10,2)")
    pub type_params: Option<String>,
    pub not_null: bool,
    pub auto_increment: bool,
    pub unsigned: bool,
    pub default_value: Option<String>,
    pub comment: Option<String>,
    /// Inline `PRIMARY KEY` (or bare `KEY`)
    pub is_primary_key: bool,
    /// Inline `UNIQUE [KEY]`
    pub is_unique: bool,
}

/// Why a column definition could not be read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnParseError {
    #[error("Could not extract column name from: {0}")]
    MissingName(String),

    #[error("Could not extract data type for column \"{0}\"")]
    MissingType(String),

    #[error("Could not tokenize column definition: {0}")]
    Tokenize(String),
}

/// Token-based column definition parser
pub struct ColumnTokenParser {
    base: TokenParser,
    source: String,
}

impl ColumnTokenParser {
    pub fn new(col_def: &str) -> Result<Self, ColumnParseError> {
        let base = TokenParser::new(col_def).map_err(ColumnParseError::Tokenize)?;
        Ok(Self {
            base,
            source: col_def.to_string(),
        })
    }

    pub fn parse(&mut self) -> Result<TokenParsedColumn, ColumnParseError> {
        self.base.skip_whitespace();

        let name = self
            .base
            .parse_identifier()
            .ok_or_else(|| ColumnParseError::MissingName(preview(&self.source)))?;

        self.base.skip_whitespace();
        let raw_type = match self.base.current() {
            Some(Token::Word(w)) => {
                self.base.advance();
                w.value.to_uppercase()
            }
            _ => return Err(ColumnParseError::MissingType(name)),
        };

        self.base.skip_whitespace();
        let type_params = self.base.consume_parenthesized();

        let mut result = TokenParsedColumn {
            name,
            raw_type,
            type_params,
            ..Default::default()
        };
        self.parse_column_modifiers(&mut result);

        Ok(result)
    }

    /// Parse column modifiers in any order
    fn parse_column_modifiers(&mut self, result: &mut TokenParsedColumn) {
        loop {
            self.base.skip_whitespace();
            if self.base.is_at_end() {
                break;
            }

            if self.base.expect_word_ci("NOT").is_some() {
                if self.base.expect_next_word_ci("NULL").is_some() {
                    result.not_null = true;
                }
                continue;
            }

            if self.base.expect_word_ci("AUTO_INCREMENT").is_some()
                || self.base.expect_word_ci("AUTOINCREMENT").is_some()
            {
                result.auto_increment = true;
                continue;
            }

            if self.base.expect_word_ci("UNSIGNED").is_some() {
                result.unsigned = true;
                continue;
            }

            if self.base.expect_word_ci("DEFAULT").is_some() {
                self.base.skip_whitespace();
                result.default_value = self.parse_default_value();
                continue;
            }

            if self.base.expect_word_ci("COMMENT").is_some() {
                self.base.skip_whitespace();
                result.comment = self.parse_string_literal().filter(|c| !c.is_empty());
                continue;
            }

            if self.base.expect_word_ci("PRIMARY").is_some() {
                if self.base.expect_next_word_ci("KEY").is_some() {
                    result.is_primary_key = true;
                }
                continue;
            }

            // In a column definition a bare KEY means PRIMARY KEY
            if self.base.expect_word_ci("KEY").is_some() {
                result.is_primary_key = true;
                continue;
            }

            if self.base.expect_word_ci("UNIQUE").is_some() {
                let _ = self.base.expect_next_word_ci("KEY");
                result.is_unique = true;
                continue;
            }

            // REFERENCES t (c) on a column is parsed but ignored by MySQL
            if self.base.expect_word_ci("REFERENCES").is_some() {
                self.base.skip_whitespace();
                let _ = self.base.parse_identifier();
                continue;
            }

            if self.base.check_token(&Token::LParen) {
                self.base.skip_parenthesized();
                continue;
            }

            self.base.advance();
        }
    }

    /// Parse the value after DEFAULT. A `NULL` default yields `None`.
    fn parse_default_value(&mut self) -> Option<String> {
        let value = match self.base.current()? {
            Token::SingleQuotedString(s)
            | Token::DoubleQuotedString(s)
            | Token::NationalStringLiteral(s) => {
                self.base.advance();
                s
            }
            Token::Minus | Token::Plus => {
                let sign = format_token(&self.base.current()?);
                self.base.advance();
                match self.base.current() {
                    Some(Token::Number(n, _)) => {
                        self.base.advance();
                        format!("{}{}", sign, n)
                    }
                    _ => sign,
                }
            }
            Token::Number(n, _) => {
                self.base.advance();
                n
            }
            Token::Word(w) => {
                self.base.advance();
                // Function-style defaults: CURRENT_TIMESTAMP(3), uuid()
                match self.base.consume_parenthesized() {
                    Some(args) => format!("{}{}", w.value, args),
                    None => w.value,
                }
            }
            Token::LParen => self.base.consume_parenthesized()?,
            other => {
                self.base.advance();
                format_token(&other)
            }
        };

        if value.eq_ignore_ascii_case("NULL") {
            None
        } else {
            Some(value)
        }
    }

    fn parse_string_literal(&mut self) -> Option<String> {
        match self.base.current()? {
            Token::SingleQuotedString(s)
            | Token::DoubleQuotedString(s)
            | Token::NationalStringLiteral(s) => {
                self.base.advance();
                Some(s)
            }
            _ => None,
        }
    }
}

fn preview(text: &str) -> String {
    text.chars().take(50).collect()
}

/// Parse a column definition using the token-based parser
pub fn parse_column_definition_tokens(col_def: &str) -> Result<TokenParsedColumn, ColumnParseError> {
    ColumnTokenParser::new(col_def)?.parse()
}
