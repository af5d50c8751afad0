//! Base token parser shared by the column and key-list parsers.
//!
//! Wraps the `sqlparser` tokenizer (MySQL dialect, so backtick identifiers and
//! backslash escapes behave as in a `mysqldump` file) and provides cursor
//! navigation over the resulting token stream.
//!
//! ## Usage
//!
//! ```ignore
//! let mut parser = TokenParser::new("`id` INT NOT NULL")?;
//! parser.skip_whitespace();
//! let name = parser.parse_identifier()?;
//! ```

use sqlparser::dialect::MySqlDialect;
use sqlparser::tokenizer::{Token, TokenWithSpan, Tokenizer};

use super::identifier_utils::format_token;

/// Cursor over a tokenized SQL fragment.
pub struct TokenParser {
    tokens: Vec<TokenWithSpan>,
    pos: usize,
}

impl TokenParser {
    /// Tokenize `sql` with the MySQL dialect.
    ///
    /// Returns the tokenizer's message on failure (e.g. an unterminated literal).
    pub fn new(sql: &str) -> Result<Self, String> {
        let dialect = MySqlDialect {};
        let tokens = Tokenizer::new(&dialect, sql)
            .tokenize_with_location()
            .map_err(|e| e.to_string())?;

        Ok(Self { tokens, pos: 0 })
    }

    // ========================================================================
    // Position and state
    // ========================================================================

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    #[inline]
    pub fn current_token(&self) -> Option<&TokenWithSpan> {
        self.tokens.get(self.pos)
    }

    /// Clone of the current token, if any.
    #[inline]
    pub fn current(&self) -> Option<Token> {
        self.current_token().map(|t| t.token.clone())
    }

    #[inline]
    pub fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    /// Skip whitespace tokens (comments included).
    pub fn skip_whitespace(&mut self) {
        while let Some(token) = self.current_token() {
            if matches!(token.token, Token::Whitespace(_)) {
                self.advance();
            } else {
                break;
            }
        }
    }

    // ========================================================================
    // Token type checks
    // ========================================================================

    /// Check if current token is a word matching (case-insensitive).
    ///
    /// Quoted identifiers never match, so a column named `` `key` `` is not
    /// mistaken for the KEY keyword.
    #[inline]
    pub fn check_word_ci(&self, word: &str) -> bool {
        match self.current_token() {
            Some(token) => matches!(
                &token.token,
                Token::Word(w) if w.quote_style.is_none() && w.value.eq_ignore_ascii_case(word)
            ),
            None => false,
        }
    }

    /// Check if current token matches a token type (by discriminant).
    #[inline]
    pub fn check_token(&self, expected: &Token) -> bool {
        match self.current_token() {
            Some(token) => std::mem::discriminant(&token.token) == std::mem::discriminant(expected),
            None => false,
        }
    }

    /// Consume a word (case-insensitive) if it is next.
    pub fn expect_word_ci(&mut self, word: &str) -> Option<()> {
        if self.check_word_ci(word) {
            self.advance();
            Some(())
        } else {
            None
        }
    }

    pub fn expect_token(&mut self, expected: &Token) -> Option<()> {
        if self.check_token(expected) {
            self.advance();
            Some(())
        } else {
            None
        }
    }

    /// Consume the next non-whitespace word if it matches, leaving the cursor
    /// untouched otherwise.
    pub fn expect_next_word_ci(&mut self, word: &str) -> Option<()> {
        let saved = self.pos;
        self.skip_whitespace();
        if self.expect_word_ci(word).is_some() {
            Some(())
        } else {
            self.pos = saved;
            None
        }
    }

    // ========================================================================
    // Identifier parsing
    // ========================================================================

    /// Parse an identifier (quoted or bare), returning its unquoted value.
    ///
    /// The MySQL dialect reads `"name"` as a string literal; in identifier
    /// position it is taken as an ANSI-quoted name.
    pub fn parse_identifier(&mut self) -> Option<String> {
        let name = match &self.current_token()?.token {
            Token::Word(w) => w.value.clone(),
            Token::DoubleQuotedString(s) => s.clone(),
            _ => return None,
        };
        self.advance();
        Some(name)
    }

    // ========================================================================
    // Parenthesized groups
    // ========================================================================

    /// Skip a parenthesized group, handling nesting. Cursor must be on `(`.
    pub fn skip_parenthesized(&mut self) {
        if !self.check_token(&Token::LParen) {
            return;
        }

        let mut depth = 0usize;
        while !self.is_at_end() {
            if self.check_token(&Token::LParen) {
                depth += 1;
            } else if self.check_token(&Token::RParen) {
                depth -= 1;
                if depth == 0 {
                    self.advance();
                    return;
                }
            }
            self.advance();
        }
    }

    /// Consume a parenthesized group and return it as text, parens included.
    ///
    /// Returns `None` if not at `(` or if the group never closes.
    pub fn consume_parenthesized(&mut self) -> Option<String> {
        if !self.check_token(&Token::LParen) {
            return None;
        }

        let start_pos = self.pos;
        let mut depth = 0usize;

        while !self.is_at_end() {
            if self.check_token(&Token::LParen) {
                depth += 1;
            } else if self.check_token(&Token::RParen) {
                depth -= 1;
                if depth == 0 {
                    let end_pos = self.pos + 1;
                    self.advance();
                    return Some(self.tokens_to_string(start_pos, end_pos));
                }
            }
            self.advance();
        }

        None
    }

    /// Concatenate tokens `start_pos..end_pos` back into SQL text.
    pub fn tokens_to_string(&self, start_pos: usize, end_pos: usize) -> String {
        self.tokens[start_pos..end_pos]
            .iter()
            .map(|t| format_token(&t.token))
            .collect()
    }
}
