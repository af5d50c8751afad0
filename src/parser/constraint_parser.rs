//! Token-based constraint parsing for MySQL DDL
//!
//! ## Supported Syntax
//!
//! Table-level definitions inside CREATE TABLE:
//! ```sql
//! [CONSTRAINT [name]] PRIMARY KEY [USING BTREE] (`a`, `b`)
//! [CONSTRAINT [name]] UNIQUE [KEY|INDEX] [name] (`a`(10) DESC)
//! [FULLTEXT|SPATIAL] {KEY|INDEX} [name] (`a`)
//! [CONSTRAINT [name]] FOREIGN KEY [name] (`a`) REFERENCES [db.]`t` (`id`) [ON DELETE ...]
//! [CONSTRAINT [name]] CHECK (expr)
//! ```
//!
//! ALTER TABLE, any number of comma-separated actions:
//! ```sql
//! ALTER TABLE [db.]`t` ADD CONSTRAINT `fk` FOREIGN KEY (`a`) REFERENCES `u` (`id`),
//!     ADD PRIMARY KEY (`id`), ADD KEY `ix` (`b`), MODIFY `c` INT
//! ```
//! Actions other than ADD of a key or constraint are skipped.

use sqlparser::tokenizer::{Token, Word};

use super::token_parser_base::TokenParser;

/// Parsed constraint result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenParsedConstraint {
    PrimaryKey {
        columns: Vec<String>,
    },
    Unique {
        columns: Vec<String>,
    },
    /// KEY / INDEX / FULLTEXT / SPATIAL
    Index {
        columns: Vec<String>,
    },
    ForeignKey {
        columns: Vec<String>,
        referenced_table: String,
        referenced_columns: Vec<String>,
    },
    Check,
}

/// Result of parsing an ALTER TABLE statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenParsedAlterTable {
    pub table_name: String,
    /// Constraints added by the statement, in order
    pub constraints: Vec<TokenParsedConstraint>,
}

/// Words that open a table-level (non-column) definition.
const CONSTRAINT_LEADERS: &[&str] = &[
    "CONSTRAINT",
    "PRIMARY",
    "UNIQUE",
    "KEY",
    "INDEX",
    "FULLTEXT",
    "SPATIAL",
    "FOREIGN",
    "CHECK",
];

/// Token-based constraint parser
pub struct ConstraintTokenParser {
    base: TokenParser,
}

impl ConstraintTokenParser {
    /// Create a new parser for a SQL string
    pub fn new(sql: &str) -> Option<Self> {
        Some(Self {
            base: TokenParser::new(sql).ok()?,
        })
    }

    /// True if the cursor sits on a word that opens a constraint definition.
    fn at_constraint_leader(&self) -> bool {
        CONSTRAINT_LEADERS
            .iter()
            .any(|word| self.base.check_word_ci(word))
    }

    /// Parse a table-level constraint definition, named or unnamed.
    pub fn parse_table_constraint(&mut self) -> Option<TokenParsedConstraint> {
        self.base.skip_whitespace();

        // CONSTRAINT [symbol]: the symbol is optional in MySQL
        if self.base.expect_word_ci("CONSTRAINT").is_some() {
            self.base.skip_whitespace();
            if !self.at_constraint_leader() {
                self.base.parse_identifier()?;
                self.base.skip_whitespace();
            }
        }

        if self.base.expect_word_ci("PRIMARY").is_some() {
            self.base.expect_next_word_ci("KEY")?;
            let columns = self.parse_named_key_column_list()?;
            Some(TokenParsedConstraint::PrimaryKey { columns })
        } else if self.base.expect_word_ci("UNIQUE").is_some() {
            if self.base.expect_next_word_ci("KEY").is_none() {
                let _ = self.base.expect_next_word_ci("INDEX");
            }
            let columns = self.parse_named_key_column_list()?;
            Some(TokenParsedConstraint::Unique { columns })
        } else if self.base.expect_word_ci("FULLTEXT").is_some()
            || self.base.expect_word_ci("SPATIAL").is_some()
        {
            if self.base.expect_next_word_ci("KEY").is_none() {
                let _ = self.base.expect_next_word_ci("INDEX");
            }
            let columns = self.parse_named_key_column_list()?;
            Some(TokenParsedConstraint::Index { columns })
        } else if self.base.expect_word_ci("KEY").is_some()
            || self.base.expect_word_ci("INDEX").is_some()
        {
            let columns = self.parse_named_key_column_list()?;
            Some(TokenParsedConstraint::Index { columns })
        } else if self.base.expect_word_ci("FOREIGN").is_some() {
            self.base.expect_next_word_ci("KEY")?;
            self.parse_foreign_key_body()
        } else if self.base.expect_word_ci("CHECK").is_some() {
            Some(TokenParsedConstraint::Check)
        } else {
            None
        }
    }

    /// `[name] (cols) REFERENCES [db.]table (cols)`; the cursor is after
    /// FOREIGN KEY.
    fn parse_foreign_key_body(&mut self) -> Option<TokenParsedConstraint> {
        let columns = self.parse_named_key_column_list()?;

        self.base.expect_next_word_ci("REFERENCES")?;
        self.base.skip_whitespace();
        let referenced_table = self.parse_qualified_name()?;
        self.base.skip_whitespace();
        let referenced_columns = self.parse_key_column_list()?;

        Some(TokenParsedConstraint::ForeignKey {
            columns,
            referenced_table,
            referenced_columns,
        })
    }

    /// Skip an optional index name and `USING {BTREE|HASH}`, then read the
    /// column list.
    fn parse_named_key_column_list(&mut self) -> Option<Vec<String>> {
        loop {
            self.base.skip_whitespace();
            match self.base.current()? {
                Token::LParen => break,
                Token::Word(_) | Token::DoubleQuotedString(_) => self.base.advance(),
                _ => return None,
            }
        }
        self.parse_key_column_list()
    }

    /// Parse a key column list: `(a, b(10), c DESC)`.
    ///
    /// Prefix lengths and ASC/DESC are dropped. Functional key parts
    /// (`((lower(a)))`) contribute no column. Returns `None` if the list is
    /// missing or never closes.
    fn parse_key_column_list(&mut self) -> Option<Vec<String>> {
        self.base.expect_token(&Token::LParen)?;

        let mut columns = Vec::new();
        let mut expecting_name = true;
        loop {
            self.base.skip_whitespace();
            match self.base.current()? {
                Token::RParen => {
                    self.base.advance();
                    break;
                }
                Token::Comma => {
                    self.base.advance();
                    expecting_name = true;
                }
                Token::LParen => {
                    self.base.skip_parenthesized();
                    expecting_name = false;
                }
                Token::Word(Word { value, .. }) | Token::DoubleQuotedString(value)
                    if expecting_name =>
                {
                    self.base.advance();
                    columns.push(value);
                    expecting_name = false;
                }
                _ => self.base.advance(),
            }
        }

        Some(columns)
    }

    /// Parse `name` or `db.name`, returning the last segment.
    fn parse_qualified_name(&mut self) -> Option<String> {
        let mut name = self.base.parse_identifier()?;
        while self.base.expect_token(&Token::Period).is_some() {
            name = self.base.parse_identifier()?;
        }
        Some(name)
    }

    /// Parse a full ALTER TABLE statement.
    pub fn parse_alter_table(&mut self) -> Option<TokenParsedAlterTable> {
        self.base.skip_whitespace();
        self.base.expect_word_ci("ALTER")?;
        let _ = self.base.expect_next_word_ci("ONLINE");
        let _ = self.base.expect_next_word_ci("IGNORE");
        self.base.expect_next_word_ci("TABLE")?;
        self.base.skip_whitespace();

        let table_name = self.parse_qualified_name()?;
        let mut constraints = Vec::new();

        while !self.base.is_at_end() {
            self.base.skip_whitespace();
            if self.base.expect_word_ci("ADD").is_some() {
                self.base.skip_whitespace();
                if self.at_constraint_leader() {
                    if let Some(constraint) = self.parse_table_constraint() {
                        constraints.push(constraint);
                    }
                }
            }
            self.skip_to_next_action();
        }

        Some(TokenParsedAlterTable {
            table_name,
            constraints,
        })
    }

    /// Advance past the next top-level comma (or to the end).
    fn skip_to_next_action(&mut self) {
        while let Some(token) = self.base.current() {
            match token {
                Token::Comma => {
                    self.base.advance();
                    return;
                }
                Token::LParen => self.base.skip_parenthesized(),
                _ => self.base.advance(),
            }
        }
    }
}

/// True if a CREATE TABLE body definition is a key or constraint rather
/// than a column.
pub fn is_constraint_definition(def: &str) -> bool {
    match ConstraintTokenParser::new(def) {
        Some(mut parser) => {
            parser.base.skip_whitespace();
            parser.at_constraint_leader()
        }
        None => false,
    }
}

/// Parse a table-level constraint using tokens
pub fn parse_table_constraint_tokens(constraint_def: &str) -> Option<TokenParsedConstraint> {
    ConstraintTokenParser::new(constraint_def)?.parse_table_constraint()
}

/// Parse an ALTER TABLE statement using tokens
pub fn parse_alter_table_tokens(sql: &str) -> Option<TokenParsedAlterTable> {
    ConstraintTokenParser::new(sql)?.parse_alter_table()
}
