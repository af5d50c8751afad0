//! Intermediate schema produced by one parse invocation.
//!
//! These values carry no identity: they are created per parse and consumed by
//! the import merge, which assigns ids.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::data_types::DataType;

/// A column extracted from a CREATE TABLE body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedColumn {
    pub name: String,
    pub data_type: DataType,
    /// True unless the definition says `NOT NULL`
    pub nullable: bool,
    pub auto_increment: bool,
    pub unsigned: bool,
    /// Default value; a `NULL` default is stored as `None`
    pub default_value: Option<String>,
    pub comment: Option<String>,
}

/// A table extracted from a CREATE TABLE statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTable {
    pub name: String,
    pub columns: Vec<ParsedColumn>,
    pub primary_keys: Vec<String>,
    /// One entry per unique constraint; each entry lists its columns
    #[serde(default)]
    pub unique_keys: Vec<Vec<String>>,
    #[serde(default)]
    pub indexes: Vec<Vec<String>>,
}

impl ParsedTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn column(&self, name: &str) -> Option<&ParsedColumn> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_keys
            .iter()
            .any(|pk| pk.eq_ignore_ascii_case(column))
    }

    /// True if the column is the sole member of some unique key.
    pub fn is_single_column_unique(&self, column: &str) -> bool {
        self.unique_keys
            .iter()
            .any(|uk| uk.len() == 1 && uk[0].eq_ignore_ascii_case(column))
    }

    /// True if the column appears in any unique key, composite ones included.
    pub fn in_unique_key(&self, column: &str) -> bool {
        self.unique_keys
            .iter()
            .any(|uk| uk.iter().any(|c| c.eq_ignore_ascii_case(column)))
    }

    pub fn in_index(&self, column: &str) -> bool {
        self.indexes
            .iter()
            .any(|idx| idx.iter().any(|c| c.eq_ignore_ascii_case(column)))
    }

    pub fn is_unique_or_primary(&self, column: &str) -> bool {
        self.is_primary_key(column) || self.is_single_column_unique(column)
    }

    /// Key-list entries that name no column of this table.
    pub fn dangling_key_columns(&self) -> Vec<&str> {
        let mut dangling: Vec<&str> = Vec::new();
        let key_columns = self
            .primary_keys
            .iter()
            .chain(self.unique_keys.iter().flatten())
            .chain(self.indexes.iter().flatten());
        for name in key_columns {
            if !self.has_column(name) && !dangling.iter().any(|d| d.eq_ignore_ascii_case(name)) {
                dangling.push(name.as_str());
            }
        }
        dangling
    }
}

/// How a relationship was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipOrigin {
    /// Declared by a FOREIGN KEY clause
    Explicit,
    /// Inferred from column naming
    Implicit,
}

impl fmt::Display for RelationshipOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationshipOrigin::Explicit => f.write_str("explicit"),
            RelationshipOrigin::Implicit => f.write_str("implicit"),
        }
    }
}

/// A reference from one table's column to another's.
///
/// Cardinality is not stored here; it is derived at commit time from the two
/// endpoint tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRelationship {
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
    #[serde(rename = "type")]
    pub origin: RelationshipOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A parse problem. `line` is the 1-based statement index, or 0 for
/// internal faults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
    pub severity: Severity,
    /// Name of the source the statement came from, when parsing several
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ParseError {
    pub fn error(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
            severity: Severity::Error,
            source: None,
        }
    }

    pub fn warning(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
            severity: Severity::Warning,
            source: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// `source:line: severity: message`, with the source omitted when unknown
impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "{}:", source)?;
        }
        write!(f, "{}: {}: {}", self.line, self.severity, self.message)
    }
}

/// Everything one parse invocation produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub tables: Vec<ParsedTable>,
    pub relationships: Vec<ParsedRelationship>,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// True if any entry has `error` severity, which blocks a commit.
    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(ParseError::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.errors.iter().filter(|e| e.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.errors.len() - self.error_count()
    }

    /// Table by case-insensitive name (first match).
    pub fn table(&self, name: &str) -> Option<&ParsedTable> {
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub(crate) fn table_mut(&mut self, name: &str) -> Option<&mut ParsedTable> {
        self.tables
            .iter_mut()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Append another result, keeping order.
    pub(crate) fn extend(&mut self, other: ParseResult) {
        self.tables.extend(other.tables);
        self.relationships.extend(other.relationships);
        self.errors.extend(other.errors);
    }
}
