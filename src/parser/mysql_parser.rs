//! MySQL DDL parse pipeline
//!
//! preprocess → split statements → classify → CREATE/ALTER handlers →
//! implicit relationship detection over the full table set.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;
use tracing::{debug, info};

use super::parsed::{ParseError, ParseResult};
use super::preprocess_parser::preprocess_sql;
use super::statement_parser::{classify_statement, split_statements, StatementKind};
use super::table_parser::{apply_alter_table, parse_create_table};
use crate::relationship::{detect_implicit_relationships, IdSuffixNaming, ReferenceNaming};

/// Minimum number of sources to benefit from parallel processing.
/// Below this threshold, sequential processing is faster due to rayon overhead.
const PARALLEL_THRESHOLD: usize = 8;

/// Parser tuning
pub struct ParseOptions {
    /// Unsupported statements at or below this many characters are skipped
    /// without a warning
    pub unsupported_warning_threshold: usize,
    /// Characters of an unsupported statement quoted in its warning
    pub warning_preview_len: usize,
    /// Strategy for implicit relationship detection
    pub naming: Box<dyn ReferenceNaming>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            unsupported_warning_threshold: 10,
            warning_preview_len: 50,
            naming: Box::new(IdSuffixNaming),
        }
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field(
                "unsupported_warning_threshold",
                &self.unsupported_warning_threshold,
            )
            .field("warning_preview_len", &self.warning_preview_len)
            .finish_non_exhaustive()
    }
}

/// A named DDL text, e.g. one file's contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlSource {
    pub name: String,
    pub sql: String,
}

impl SqlSource {
    pub fn new(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql: sql.into(),
        }
    }
}

/// Parse DDL text with default options.
///
/// Never fails: malformed input shows up as `error` entries in the result.
pub fn parse_sql(sql: &str) -> ParseResult {
    parse_sql_with(sql, &ParseOptions::default())
}

/// Parse DDL text.
pub fn parse_sql_with(sql: &str, options: &ParseOptions) -> ParseResult {
    let mut result = parse_statements(sql, options);
    detect_implicit(&mut result, options);
    log_summary(&result);
    result
}

/// Parse several sources as one schema.
///
/// Each source is parsed on its own (in parallel for larger sets), results
/// are concatenated in input order, and implicit detection runs once over
/// all tables. Entries in `errors` carry their source name.
pub fn parse_sources(sources: &[SqlSource], options: &ParseOptions) -> ParseResult {
    let parse_one = |source: &SqlSource| {
        let mut partial = parse_statements(&source.sql, options);
        for error in &mut partial.errors {
            error.source = Some(source.name.clone());
        }
        partial
    };

    let partials: Vec<ParseResult> = if sources.len() >= PARALLEL_THRESHOLD {
        sources.par_iter().map(parse_one).collect()
    } else {
        sources.iter().map(parse_one).collect()
    };

    let mut result = ParseResult::default();
    for partial in partials {
        result.extend(partial);
    }
    detect_implicit(&mut result, options);
    log_summary(&result);
    result
}

/// Everything except implicit detection.
fn parse_statements(sql: &str, options: &ParseOptions) -> ParseResult {
    let mut result = ParseResult::default();
    let statements = split_statements(&preprocess_sql(sql));

    for (index, stmt) in statements.iter().enumerate() {
        let line = index + 1;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            handle_statement(stmt, line, options, &mut result)
        }));
        if let Err(payload) = outcome {
            result.errors.push(internal_fault(payload));
        }
    }

    result
}

fn handle_statement(stmt: &str, line: usize, options: &ParseOptions, result: &mut ParseResult) {
    match classify_statement(stmt) {
        StatementKind::CreateTable => parse_create_table(stmt, line, result),
        StatementKind::AlterTable => apply_alter_table(stmt, line, result),
        StatementKind::Ignorable => debug!(line, "Skipping statement"),
        StatementKind::Unsupported => {
            if stmt.chars().count() > options.unsupported_warning_threshold {
                let preview: String = stmt.chars().take(options.warning_preview_len).collect();
                result.errors.push(ParseError::warning(
                    line,
                    format!("Skipped unsupported statement: {}...", preview),
                ));
            }
        }
    }
}

fn detect_implicit(result: &mut ParseResult, options: &ParseOptions) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        detect_implicit_relationships(
            &result.tables,
            &result.relationships,
            options.naming.as_ref(),
        )
    }));
    match outcome {
        Ok(implicit) => result.relationships.extend(implicit),
        Err(payload) => result.errors.push(internal_fault(payload)),
    }
}

/// The synthetic line-0 entry for a panic caught while parsing.
fn internal_fault(payload: Box<dyn Any + Send>) -> ParseError {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "Unknown error".to_string());
    ParseError::error(0, format!("Unexpected parsing error: {}", detail))
}

fn log_summary(result: &ParseResult) {
    info!(
        tables = result.tables.len(),
        relationships = result.relationships.len(),
        errors = result.error_count(),
        warnings = result.warning_count(),
        "Parsed DDL"
    );
}
