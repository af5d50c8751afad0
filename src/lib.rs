//! ddl-ingest: MySQL DDL into entity-relationship diagrams
//!
//! This library parses `CREATE TABLE` / `ALTER TABLE` dumps into tables,
//! columns and relationships, infers missing relationships from column
//! naming, and merges the result into stored diagrams with automatic layout.

pub mod editor;
pub mod error;
pub mod import;
pub mod input;
pub mod layout;
pub mod model;
pub mod palette;
pub mod parser;
pub mod relationship;
pub mod store;

use std::path::PathBuf;

use anyhow::{bail, Result};
use tracing::{info, warn};

pub use editor::DiagramEditor;
pub use error::{DdlIngestError, EditorError, ImportError, StoreError};
pub use import::{ImportOptions, ImportRequest, ImportResponse, Importer};
pub use parser::{parse_sources, parse_sql, ParseOptions, ParseResult};
pub use store::{FileStore, MemoryStore, SchemaStore};

/// Options for importing SQL files into a stored diagram
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Files, directories, glob patterns, or `-` for stdin
    pub inputs: Vec<String>,
    /// JSON store file
    pub store_path: PathBuf,
    /// Target diagram
    pub diagram_id: String,
    /// Commit even when some statements failed to parse
    pub allow_errors: bool,
    pub import: ImportOptions,
}

/// Read and parse every input.
pub fn parse_inputs<S: AsRef<str>>(inputs: &[S], options: &ParseOptions) -> Result<ParseResult> {
    let sources = input::load_sources(inputs)?;
    let result = parse_sources(&sources, options);
    info!(
        sources = sources.len(),
        tables = result.tables.len(),
        relationships = result.relationships.len(),
        errors = result.error_count(),
        warnings = result.warning_count(),
        "Parsed inputs"
    );
    Ok(result)
}

/// Parse the inputs and import them into a diagram of a file store.
///
/// Parse errors block the import unless `allow_errors` is set; warnings
/// never do. The parse result is returned alongside the import response so
/// callers can report its diagnostics.
pub fn ingest(options: IngestOptions) -> Result<(ParseResult, ImportResponse)> {
    let parsed = parse_inputs(&options.inputs, &ParseOptions::default())?;

    if parsed.has_errors() {
        if !options.allow_errors {
            bail!(
                "{} statement(s) failed to parse; nothing was imported (use --allow-errors to import the rest)",
                parsed.error_count()
            );
        }
        warn!(
            errors = parsed.error_count(),
            "Importing despite parse errors"
        );
    }

    let mut store = FileStore::open(&options.store_path);
    let mut importer = Importer::new(options.import);
    let request = ImportRequest {
        tables: parsed.tables.clone(),
        relationships: parsed.relationships.clone(),
    };
    let response = importer.import(&mut store, &options.diagram_id, &request)?;

    Ok((parsed, response))
}
