//! Error types for ddl-ingest

use std::path::PathBuf;
use thiserror::Error;

/// Errors reading DDL sources
#[derive(Error, Debug)]
pub enum DdlIngestError {
    #[error("Failed to read SQL file: {path}")]
    SqlFileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("SQL file is neither UTF-8 nor Windows-1252: {path}")]
    InvalidEncoding { path: PathBuf },

    #[error("Invalid file pattern: {pattern}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("No SQL files found under {path}")]
    NoSqlFiles { path: PathBuf },
}

/// Errors from a diagram store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Diagram not found: {id}")]
    DiagramNotFound { id: String },

    #[error("Diagram {id} was modified concurrently (expected version {expected}, found {found})")]
    VersionConflict {
        id: String,
        expected: u64,
        found: u64,
    },

    #[error("Diagram invariant violated: {message}")]
    InvariantViolation { message: String },

    #[error("Invalid name: {message}")]
    InvalidName { message: String },

    #[error("Failed to access store file: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store file is not valid JSON: {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures of the import endpoint
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("no tables provided")]
    NoTables,

    #[error("Diagram not found: {id}")]
    DiagramNotFound { id: String },

    #[error("Failed to import SQL")]
    Store(#[source] StoreError),
}

/// Rejected editor commands
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EditorError {
    #[error("Table not found: {id}")]
    TableNotFound { id: String },

    #[error("Column not found: {id}")]
    ColumnNotFound { id: String },

    #[error("Relationship not found: {id}")]
    RelationshipNotFound { id: String },

    #[error("Column {column_id} does not belong to table {table_id}")]
    ColumnOutsideTable { table_id: String, column_id: String },

    #[error("Table name \"{name}\" is already in use")]
    DuplicateTableName { name: String },

    #[error("Name must not be empty")]
    EmptyName,

    #[error("Column index {index} is out of range for a table with {len} columns")]
    IndexOutOfRange { index: usize, len: usize },
}

impl ImportError {
    /// HTTP-style status for the failure class.
    pub fn status_code(&self) -> u16 {
        match self {
            ImportError::NoTables => 400,
            ImportError::DiagramNotFound { .. } => 404,
            ImportError::Store(_) => 500,
        }
    }

    /// Underlying error text, when there is one.
    pub fn details(&self) -> Option<String> {
        match self {
            ImportError::Store(err) => Some(err.to_string()),
            _ => None,
        }
    }
}

impl From<StoreError> for ImportError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DiagramNotFound { id } => ImportError::DiagramNotFound { id },
            other => ImportError::Store(other),
        }
    }
}
