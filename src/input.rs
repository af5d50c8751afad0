//! Locating and reading DDL source files

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use encoding_rs::WINDOWS_1252;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::DdlIngestError;
use crate::parser::SqlSource;

/// Argument that reads SQL from standard input
pub const STDIN_ARG: &str = "-";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode file bytes as UTF-8, falling back to Windows-1252.
/// A UTF-8 byte order mark is dropped.
pub fn decode_sql_bytes(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => Some(s.to_string()),
        Err(_) => {
            // SQL dumps made on Windows
            let (decoded, _, had_errors) = WINDOWS_1252.decode(bytes);
            if had_errors {
                None
            } else {
                Some(decoded.into_owned())
            }
        }
    }
}

pub fn read_sql_file(path: &Path) -> Result<String, DdlIngestError> {
    let bytes = std::fs::read(path).map_err(|e| DdlIngestError::SqlFileReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    decode_sql_bytes(&bytes).ok_or_else(|| DdlIngestError::InvalidEncoding {
        path: path.to_path_buf(),
    })
}

fn is_sql_file(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("sql"))
}

fn is_pattern(arg: &str) -> bool {
    arg.contains(['*', '?', '['])
}

/// Expand one path argument into SQL files.
///
/// Wildcard arguments go through `glob`, directories are walked recursively
/// for `*.sql`, and anything else is taken as a file. Results are sorted.
pub fn discover_sql_files(arg: &str) -> Result<Vec<PathBuf>, DdlIngestError> {
    let mut files = Vec::new();

    if is_pattern(arg) {
        let paths = glob::glob(arg).map_err(|e| DdlIngestError::InvalidPattern {
            pattern: arg.to_string(),
            source: e,
        })?;
        files.extend(
            paths
                .filter_map(|p| p.ok())
                .filter(|p| p.is_file() && is_sql_file(p)),
        );
    } else {
        let path = Path::new(arg);
        if path.is_dir() {
            for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
                if entry.file_type().is_file() && is_sql_file(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    debug!(arg, files = files.len(), "Discovered SQL files");
    Ok(files)
}

/// Read every source named by `args` in argument order.
pub fn load_sources<S: AsRef<str>>(args: &[S]) -> Result<Vec<SqlSource>> {
    let mut sources = Vec::new();

    for arg in args {
        let arg = arg.as_ref();
        if arg == STDIN_ARG {
            let mut bytes = Vec::new();
            std::io::stdin()
                .read_to_end(&mut bytes)
                .context("Failed to read SQL from stdin")?;
            let sql = decode_sql_bytes(&bytes).context("stdin is neither UTF-8 nor Windows-1252")?;
            sources.push(SqlSource::new("<stdin>", sql));
            continue;
        }

        let files = discover_sql_files(arg)?;
        if files.is_empty() {
            return Err(DdlIngestError::NoSqlFiles {
                path: PathBuf::from(arg),
            }
            .into());
        }
        for file in files {
            let sql = read_sql_file(&file)?;
            sources.push(SqlSource::new(file.display().to_string(), sql));
        }
    }

    Ok(sources)
}
