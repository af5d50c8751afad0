//! Common test utilities for ddl-ingest tests

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use tempfile::TempDir;

use ddl_ingest::model::{Diagram, SequentialIds};
use ddl_ingest::palette::SeededPalette;
use ddl_ingest::{FileStore, ImportOptions, Importer, MemoryStore, SchemaStore};

/// Get the path to a test fixture
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Read a fixture's SQL text
pub fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|e| panic!("Failed to read fixture '{}': {}", name, e))
}

/// Importer with counter ids and a fixed colour seed
pub fn deterministic_importer(prefix: &str) -> Importer {
    Importer::with_sources(
        ImportOptions::default(),
        Box::new(SequentialIds::new(prefix)),
        Box::new(SeededPalette::new(42)),
    )
}

/// Memory store holding one empty diagram
pub fn memory_store_with_diagram(name: &str) -> (MemoryStore, Diagram) {
    let mut store = MemoryStore::with_ids(Box::new(SequentialIds::new("diagram-")));
    let diagram = store
        .create_diagram(name)
        .expect("Failed to create diagram");
    (store, diagram)
}

/// Empty diagram value that was never stored
pub fn detached_diagram(id: &str) -> Diagram {
    let now = Utc::now();
    Diagram {
        id: id.to_string(),
        name: "detached".to_string(),
        created_at: now,
        updated_at: now,
        version: 0,
        tables: Vec::new(),
        relationships: Vec::new(),
    }
}

/// Test context with a temporary directory holding a store file
pub struct StoreContext {
    /// Kept to prevent temp directory cleanup until StoreContext is dropped
    _temp_dir: TempDir,
    pub dir: PathBuf,
    pub store_path: PathBuf,
}

impl StoreContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path().to_path_buf();
        let store_path = dir.join("diagrams.json");
        Self {
            _temp_dir: temp_dir,
            dir,
            store_path,
        }
    }

    /// A fresh handle on the store file
    pub fn store(&self) -> FileStore {
        FileStore::open(&self.store_path)
    }

    /// Write a SQL file into the context directory and return its path
    pub fn write_sql(&self, name: &str, sql: &str) -> PathBuf {
        let path = self.dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create fixture directory");
        }
        fs::write(&path, sql).expect("Failed to write SQL file");
        path
    }

    /// Copy a fixture into the context directory
    pub fn copy_fixture(&self, name: &str) -> PathBuf {
        self.write_sql(name, &read_fixture(name))
    }
}
