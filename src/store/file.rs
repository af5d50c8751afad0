//! JSON-file diagram store
//!
//! The whole diagram set lives in one JSON document. Every mutation takes an
//! exclusive lock on a sibling `<store>.lock` file, reloads the document,
//! applies the change and atomically replaces the file, so a failed or
//! interrupted write leaves the previous content in place. Writers in other
//! handles or processes queue on the lock, and the version check in
//! [`SchemaStore::commit_import`] runs against the state reloaded under it.
//! Reads take no lock: the atomic replace means they see either the old or
//! the new document.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fd_lock::RwLock;
use tempfile::NamedTempFile;
use tracing::debug;

use super::{DiagramSet, SchemaStore};
use crate::error::StoreError;
use crate::model::{
    Diagram, DiagramListing, IdSource, ImportPlan, ReconcileSummary, Relationship, Table, UuidIds,
};

pub struct FileStore {
    path: PathBuf,
    ids: Box<dyn IdSource>,
}

impl FileStore {
    /// Use `path` as the store. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_ids(path, Box::new(UuidIds))
    }

    pub fn with_ids(path: impl Into<PathBuf>, ids: Box<dyn IdSource>) -> Self {
        Self {
            path: path.into(),
            ids,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<DiagramSet, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(DiagramSet::default()),
            Err(e) => return Err(self.io_error(e)),
        };
        if content.trim().is_empty() {
            return Ok(DiagramSet::default());
        }
        serde_json::from_str(&content).map_err(|e| StoreError::Json {
            path: self.path.clone(),
            source: e,
        })
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// `<store>.lock` next to the store file. The store file itself is
    /// replaced on every write, so it cannot carry the lock.
    fn lock_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".lock");
        PathBuf::from(name)
    }

    fn open_lock_file(&self) -> Result<File, StoreError> {
        fs::create_dir_all(self.dir()).map_err(|e| self.io_error(e))?;
        let lock_path = self.lock_path();
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|source| StoreError::Io {
                path: lock_path,
                source,
            })
    }

    fn persist(&self, set: &DiagramSet) -> Result<(), StoreError> {
        let dir = self.dir();
        fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;

        let json = serde_json::to_vec_pretty(set).map_err(|e| StoreError::Json {
            path: self.path.clone(),
            source: e,
        })?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(&json).map_err(|e| self.io_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;

        debug!(path = %self.path.display(), diagrams = set.diagrams.len(), "Wrote store");
        Ok(())
    }

    /// Under the store lock: load, apply `f`, and write back only if `f`
    /// succeeded.
    fn update<T>(
        &mut self,
        f: impl FnOnce(&mut DiagramSet, &mut dyn IdSource) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut lock = RwLock::new(self.open_lock_file()?);
        let _guard = lock.write().map_err(|source| StoreError::Io {
            path: self.lock_path(),
            source,
        })?;
        debug!(path = %self.path.display(), "Acquired store lock");

        let mut set = self.load()?;
        let value = f(&mut set, self.ids.as_mut())?;
        self.persist(&set)?;
        Ok(value)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SchemaStore for FileStore {
    fn create_diagram(&mut self, name: &str) -> Result<Diagram, StoreError> {
        self.update(|set, ids| set.create(ids, name))
    }

    fn list_diagrams(&self) -> Result<Vec<DiagramListing>, StoreError> {
        Ok(self.load()?.list())
    }

    fn get_diagram(&self, id: &str) -> Result<Diagram, StoreError> {
        self.load()?.get(id)
    }

    fn rename_diagram(&mut self, id: &str, name: &str) -> Result<Diagram, StoreError> {
        self.update(|set, _| set.rename(id, name))
    }

    fn delete_diagram(&mut self, id: &str) -> Result<(), StoreError> {
        self.update(|set, _| set.delete(id))
    }

    fn save_diagram(
        &mut self,
        id: &str,
        tables: Vec<Table>,
        relationships: Vec<Relationship>,
    ) -> Result<ReconcileSummary, StoreError> {
        self.update(|set, _| set.save(id, tables, relationships))
    }

    fn commit_import(
        &mut self,
        id: &str,
        expected_version: u64,
        plan: &ImportPlan,
    ) -> Result<u64, StoreError> {
        self.update(|set, _| set.commit_import(id, expected_version, plan))
    }
}
