//! In-process diagram store

use super::{DiagramSet, SchemaStore};
use crate::error::StoreError;
use crate::model::{
    Diagram, DiagramListing, IdSource, ImportPlan, ReconcileSummary, Relationship, Table, UuidIds,
};

/// Diagrams held in memory for the lifetime of the value.
pub struct MemoryStore {
    set: DiagramSet,
    ids: Box<dyn IdSource>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_ids(Box::new(UuidIds))
    }

    pub fn with_ids(ids: Box<dyn IdSource>) -> Self {
        Self {
            set: DiagramSet::default(),
            ids,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaStore for MemoryStore {
    fn create_diagram(&mut self, name: &str) -> Result<Diagram, StoreError> {
        self.set.create(self.ids.as_mut(), name)
    }

    fn list_diagrams(&self) -> Result<Vec<DiagramListing>, StoreError> {
        Ok(self.set.list())
    }

    fn get_diagram(&self, id: &str) -> Result<Diagram, StoreError> {
        self.set.get(id)
    }

    fn rename_diagram(&mut self, id: &str, name: &str) -> Result<Diagram, StoreError> {
        self.set.rename(id, name)
    }

    fn delete_diagram(&mut self, id: &str) -> Result<(), StoreError> {
        self.set.delete(id)
    }

    fn save_diagram(
        &mut self,
        id: &str,
        tables: Vec<Table>,
        relationships: Vec<Relationship>,
    ) -> Result<ReconcileSummary, StoreError> {
        self.set.save(id, tables, relationships)
    }

    fn commit_import(
        &mut self,
        id: &str,
        expected_version: u64,
        plan: &ImportPlan,
    ) -> Result<u64, StoreError> {
        self.set.commit_import(id, expected_version, plan)
    }
}
