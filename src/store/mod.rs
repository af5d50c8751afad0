//! Diagram persistence
//!
//! [`SchemaStore`] is the boundary the importer and the CLI write through.
//! Every mutating call is all-or-nothing: the change is applied to a copy of
//! the diagram set, checked, and only then made visible.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::model::{
    Diagram, DiagramListing, DiagramSnapshot, IdSource, ImportPlan, ReconcileSummary,
    Relationship, Table,
};

/// Storage collaborator for diagrams
pub trait SchemaStore {
    /// Create an empty diagram. The name is trimmed and must not be empty.
    fn create_diagram(&mut self, name: &str) -> Result<Diagram, StoreError>;

    /// All diagrams, most recently updated first.
    fn list_diagrams(&self) -> Result<Vec<DiagramListing>, StoreError>;

    /// A full diagram with columns in declared order.
    fn get_diagram(&self, id: &str) -> Result<Diagram, StoreError>;

    fn rename_diagram(&mut self, id: &str, name: &str) -> Result<Diagram, StoreError>;

    /// Delete a diagram with everything in it.
    fn delete_diagram(&mut self, id: &str) -> Result<(), StoreError>;

    /// Replace a diagram's content with an editor state. See [`Diagram::reconcile`].
    fn save_diagram(
        &mut self,
        id: &str,
        tables: Vec<Table>,
        relationships: Vec<Relationship>,
    ) -> Result<ReconcileSummary, StoreError>;

    /// Existing table names and positions plus the version they were read at.
    fn snapshot(&self, id: &str) -> Result<DiagramSnapshot, StoreError> {
        let diagram = self.get_diagram(id)?;
        Ok(DiagramSnapshot {
            diagram_id: diagram.id.clone(),
            version: diagram.version,
            tables: diagram.table_summaries(),
        })
    }

    /// Append an import plan to a diagram.
    ///
    /// Fails with [`StoreError::VersionConflict`] if the diagram changed since
    /// `expected_version` was read. Returns the new version.
    fn commit_import(
        &mut self,
        id: &str,
        expected_version: u64,
        plan: &ImportPlan,
    ) -> Result<u64, StoreError>;
}

/// The persisted collection of diagrams, shared by both stores
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DiagramSet {
    #[serde(default)]
    pub diagrams: Vec<Diagram>,
}

impl DiagramSet {
    fn find(&self, id: &str) -> Result<&Diagram, StoreError> {
        self.diagrams
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| not_found(id))
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut Diagram, StoreError> {
        self.diagrams
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| not_found(id))
    }

    pub fn create(&mut self, ids: &mut dyn IdSource, name: &str) -> Result<Diagram, StoreError> {
        let name = validate_name(name)?;
        let now = Utc::now();
        let diagram = Diagram {
            id: ids.next_id(),
            name,
            created_at: now,
            updated_at: now,
            version: 0,
            tables: Vec::new(),
            relationships: Vec::new(),
        };
        debug!(id = %diagram.id, name = %diagram.name, "Created diagram");
        self.diagrams.push(diagram.clone());
        Ok(diagram)
    }

    pub fn list(&self) -> Vec<DiagramListing> {
        let mut listings: Vec<DiagramListing> = self.diagrams.iter().map(Diagram::listing).collect();
        listings.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        listings
    }

    pub fn get(&self, id: &str) -> Result<Diagram, StoreError> {
        let mut diagram = self.find(id)?.clone();
        for table in &mut diagram.tables {
            table.columns.sort_by_key(|c| c.order);
        }
        Ok(diagram)
    }

    pub fn rename(&mut self, id: &str, name: &str) -> Result<Diagram, StoreError> {
        let name = validate_name(name)?;
        let diagram = self.find_mut(id)?;
        diagram.name = name;
        touch(diagram);
        Ok(diagram.clone())
    }

    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let before = self.diagrams.len();
        self.diagrams.retain(|d| d.id != id);
        if self.diagrams.len() == before {
            return Err(not_found(id));
        }
        debug!(id, "Deleted diagram");
        Ok(())
    }

    pub fn save(
        &mut self,
        id: &str,
        tables: Vec<Table>,
        relationships: Vec<Relationship>,
    ) -> Result<ReconcileSummary, StoreError> {
        let diagram = self.find_mut(id)?;
        let summary = diagram.reconcile(tables, relationships)?;
        touch(diagram);
        debug!(id, ?summary, "Saved diagram");
        Ok(summary)
    }

    pub fn commit_import(
        &mut self,
        id: &str,
        expected_version: u64,
        plan: &ImportPlan,
    ) -> Result<u64, StoreError> {
        let diagram = self.find_mut(id)?;
        if diagram.version != expected_version {
            warn!(
                id,
                expected = expected_version,
                found = diagram.version,
                "Import rejected: diagram changed since snapshot"
            );
            return Err(StoreError::VersionConflict {
                id: id.to_string(),
                expected: expected_version,
                found: diagram.version,
            });
        }

        let mut next = diagram.clone();
        next.tables.extend(plan.tables.iter().cloned());
        next.relationships.extend(plan.relationships.iter().cloned());
        next.check_invariants()?;
        touch(&mut next);

        *diagram = next;
        debug!(
            id,
            version = diagram.version,
            tables = plan.tables.len(),
            relationships = plan.relationships.len(),
            "Committed import"
        );
        Ok(diagram.version)
    }
}

fn touch(diagram: &mut Diagram) {
    diagram.updated_at = Utc::now();
    diagram.version += 1;
}

fn not_found(id: &str) -> StoreError {
    StoreError::DiagramNotFound { id: id.to_string() }
}

fn validate_name(name: &str) -> Result<String, StoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidName {
            message: "diagram name must not be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}
