//! Single-writer editing state for one diagram.
//!
//! [`DiagramEditor`] owns a working copy of a diagram and applies named
//! commands to it. Every command keeps the diagram invariants: table names
//! stay unique, column order stays dense and no relationship outlives its
//! endpoints. Nothing is persisted until [`DiagramEditor::save`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EditorError, StoreError};
use crate::model::{
    Column, Diagram, IdSource, IndexType, ReconcileSummary, Relationship, RelationshipType, Table,
    UuidIds,
};
use crate::palette::{ColorSource, RandomPalette};
use crate::parser::DataType;
use crate::store::SchemaStore;

/// Offset applied to a duplicated table
const DUPLICATE_OFFSET: f64 = 50.0;

/// Partial table update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableUpdate {
    pub name: Option<String>,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
    pub color: Option<String>,
}

/// Partial column update. Nullable fields use `Some(None)` to clear.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnUpdate {
    pub name: Option<String>,
    pub data_type: Option<DataType>,
    pub nullable: Option<bool>,
    pub index_type: Option<IndexType>,
    pub auto_increment: Option<bool>,
    pub unsigned: Option<bool>,
    pub default_value: Option<Option<String>>,
    pub comment: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelationshipUpdate {
    pub source: Option<Endpoint>,
    pub target: Option<Endpoint>,
    #[serde(rename = "type")]
    pub relationship_type: Option<RelationshipType>,
    pub offset_x: Option<Option<f64>>,
    pub offset_y: Option<Option<f64>>,
}

/// One end of a relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub table_id: String,
    pub column_id: String,
}

impl Endpoint {
    pub fn new(table_id: impl Into<String>, column_id: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            column_id: column_id.into(),
        }
    }
}

/// Selected tables and the tables related to them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// In selection order
    pub selected: Vec<String>,
    /// The most recently selected table
    pub primary: Option<String>,
    /// Tables sharing a relationship with any selected table
    pub highlighted: BTreeSet<String>,
}

pub struct DiagramEditor {
    diagram: Diagram,
    selection: Selection,
    dirty: bool,
    ids: Box<dyn IdSource>,
    colors: Box<dyn ColorSource>,
}

impl DiagramEditor {
    /// Edit `diagram` with random ids and colours.
    pub fn new(diagram: Diagram) -> Self {
        Self::with_sources(diagram, Box::new(UuidIds), Box::new(RandomPalette))
    }

    pub fn with_sources(
        mut diagram: Diagram,
        ids: Box<dyn IdSource>,
        colors: Box<dyn ColorSource>,
    ) -> Self {
        diagram.normalize_column_order();
        Self {
            diagram,
            selection: Selection::default(),
            dirty: false,
            ids,
            colors,
        }
    }

    /// Load a diagram from a store.
    pub fn open(store: &dyn SchemaStore, diagram_id: &str) -> Result<Self, StoreError> {
        Ok(Self::new(store.get_diagram(diagram_id)?))
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn into_diagram(self) -> Diagram {
        self.diagram
    }

    pub fn tables(&self) -> &[Table] {
        &self.diagram.tables
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.diagram.relationships
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// True if there are unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // ---- tables ----

    /// Add a table at the given position with a default `id` primary key.
    pub fn create_table(&mut self, x: f64, y: f64) -> String {
        let table_id = self.ids.next_id();
        let name = self.unique_name(&format!("table_{}", self.diagram.tables.len() + 1), None);
        let id_column = Column {
            id: self.ids.next_id(),
            table_id: table_id.clone(),
            name: "id".to_string(),
            data_type: DataType::Bigint,
            nullable: false,
            index_type: IndexType::PrimaryKey,
            auto_increment: true,
            unsigned: true,
            default_value: None,
            comment: None,
            order: 0,
        };

        self.diagram.tables.push(Table {
            id: table_id.clone(),
            diagram_id: self.diagram.id.clone(),
            name,
            position_x: x,
            position_y: y,
            color: self.colors.next_color().to_string(),
            columns: vec![id_column],
        });
        self.dirty = true;
        self.select(vec![table_id.clone()]);
        table_id
    }

    pub fn update_table(&mut self, id: &str, update: TableUpdate) -> Result<(), EditorError> {
        let name = match update.name {
            Some(name) => Some(self.validate_table_name(&name, Some(id))?),
            None => None,
        };
        let table = self.table_mut(id)?;
        if let Some(name) = name {
            table.name = name;
        }
        if let Some(x) = update.position_x {
            table.position_x = x;
        }
        if let Some(y) = update.position_y {
            table.position_y = y;
        }
        if let Some(color) = update.color {
            table.color = color;
        }
        self.dirty = true;
        Ok(())
    }

    /// Delete a table with every relationship touching it.
    pub fn delete_table(&mut self, id: &str) -> Result<(), EditorError> {
        let index = self.table_index(id)?;
        self.diagram.tables.remove(index);
        let before = self.diagram.relationships.len();
        self.diagram.relationships.retain(|r| !r.touches_table(id));
        debug!(
            table = id,
            relationships = before - self.diagram.relationships.len(),
            "Deleted table"
        );

        let selected: Vec<String> = self
            .selection
            .selected
            .iter()
            .filter(|s| s.as_str() != id)
            .cloned()
            .collect();
        self.select(selected);
        self.dirty = true;
        Ok(())
    }

    /// Copy a table with fresh ids, offset from the original. Relationships
    /// are not copied. Returns the new table's id.
    pub fn duplicate_table(&mut self, id: &str) -> Result<String, EditorError> {
        let source = self.table(id)?.clone();
        let new_id = self.ids.next_id();
        let name = self.unique_name(&format!("{}_copy", source.name), None);

        let columns = source
            .columns
            .iter()
            .map(|col| Column {
                id: self.ids.next_id(),
                table_id: new_id.clone(),
                ..col.clone()
            })
            .collect();

        self.diagram.tables.push(Table {
            id: new_id.clone(),
            diagram_id: self.diagram.id.clone(),
            name,
            position_x: source.position_x + DUPLICATE_OFFSET,
            position_y: source.position_y + DUPLICATE_OFFSET,
            color: self.colors.next_color().to_string(),
            columns,
        });
        self.dirty = true;
        Ok(new_id)
    }

    /// Replace the selection and recompute related-table highlighting.
    /// Unknown ids are ignored.
    pub fn select(&mut self, ids: Vec<String>) {
        let selected: Vec<String> = ids
            .into_iter()
            .filter(|id| self.diagram.table(id).is_some())
            .collect();

        let mut highlighted = BTreeSet::new();
        for id in &selected {
            for rel in &self.diagram.relationships {
                if &rel.source_table_id == id {
                    highlighted.insert(rel.target_table_id.clone());
                } else if &rel.target_table_id == id {
                    highlighted.insert(rel.source_table_id.clone());
                }
            }
        }

        self.selection = Selection {
            primary: selected.last().cloned(),
            selected,
            highlighted,
        };
    }

    // ---- columns ----

    /// Append a nullable INT column named `column_<n+1>`. Returns its id.
    pub fn add_column(&mut self, table_id: &str) -> Result<String, EditorError> {
        let column_id = self.ids.next_id();
        let table = self.table_mut(table_id)?;
        let order = table.columns.len();
        table.columns.push(Column {
            id: column_id.clone(),
            table_id: table_id.to_string(),
            name: format!("column_{}", order + 1),
            data_type: DataType::Int,
            nullable: true,
            index_type: IndexType::None,
            auto_increment: false,
            unsigned: false,
            default_value: None,
            comment: None,
            order,
        });
        self.dirty = true;
        Ok(column_id)
    }

    pub fn update_column(&mut self, column_id: &str, update: ColumnUpdate) -> Result<(), EditorError> {
        let column = self
            .diagram
            .tables
            .iter_mut()
            .flat_map(|t| t.columns.iter_mut())
            .find(|c| c.id == column_id)
            .ok_or_else(|| EditorError::ColumnNotFound {
                id: column_id.to_string(),
            })?;

        if let Some(name) = update.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(EditorError::EmptyName);
            }
            column.name = name.to_string();
        }
        if let Some(data_type) = update.data_type {
            column.data_type = data_type;
        }
        if let Some(nullable) = update.nullable {
            column.nullable = nullable;
        }
        if let Some(index_type) = update.index_type {
            column.index_type = index_type;
        }
        if let Some(auto_increment) = update.auto_increment {
            column.auto_increment = auto_increment;
        }
        if let Some(unsigned) = update.unsigned {
            column.unsigned = unsigned;
        }
        if let Some(default_value) = update.default_value {
            column.default_value = default_value;
        }
        if let Some(comment) = update.comment {
            column.comment = comment;
        }
        self.dirty = true;
        Ok(())
    }

    /// Delete a column, renumber the rest, and drop relationships using it.
    pub fn delete_column(&mut self, column_id: &str) -> Result<(), EditorError> {
        let table = self
            .diagram
            .tables
            .iter_mut()
            .find(|t| t.columns.iter().any(|c| c.id == column_id))
            .ok_or_else(|| EditorError::ColumnNotFound {
                id: column_id.to_string(),
            })?;
        table.columns.retain(|c| c.id != column_id);
        renumber(&mut table.columns);

        self.diagram
            .relationships
            .retain(|r| !r.touches_column(column_id));
        self.refresh_highlight();
        self.dirty = true;
        Ok(())
    }

    /// Move the column at `from` to position `to`.
    pub fn reorder_column(&mut self, table_id: &str, from: usize, to: usize) -> Result<(), EditorError> {
        let table = self.table_mut(table_id)?;
        let len = table.columns.len();
        for index in [from, to] {
            if index >= len {
                return Err(EditorError::IndexOutOfRange { index, len });
            }
        }
        let column = table.columns.remove(from);
        table.columns.insert(to, column);
        renumber(&mut table.columns);
        self.dirty = true;
        Ok(())
    }

    // ---- relationships ----

    pub fn create_relationship(
        &mut self,
        source: Endpoint,
        target: Endpoint,
        relationship_type: RelationshipType,
    ) -> Result<String, EditorError> {
        self.check_endpoint(&source)?;
        self.check_endpoint(&target)?;

        let id = self.ids.next_id();
        self.diagram.relationships.push(Relationship {
            id: id.clone(),
            diagram_id: self.diagram.id.clone(),
            source_table_id: source.table_id,
            source_column_id: source.column_id,
            target_table_id: target.table_id,
            target_column_id: target.column_id,
            relationship_type,
            offset_x: None,
            offset_y: None,
        });
        self.refresh_highlight();
        self.dirty = true;
        Ok(id)
    }

    pub fn update_relationship(
        &mut self,
        id: &str,
        update: RelationshipUpdate,
    ) -> Result<(), EditorError> {
        if let Some(source) = &update.source {
            self.check_endpoint(source)?;
        }
        if let Some(target) = &update.target {
            self.check_endpoint(target)?;
        }

        let rel = self.relationship_mut(id)?;
        if let Some(source) = update.source {
            rel.source_table_id = source.table_id;
            rel.source_column_id = source.column_id;
        }
        if let Some(target) = update.target {
            rel.target_table_id = target.table_id;
            rel.target_column_id = target.column_id;
        }
        if let Some(relationship_type) = update.relationship_type {
            rel.relationship_type = relationship_type;
        }
        if let Some(offset_x) = update.offset_x {
            rel.offset_x = offset_x;
        }
        if let Some(offset_y) = update.offset_y {
            rel.offset_y = offset_y;
        }
        self.refresh_highlight();
        self.dirty = true;
        Ok(())
    }

    /// Swap source and target. 1:N becomes N:1 and back; 1:1 is unchanged.
    pub fn swap_relationship_direction(&mut self, id: &str) -> Result<(), EditorError> {
        let rel = self.relationship_mut(id)?;
        std::mem::swap(&mut rel.source_table_id, &mut rel.target_table_id);
        std::mem::swap(&mut rel.source_column_id, &mut rel.target_column_id);
        rel.relationship_type = rel.relationship_type.swapped();
        self.dirty = true;
        Ok(())
    }

    pub fn delete_relationship(&mut self, id: &str) -> Result<(), EditorError> {
        let before = self.diagram.relationships.len();
        self.diagram.relationships.retain(|r| r.id != id);
        if self.diagram.relationships.len() == before {
            return Err(EditorError::RelationshipNotFound { id: id.to_string() });
        }
        self.refresh_highlight();
        self.dirty = true;
        Ok(())
    }

    // ---- persistence ----

    /// Write the working copy back to the store and pick up the new version.
    pub fn save(&mut self, store: &mut dyn SchemaStore) -> Result<ReconcileSummary, StoreError> {
        let summary = store.save_diagram(
            &self.diagram.id,
            self.diagram.tables.clone(),
            self.diagram.relationships.clone(),
        )?;
        self.reload(store)?;
        Ok(summary)
    }

    /// Discard local changes and reload from the store.
    pub fn reload(&mut self, store: &dyn SchemaStore) -> Result<(), StoreError> {
        self.diagram = store.get_diagram(&self.diagram.id)?;
        self.diagram.normalize_column_order();
        self.dirty = false;
        let selected = std::mem::take(&mut self.selection.selected);
        self.select(selected);
        Ok(())
    }

    // ---- helpers ----

    fn table(&self, id: &str) -> Result<&Table, EditorError> {
        self.diagram
            .table(id)
            .ok_or_else(|| EditorError::TableNotFound { id: id.to_string() })
    }

    fn table_index(&self, id: &str) -> Result<usize, EditorError> {
        self.diagram
            .tables
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| EditorError::TableNotFound { id: id.to_string() })
    }

    fn table_mut(&mut self, id: &str) -> Result<&mut Table, EditorError> {
        self.diagram
            .tables
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| EditorError::TableNotFound { id: id.to_string() })
    }

    fn relationship_mut(&mut self, id: &str) -> Result<&mut Relationship, EditorError> {
        self.diagram
            .relationships
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| EditorError::RelationshipNotFound { id: id.to_string() })
    }

    fn check_endpoint(&self, endpoint: &Endpoint) -> Result<(), EditorError> {
        let table = self.table(&endpoint.table_id)?;
        if table.column(&endpoint.column_id).is_some() {
            return Ok(());
        }
        let exists_elsewhere = self
            .diagram
            .tables
            .iter()
            .any(|t| t.column(&endpoint.column_id).is_some());
        if exists_elsewhere {
            Err(EditorError::ColumnOutsideTable {
                table_id: endpoint.table_id.clone(),
                column_id: endpoint.column_id.clone(),
            })
        } else {
            Err(EditorError::ColumnNotFound {
                id: endpoint.column_id.clone(),
            })
        }
    }

    fn validate_table_name(&self, name: &str, own_id: Option<&str>) -> Result<String, EditorError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EditorError::EmptyName);
        }
        if self.name_taken(name, own_id) {
            return Err(EditorError::DuplicateTableName {
                name: name.to_string(),
            });
        }
        Ok(name.to_string())
    }

    fn name_taken(&self, name: &str, own_id: Option<&str>) -> bool {
        self.diagram
            .tables
            .iter()
            .any(|t| Some(t.id.as_str()) != own_id && t.name.eq_ignore_ascii_case(name))
    }

    /// `base`, or `base_1`, `base_2`, ... if taken
    fn unique_name(&self, base: &str, own_id: Option<&str>) -> String {
        let mut candidate = base.to_string();
        let mut counter = 1;
        while self.name_taken(&candidate, own_id) {
            candidate = format!("{base}_{counter}");
            counter += 1;
        }
        candidate
    }

    fn refresh_highlight(&mut self) {
        let selected = std::mem::take(&mut self.selection.selected);
        self.select(selected);
    }
}

fn renumber(columns: &mut [Column]) {
    for (i, column) in columns.iter_mut().enumerate() {
        column.order = i;
    }
}
