//! Persisted diagram entities

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::parser::DataType;

/// Which declared key a column participates in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexType {
    #[serde(rename = "PK")]
    PrimaryKey,
    #[serde(rename = "UK")]
    Unique,
    #[serde(rename = "FK")]
    ForeignKey,
    Index,
    #[default]
    None,
}

impl IndexType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexType::PrimaryKey => "PK",
            IndexType::Unique => "UK",
            IndexType::ForeignKey => "FK",
            IndexType::Index => "Index",
            IndexType::None => "None",
        }
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship cardinality, read from source to target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipType {
    #[serde(rename = "1:1")]
    OneToOne,
    #[serde(rename = "1:N")]
    OneToMany,
    #[serde(rename = "N:1")]
    ManyToOne,
}

impl RelationshipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::OneToOne => "1:1",
            RelationshipType::OneToMany => "1:N",
            RelationshipType::ManyToOne => "N:1",
        }
    }

    /// Cardinality seen from the other end.
    pub fn swapped(self) -> Self {
        match self {
            RelationshipType::OneToOne => RelationshipType::OneToOne,
            RelationshipType::OneToMany => RelationshipType::ManyToOne,
            RelationshipType::ManyToOne => RelationshipType::OneToMany,
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: String,
    pub table_id: String,
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    pub index_type: IndexType,
    pub auto_increment: bool,
    pub unsigned: bool,
    pub default_value: Option<String>,
    pub comment: Option<String>,
    /// Dense 0-based position within the table
    pub order: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: String,
    pub diagram_id: String,
    pub name: String,
    pub position_x: f64,
    pub position_y: f64,
    pub color: String,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Table {
    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// Sort columns by `order` and renumber them 0..n.
    pub fn normalize_column_order(&mut self) {
        self.columns.sort_by_key(|c| c.order);
        for (i, column) in self.columns.iter_mut().enumerate() {
            column.order = i;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: String,
    pub diagram_id: String,
    pub source_table_id: String,
    pub source_column_id: String,
    pub target_table_id: String,
    pub target_column_id: String,
    #[serde(rename = "type")]
    pub relationship_type: RelationshipType,
    /// Rendering hint only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_y: Option<f64>,
}

impl Relationship {
    /// True if either endpoint is the given table.
    pub fn touches_table(&self, table_id: &str) -> bool {
        self.source_table_id == table_id || self.target_table_id == table_id
    }

    /// True if either endpoint is the given column.
    pub fn touches_column(&self, column_id: &str) -> bool {
        self.source_column_id == column_id || self.target_column_id == column_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped on every committed write
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl Diagram {
    pub fn table(&self, id: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == id)
    }

    pub fn table_by_name(&self, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Position-only view of the tables, as used by auto-layout.
    pub fn table_summaries(&self) -> Vec<TableSummary> {
        self.tables
            .iter()
            .map(|t| TableSummary {
                id: t.id.clone(),
                name: t.name.clone(),
                position_x: t.position_x,
                position_y: t.position_y,
            })
            .collect()
    }

    pub fn listing(&self) -> DiagramListing {
        DiagramListing {
            id: self.id.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            table_count: self.tables.len(),
            relationship_count: self.relationships.len(),
        }
    }
}

/// Existing table as seen by the import planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSummary {
    pub id: String,
    pub name: String,
    pub position_x: f64,
    pub position_y: f64,
}

/// Read-only view of a diagram taken before an import.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramSnapshot {
    pub diagram_id: String,
    pub version: u64,
    pub tables: Vec<TableSummary>,
}

/// One row of the diagram list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramListing {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub table_count: usize,
    pub relationship_count: usize,
}
