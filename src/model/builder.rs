//! Import planning: parsed schema → persistable entities.
//!
//! The planner reads a snapshot of the target diagram and produces every
//! table, column and relationship an import would write. It writes nothing
//! itself; committing the plan is the store's job.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::elements::{Column, IndexType, Relationship, Table, TableSummary};
use super::ids::IdSource;
use crate::layout::{calculate_auto_layout, LayoutConfig, LayoutTable};
use crate::palette::ColorSource;
use crate::parser::{ParsedRelationship, ParsedTable, RelationshipOrigin};
use crate::relationship::classify_cardinality;

/// A table that had to be renamed to avoid a collision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRename {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    TableNotFound,
    ColumnNotFound,
}

/// A parsed relationship that could not be resolved to new entities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRelationship {
    pub relationship: ParsedRelationship,
    pub reason: SkipReason,
}

/// Everything one import will persist
#[derive(Debug, Clone, PartialEq)]
pub struct ImportPlan {
    pub tables: Vec<Table>,
    pub relationships: Vec<Relationship>,
    pub renamed: Vec<TableRename>,
    pub skipped: Vec<SkippedRelationship>,
}

/// Pick a final name for each incoming table.
///
/// A name colliding (case-insensitively) with an existing name, or with one
/// chosen earlier in the same batch, gets `_1`, `_2`, ... appended.
pub fn resolve_unique_names<'a>(
    existing: impl IntoIterator<Item = &'a str>,
    incoming: &[ParsedTable],
) -> Vec<String> {
    let mut taken: HashSet<String> = existing.into_iter().map(str::to_lowercase).collect();

    incoming
        .iter()
        .map(|table| {
            let mut candidate = table.name.clone();
            let mut counter = 1;
            while taken.contains(&candidate.to_lowercase()) {
                candidate = format!("{}_{}", table.name, counter);
                counter += 1;
            }
            taken.insert(candidate.to_lowercase());
            candidate
        })
        .collect()
}

/// Index tag for a parsed column. PK beats UK beats Index.
pub fn derive_index_type(table: &ParsedTable, column: &str) -> IndexType {
    if table.is_primary_key(column) {
        IndexType::PrimaryKey
    } else if table.in_unique_key(column) {
        IndexType::Unique
    } else if table.in_index(column) {
        IndexType::Index
    } else {
        IndexType::None
    }
}

fn column_key(table: &str, column: &str) -> String {
    format!("{}.{}", table, column).to_lowercase()
}

/// Builds [`ImportPlan`]s with injected id and colour sources.
pub struct ImportPlanner<'a> {
    layout: &'a LayoutConfig,
    ids: &'a mut dyn IdSource,
    colors: &'a mut dyn ColorSource,
}

impl<'a> ImportPlanner<'a> {
    pub fn new(
        layout: &'a LayoutConfig,
        ids: &'a mut dyn IdSource,
        colors: &'a mut dyn ColorSource,
    ) -> Self {
        Self {
            layout,
            ids,
            colors,
        }
    }

    /// Plan the import of `tables` and `relationships` into a diagram whose
    /// current tables are `existing`.
    ///
    /// Relationships name tables as they were parsed, so they follow a table
    /// through a rename. Unresolvable relationships are skipped, never fatal.
    pub fn plan(
        &mut self,
        diagram_id: &str,
        existing: &[TableSummary],
        tables: &[ParsedTable],
        relationships: &[ParsedRelationship],
    ) -> ImportPlan {
        let final_names = resolve_unique_names(existing.iter().map(|t| t.name.as_str()), tables);

        let layout_tables: Vec<LayoutTable> = tables
            .iter()
            .zip(&final_names)
            .map(|(parsed, name)| {
                LayoutTable::sized(self.ids.next_id(), name, parsed.columns.len(), self.layout)
            })
            .collect();
        let positions = calculate_auto_layout(existing, &layout_tables, self.layout);

        let mut renamed = Vec::new();
        let mut new_tables = Vec::with_capacity(tables.len());
        // lower-case parsed name → table index, first occurrence wins
        let mut table_index: HashMap<String, usize> = HashMap::new();
        // "table.column" → (table index, column index)
        let mut column_slots: HashMap<String, (usize, usize)> = HashMap::new();

        for (index, ((parsed, layout_table), position)) in
            tables.iter().zip(layout_tables).zip(positions).enumerate()
        {
            if layout_table.name != parsed.name {
                renamed.push(TableRename {
                    from: parsed.name.clone(),
                    to: layout_table.name.clone(),
                });
            }

            table_index
                .entry(parsed.name.to_lowercase())
                .or_insert(index);

            let columns: Vec<Column> = parsed
                .columns
                .iter()
                .enumerate()
                .map(|(order, col)| {
                    column_slots
                        .entry(column_key(&parsed.name, &col.name))
                        .or_insert((index, order));
                    Column {
                        id: self.ids.next_id(),
                        table_id: layout_table.id.clone(),
                        name: col.name.clone(),
                        data_type: col.data_type,
                        nullable: col.nullable,
                        index_type: derive_index_type(parsed, &col.name),
                        auto_increment: col.auto_increment,
                        unsigned: col.unsigned,
                        default_value: col.default_value.clone(),
                        comment: col.comment.clone(),
                        order,
                    }
                })
                .collect();

            new_tables.push(Table {
                id: layout_table.id,
                diagram_id: diagram_id.to_string(),
                name: layout_table.name,
                position_x: position.x,
                position_y: position.y,
                color: self.colors.next_color().to_string(),
                columns,
            });
        }

        let mut new_relationships = Vec::new();
        let mut skipped = Vec::new();

        for rel in relationships {
            let (Some(&source_index), Some(&target_index)) = (
                table_index.get(&rel.source_table.to_lowercase()),
                table_index.get(&rel.target_table.to_lowercase()),
            ) else {
                warn!(
                    source = %rel.source_table,
                    target = %rel.target_table,
                    "Skipping relationship: table not found"
                );
                skipped.push(SkippedRelationship {
                    relationship: rel.clone(),
                    reason: SkipReason::TableNotFound,
                });
                continue;
            };

            let source_key = column_key(&rel.source_table, &rel.source_column);
            let target_key = column_key(&rel.target_table, &rel.target_column);
            let (Some(&(st, sc)), Some(&(tt, tc))) =
                (column_slots.get(&source_key), column_slots.get(&target_key))
            else {
                warn!(
                    source = %source_key,
                    target = %target_key,
                    "Skipping relationship: column not found"
                );
                skipped.push(SkippedRelationship {
                    relationship: rel.clone(),
                    reason: SkipReason::ColumnNotFound,
                });
                continue;
            };

            let relationship_type = classify_cardinality(
                &tables[source_index],
                &rel.source_column,
                &tables[target_index],
                &rel.target_column,
            );

            if rel.origin == RelationshipOrigin::Explicit {
                let column = &mut new_tables[st].columns[sc];
                if column.index_type == IndexType::None {
                    column.index_type = IndexType::ForeignKey;
                }
            }

            new_relationships.push(Relationship {
                id: self.ids.next_id(),
                diagram_id: diagram_id.to_string(),
                source_table_id: new_tables[st].id.clone(),
                source_column_id: new_tables[st].columns[sc].id.clone(),
                target_table_id: new_tables[tt].id.clone(),
                target_column_id: new_tables[tt].columns[tc].id.clone(),
                relationship_type,
                offset_x: None,
                offset_y: None,
            });
        }

        debug!(
            tables = new_tables.len(),
            relationships = new_relationships.len(),
            skipped = skipped.len(),
            renamed = renamed.len(),
            "Planned import"
        );

        ImportPlan {
            tables: new_tables,
            relationships: new_relationships,
            renamed,
            skipped,
        }
    }
}
