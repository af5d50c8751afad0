//! Diagram-wide invariants and save reconciliation

use std::collections::{HashMap, HashSet};

use super::elements::{Diagram, Relationship, Table};
use crate::error::StoreError;

/// Counts from a save reconciliation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub tables_created: usize,
    pub tables_updated: usize,
    pub tables_deleted: usize,
    pub columns_deleted: usize,
    pub relationships_deleted: usize,
    /// Relationships dropped because an endpoint no longer exists
    pub relationships_pruned: usize,
}

impl Diagram {
    /// Check the structural invariants:
    /// - table names unique (case-insensitive)
    /// - ownership ids consistent
    /// - column order dense from 0
    /// - relationship endpoints exist and each column belongs to its table
    pub fn check_invariants(&self) -> Result<(), StoreError> {
        let mut names = HashSet::new();
        let mut column_owner: HashMap<&str, &str> = HashMap::new();

        for table in &self.tables {
            if !names.insert(table.name.to_lowercase()) {
                return Err(violation(format!("duplicate table name \"{}\"", table.name)));
            }
            if table.diagram_id != self.id {
                return Err(violation(format!(
                    "table \"{}\" belongs to diagram {}",
                    table.name, table.diagram_id
                )));
            }

            let mut orders: Vec<usize> = table.columns.iter().map(|c| c.order).collect();
            orders.sort_unstable();
            if orders.iter().enumerate().any(|(i, &order)| i != order) {
                return Err(violation(format!(
                    "column order of table \"{}\" is not dense",
                    table.name
                )));
            }

            for column in &table.columns {
                if column.table_id != table.id {
                    return Err(violation(format!(
                        "column \"{}\" is listed under table \"{}\" but owned by {}",
                        column.name, table.name, column.table_id
                    )));
                }
                column_owner.insert(column.id.as_str(), table.id.as_str());
            }
        }

        for rel in &self.relationships {
            let endpoints = [
                (&rel.source_table_id, &rel.source_column_id),
                (&rel.target_table_id, &rel.target_column_id),
            ];
            for (table_id, column_id) in endpoints {
                if column_owner.get(column_id.as_str()) != Some(&table_id.as_str()) {
                    return Err(violation(format!(
                        "relationship {} references missing column {}.{}",
                        rel.id, table_id, column_id
                    )));
                }
            }
        }

        Ok(())
    }

    /// Remove relationships whose endpoint table or column is gone.
    /// Returns how many were removed.
    pub fn prune_dangling_relationships(&mut self) -> usize {
        let live: HashSet<(&str, &str)> = self
            .tables
            .iter()
            .flat_map(|t| t.columns.iter().map(move |c| (t.id.as_str(), c.id.as_str())))
            .collect();

        let before = self.relationships.len();
        self.relationships.retain(|rel| {
            live.contains(&(rel.source_table_id.as_str(), rel.source_column_id.as_str()))
                && live.contains(&(rel.target_table_id.as_str(), rel.target_column_id.as_str()))
        });
        before - self.relationships.len()
    }

    /// Renumber every table's columns densely, keeping relative order.
    pub fn normalize_column_order(&mut self) {
        for table in &mut self.tables {
            table.normalize_column_order();
        }
    }

    /// Replace the diagram content with a saved editor state.
    ///
    /// Entities missing from the payload are deleted, the rest are created or
    /// updated by id. Ownership ids are rewritten to this diagram, dangling
    /// relationships are dropped and column order is made dense. The result
    /// must satisfy [`Diagram::check_invariants`]; on error `self` is left
    /// unchanged.
    pub fn reconcile(
        &mut self,
        tables: Vec<Table>,
        relationships: Vec<Relationship>,
    ) -> Result<ReconcileSummary, StoreError> {
        let old_tables: HashSet<&str> = self.tables.iter().map(|t| t.id.as_str()).collect();
        let old_columns: HashSet<&str> = self
            .tables
            .iter()
            .flat_map(|t| t.columns.iter().map(|c| c.id.as_str()))
            .collect();
        let new_tables: HashSet<&str> = tables.iter().map(|t| t.id.as_str()).collect();
        let new_columns: HashSet<&str> = tables
            .iter()
            .flat_map(|t| t.columns.iter().map(|c| c.id.as_str()))
            .collect();
        let new_relationships: HashSet<&str> =
            relationships.iter().map(|r| r.id.as_str()).collect();

        let mut summary = ReconcileSummary {
            tables_created: new_tables.difference(&old_tables).count(),
            tables_updated: new_tables.intersection(&old_tables).count(),
            tables_deleted: old_tables.difference(&new_tables).count(),
            columns_deleted: old_columns.difference(&new_columns).count(),
            relationships_deleted: self
                .relationships
                .iter()
                .filter(|r| !new_relationships.contains(r.id.as_str()))
                .count(),
            relationships_pruned: 0,
        };

        let mut next = self.clone();
        next.tables = tables;
        next.relationships = relationships;
        for table in &mut next.tables {
            table.diagram_id = next.id.clone();
            for column in &mut table.columns {
                column.table_id = table.id.clone();
            }
        }
        for rel in &mut next.relationships {
            rel.diagram_id = next.id.clone();
        }
        next.normalize_column_order();
        summary.relationships_pruned = next.prune_dangling_relationships();
        next.check_invariants()?;

        *self = next;
        Ok(summary)
    }
}

fn violation(message: String) -> StoreError {
    StoreError::InvariantViolation { message }
}
