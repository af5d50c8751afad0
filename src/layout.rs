//! Grid auto-layout for imported tables.
//!
//! New tables go in a roughly square grid placed entirely to the right of the
//! rightmost existing table. Overlap with existing tables is avoided only by
//! that offset; nothing else is checked.

use serde::{Deserialize, Serialize};

use crate::model::TableSummary;

/// Grid geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    pub table_width: f64,
    /// Nominal cell height; rows are spaced by this, not by real heights
    pub table_height: f64,
    pub margin_x: f64,
    pub margin_y: f64,
    pub origin_x: f64,
    pub origin_y: f64,
    /// Reported height of a table with no columns
    pub header_height: f64,
    /// Reported height added per column
    pub row_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            table_width: 300.0,
            table_height: 200.0,
            margin_x: 100.0,
            margin_y: 100.0,
            origin_x: 100.0,
            origin_y: 100.0,
            header_height: 100.0,
            row_height: 40.0,
        }
    }
}

/// A table about to be placed
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutTable {
    pub id: String,
    pub name: String,
    pub width: f64,
    pub height: f64,
}

impl LayoutTable {
    /// Size a table from its column count.
    pub fn sized(
        id: impl Into<String>,
        name: impl Into<String>,
        column_count: usize,
        config: &LayoutConfig,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            width: config.table_width,
            height: config.header_height + config.row_height * column_count as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPosition {
    pub table_id: String,
    pub x: f64,
    pub y: f64,
}

/// Compute positions for `new_tables`, one per table, in input order.
pub fn calculate_auto_layout(
    existing: &[TableSummary],
    new_tables: &[LayoutTable],
    config: &LayoutConfig,
) -> Vec<LayoutPosition> {
    if new_tables.is_empty() {
        return Vec::new();
    }

    let start_x = existing
        .iter()
        .map(|t| t.position_x)
        .reduce(f64::max)
        .map_or(config.origin_x, |max_x| {
            max_x + config.table_width + config.margin_x
        });
    let start_y = config.origin_y;

    let columns = (new_tables.len() as f64).sqrt().ceil() as usize;
    let step_x = config.table_width + config.margin_x;
    let step_y = config.table_height + config.margin_y;

    new_tables
        .iter()
        .enumerate()
        .map(|(index, table)| {
            let col = index % columns;
            let row = index / columns;
            LayoutPosition {
                table_id: table.id.clone(),
                x: start_x + col as f64 * step_x,
                y: start_y + row as f64 * step_y,
            }
        })
        .collect()
}
