//! Import endpoint: parsed schema into an existing diagram.
//!
//! An import takes a snapshot of the diagram, plans every entity against it
//! and commits the plan in one store call. If the diagram changed in between,
//! the commit fails and nothing is written.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ImportError;
use crate::layout::LayoutConfig;
use crate::model::{IdSource, ImportPlan, ImportPlanner, TableRename, UuidIds};
use crate::palette::{ColorSource, RandomPalette};
use crate::parser::{ParseResult, ParsedRelationship, ParsedTable};
use crate::store::SchemaStore;

/// Import configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOptions {
    #[serde(default)]
    pub layout: LayoutConfig,
}

/// Request body of an import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    #[serde(default)]
    pub tables: Vec<ParsedTable>,
    #[serde(default)]
    pub relationships: Vec<ParsedRelationship>,
}

impl From<ParseResult> for ImportRequest {
    fn from(result: ParseResult) -> Self {
        Self {
            tables: result.tables,
            relationships: result.relationships,
        }
    }
}

/// Response body of a successful import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub tables_created: usize,
    pub relationships_created: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub renamed: Vec<TableRename>,
    #[serde(default)]
    pub relationships_skipped: usize,
}

impl ImportResponse {
    fn from_plan(plan: &ImportPlan) -> Self {
        Self {
            tables_created: plan.tables.len(),
            relationships_created: plan.relationships.len(),
            renamed: plan.renamed.clone(),
            relationships_skipped: plan.skipped.len(),
        }
    }
}

/// Runs imports with injected id and colour sources.
pub struct Importer {
    options: ImportOptions,
    ids: Box<dyn IdSource>,
    colors: Box<dyn ColorSource>,
}

impl Importer {
    /// Random ids and colours.
    pub fn new(options: ImportOptions) -> Self {
        Self::with_sources(options, Box::new(UuidIds), Box::new(RandomPalette))
    }

    pub fn with_sources(
        options: ImportOptions,
        ids: Box<dyn IdSource>,
        colors: Box<dyn ColorSource>,
    ) -> Self {
        Self {
            options,
            ids,
            colors,
        }
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Merge `request` into diagram `diagram_id`.
    pub fn import(
        &mut self,
        store: &mut dyn SchemaStore,
        diagram_id: &str,
        request: &ImportRequest,
    ) -> Result<ImportResponse, ImportError> {
        if request.tables.is_empty() {
            return Err(ImportError::NoTables);
        }

        let snapshot = store.snapshot(diagram_id)?;
        let plan = ImportPlanner::new(
            &self.options.layout,
            self.ids.as_mut(),
            self.colors.as_mut(),
        )
        .plan(
            &snapshot.diagram_id,
            &snapshot.tables,
            &request.tables,
            &request.relationships,
        );

        let version = store.commit_import(diagram_id, snapshot.version, &plan)?;
        let response = ImportResponse::from_plan(&plan);
        info!(
            diagram = diagram_id,
            version,
            tables = response.tables_created,
            relationships = response.relationships_created,
            skipped = response.relationships_skipped,
            "Imported schema"
        );
        Ok(response)
    }
}
