//! Diagram model and import planning

mod builder;
mod database_model;
mod elements;
mod ids;

pub use builder::{
    derive_index_type, resolve_unique_names, ImportPlan, ImportPlanner, SkipReason,
    SkippedRelationship, TableRename,
};
pub use database_model::ReconcileSummary;
pub use elements::*;
pub use ids::{IdSource, SequentialIds, UuidIds, ID_LEN};
