//! Implicit relationship detection from column naming.
//!
//! A column such as `user_id` is taken to reference `users.id` when no
//! FOREIGN KEY says so. Candidate table names come from a [`ReferenceNaming`]
//! strategy; the first candidate naming an existing table that has the target
//! column wins.

use std::collections::HashMap;

use tracing::debug;

use crate::parser::{ParsedRelationship, ParsedTable, RelationshipOrigin};

/// Naming convention used to guess what a column refers to.
pub trait ReferenceNaming: Send + Sync {
    /// Lower-case candidate table names for `column`, in priority order.
    /// Empty if the column does not look like a reference.
    fn candidate_tables(&self, column: &str) -> Vec<String>;

    /// Column the reference points at in the matched table.
    fn target_column(&self) -> &str {
        "id"
    }
}

/// The `<name>_id` → `<name>` / `<name>s` convention.
///
/// Candidates for base `b` are `b`, `b + "s"`, then `b` with a trailing `s`
/// toggled. Pluralisation goes no further than that.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdSuffixNaming;

impl ReferenceNaming for IdSuffixNaming {
    fn candidate_tables(&self, column: &str) -> Vec<String> {
        let lower = column.to_lowercase();
        let Some(base) = lower.strip_suffix("_id") else {
            return Vec::new();
        };

        let toggled = match base.strip_suffix('s') {
            Some(singular) => singular.to_string(),
            None => format!("{}s", base),
        };
        vec![base.to_string(), format!("{}s", base), toggled]
    }
}

/// Infer relationships for every referencing column that has no explicit one.
///
/// Runs over the whole table set at once. Duplicate table names resolve to
/// their first occurrence.
pub fn detect_implicit_relationships(
    tables: &[ParsedTable],
    explicit: &[ParsedRelationship],
    naming: &dyn ReferenceNaming,
) -> Vec<ParsedRelationship> {
    let mut by_name: HashMap<String, &ParsedTable> = HashMap::with_capacity(tables.len());
    for table in tables {
        by_name.entry(table.name.to_lowercase()).or_insert(table);
    }

    let target_column = naming.target_column();
    let mut relationships = Vec::new();

    for table in tables {
        for column in &table.columns {
            let declared = explicit.iter().any(|rel| {
                rel.source_table.eq_ignore_ascii_case(&table.name)
                    && rel.source_column.eq_ignore_ascii_case(&column.name)
            });
            if declared {
                continue;
            }

            let found = naming
                .candidate_tables(&column.name)
                .iter()
                .filter_map(|candidate| by_name.get(candidate.as_str()))
                .find_map(|target| target.column(target_column).map(|c| (*target, c)));

            if let Some((target, target_col)) = found {
                debug!(
                    source = %format!("{}.{}", table.name, column.name),
                    target = %target.name,
                    "Inferred implicit relationship"
                );
                relationships.push(ParsedRelationship {
                    source_table: table.name.clone(),
                    source_column: column.name.clone(),
                    target_table: target.name.clone(),
                    target_column: target_col.name.clone(),
                    origin: RelationshipOrigin::Implicit,
                });
            }
        }
    }

    relationships
}
