//! Relationship cardinality from endpoint key attributes.

use crate::model::RelationshipType;
use crate::parser::ParsedTable;

/// True if `column` is in the primary key or is the sole member of a
/// unique key.
pub fn is_unique_or_primary(table: &ParsedTable, column: &str) -> bool {
    table.is_unique_or_primary(column)
}

/// Classify a relationship from `source.source_column` to
/// `target.target_column`.
///
/// | source unique | target unique | result |
/// |---------------|---------------|--------|
/// | yes           | yes           | 1:1    |
/// | yes           | no            | N:1    |
/// | no            | yes           | 1:N    |
/// | no            | no            | 1:N    |
pub fn classify_cardinality(
    source: &ParsedTable,
    source_column: &str,
    target: &ParsedTable,
    target_column: &str,
) -> RelationshipType {
    let source_unique = is_unique_or_primary(source, source_column);
    let target_unique = is_unique_or_primary(target, target_column);

    match (source_unique, target_unique) {
        (true, true) => RelationshipType::OneToOne,
        (true, false) => RelationshipType::ManyToOne,
        // A plain FK column pointing at a key, or neither side keyed
        (false, _) => RelationshipType::OneToMany,
    }
}
