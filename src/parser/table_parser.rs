//! CREATE TABLE assembly and ALTER TABLE key/constraint application.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::column_parser::{parse_column_definition_tokens, TokenParsedColumn};
use super::constraint_parser::{
    is_constraint_definition, parse_alter_table_tokens, parse_table_constraint_tokens,
    TokenParsedConstraint,
};
use super::data_types::{map_data_type, FALLBACK_TYPE};
use super::identifier_utils::normalize_identifier;
use super::parsed::{
    ParseError, ParseResult, ParsedColumn, ParsedRelationship, ParsedTable, RelationshipOrigin,
};
use super::statement_parser::{balanced_group, split_definitions};

/// Table name up to and including the body's opening paren. An optional
/// schema qualifier is matched and dropped.
static CREATE_TABLE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)^CREATE\s+(?:TEMPORARY\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?(?:(?:`[^`]+`|"[^"]+"|\w+)\s*\.\s*)?(`[^`]+`|"[^"]+"|\w+)\s*\("#,
    )
    .expect("Invalid create table name regex")
});

/// Parse one CREATE TABLE statement into `result`.
///
/// Structural failures (no name, no balanced body) add an error and no
/// table. Per-column failures add an error and drop only that column.
pub(crate) fn parse_create_table(stmt: &str, line: usize, result: &mut ParseResult) {
    let Some(caps) = CREATE_TABLE_NAME_RE.captures(stmt) else {
        result.errors.push(ParseError::error(
            line,
            "Could not extract table name from CREATE TABLE statement",
        ));
        return;
    };
    let (Some(whole), Some(raw_name)) = (caps.get(0), caps.get(1)) else {
        return;
    };
    let table_name = normalize_identifier(raw_name.as_str());

    // The regex match ends on the body's opening paren
    let body = balanced_group(stmt, whole.end() - 1).filter(|b| !b.trim().is_empty());
    let Some(body) = body else {
        result.errors.push(ParseError::error(
            line,
            format!("Could not extract table body for table \"{}\"", table_name),
        ));
        return;
    };

    let mut table = ParsedTable::new(table_name);

    for def in split_definitions(body) {
        if is_constraint_definition(&def) {
            match parse_table_constraint_tokens(&def) {
                Some(constraint) => {
                    let relationships = apply_constraint(&mut table, constraint);
                    result.relationships.extend(relationships);
                }
                None => debug!(
                    table = %table.name,
                    definition = %def,
                    "Skipping malformed key definition"
                ),
            }
            continue;
        }

        match parse_column_definition_tokens(&def) {
            Ok(column) => add_column(&mut table, column, line, &mut result.errors),
            Err(e) => result.errors.push(ParseError::error(line, e.to_string())),
        }
    }

    for missing in table.dangling_key_columns() {
        result.errors.push(ParseError::warning(
            line,
            format!(
                "Key column \"{}\" is not a column of table \"{}\"",
                missing, table.name
            ),
        ));
    }

    debug!(
        table = %table.name,
        columns = table.columns.len(),
        line,
        "Parsed CREATE TABLE"
    );
    result.tables.push(table);
}

fn add_column(
    table: &mut ParsedTable,
    column: TokenParsedColumn,
    line: usize,
    errors: &mut Vec<ParseError>,
) {
    let mapping = map_data_type(&column.raw_type);
    if !mapping.is_known() {
        errors.push(ParseError::warning(
            line,
            format!(
                "Unknown data type \"{}\", defaulting to {}",
                column.raw_type, FALLBACK_TYPE
            ),
        ));
    }

    if column.is_primary_key {
        push_unique_name(&mut table.primary_keys, &column.name);
    }
    if column.is_unique {
        table.unique_keys.push(vec![column.name.clone()]);
    }

    table.columns.push(ParsedColumn {
        name: column.name,
        data_type: mapping.data_type(),
        nullable: !column.not_null,
        auto_increment: column.auto_increment,
        unsigned: column.unsigned,
        default_value: column.default_value,
        comment: column.comment,
    });
}

/// Record a key on `table`; a foreign key instead returns its relationships.
fn apply_constraint(
    table: &mut ParsedTable,
    constraint: TokenParsedConstraint,
) -> Vec<ParsedRelationship> {
    match constraint {
        TokenParsedConstraint::PrimaryKey { columns } => {
            for column in &columns {
                push_unique_name(&mut table.primary_keys, column);
            }
        }
        TokenParsedConstraint::Unique { columns } => {
            if !columns.is_empty() {
                table.unique_keys.push(columns);
            }
        }
        TokenParsedConstraint::Index { columns } => {
            if !columns.is_empty() {
                table.indexes.push(columns);
            }
        }
        TokenParsedConstraint::ForeignKey {
            columns,
            referenced_table,
            referenced_columns,
        } => {
            return foreign_key_relationships(
                &table.name,
                &columns,
                &referenced_table,
                &referenced_columns,
            )
        }
        TokenParsedConstraint::Check => {}
    }
    Vec::new()
}

/// One explicit relationship per positional column pair. Lists of unequal
/// length yield nothing.
fn foreign_key_relationships(
    source_table: &str,
    columns: &[String],
    target_table: &str,
    target_columns: &[String],
) -> Vec<ParsedRelationship> {
    if columns.is_empty() || columns.len() != target_columns.len() {
        debug!(
            source_table,
            target_table, "Skipping foreign key with mismatched column lists"
        );
        return Vec::new();
    }

    columns
        .iter()
        .zip(target_columns)
        .map(|(source, target)| ParsedRelationship {
            source_table: source_table.to_string(),
            source_column: source.clone(),
            target_table: target_table.to_string(),
            target_column: target.clone(),
            origin: RelationshipOrigin::Explicit,
        })
        .collect()
}

fn push_unique_name(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
        names.push(name.to_string());
    }
}

/// Apply one ALTER TABLE statement.
///
/// Foreign keys become relationships whether or not the table was seen;
/// key clauses update a table parsed earlier in the same input.
pub(crate) fn apply_alter_table(stmt: &str, line: usize, result: &mut ParseResult) {
    let Some(alter) = parse_alter_table_tokens(stmt) else {
        debug!(line, "Skipping ALTER TABLE without a readable table name");
        return;
    };

    for constraint in alter.constraints {
        if let TokenParsedConstraint::ForeignKey {
            columns,
            referenced_table,
            referenced_columns,
        } = &constraint
        {
            result.relationships.extend(foreign_key_relationships(
                &alter.table_name,
                columns,
                referenced_table,
                referenced_columns,
            ));
            continue;
        }

        match result.table_mut(&alter.table_name) {
            Some(table) => {
                apply_constraint(table, constraint);
            }
            None => debug!(
                table = %alter.table_name,
                line,
                "ALTER TABLE targets a table not defined earlier"
            ),
        }
    }
}
