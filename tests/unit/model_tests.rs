//! Import planning, layout and diagram model tests

use pretty_assertions::assert_eq;

use ddl_ingest::layout::{calculate_auto_layout, LayoutConfig, LayoutTable};
use ddl_ingest::model::{
    resolve_unique_names, ImportPlanner, IndexType, RelationshipType, SequentialIds,
    TableSummary, ID_LEN,
};
use ddl_ingest::model::{IdSource, UuidIds};
use ddl_ingest::palette::{ColorSource, SeededPalette, MUTED_PALETTE};
use ddl_ingest::parser::{parse_sql, ParsedTable};

fn summary(name: &str, x: f64) -> TableSummary {
    TableSummary {
        id: format!("existing-{name}"),
        name: name.to_string(),
        position_x: x,
        position_y: 100.0,
    }
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn test_layout_nine_tables_three_columns() {
    let config = LayoutConfig::default();
    let tables: Vec<LayoutTable> = (0..9)
        .map(|i| LayoutTable::sized(format!("t{i}"), format!("t{i}"), 2, &config))
        .collect();
    let positions = calculate_auto_layout(&[], &tables, &config);

    assert_eq!((positions[2].x, positions[2].y), (900.0, 100.0));
    assert_eq!((positions[3].x, positions[3].y), (100.0, 400.0));
    assert_eq!((positions[8].x, positions[8].y), (900.0, 700.0));
}

#[test]
fn test_layout_custom_geometry() {
    let config = LayoutConfig {
        table_width: 200.0,
        margin_x: 20.0,
        ..LayoutConfig::default()
    };
    let tables = vec![
        LayoutTable::sized("a", "a", 0, &config),
        LayoutTable::sized("b", "b", 0, &config),
    ];
    let positions = calculate_auto_layout(&[summary("x", 1000.0)], &tables, &config);
    assert_eq!(positions[0].x, 1220.0);
    assert_eq!(positions[1].x, 1440.0);
    assert_eq!(tables[0].height, 100.0);
}

// ============================================================================
// Naming, ids, colours
// ============================================================================

#[test]
fn test_collision_rename_is_case_insensitive() {
    let incoming = vec![ParsedTable::new("users")];
    assert_eq!(resolve_unique_names(["Users"], &incoming), vec!["users_1"]);
}

#[test]
fn test_uuid_ids_are_short_and_unique() {
    let mut ids = UuidIds;
    let generated: Vec<String> = (0..100).map(|_| ids.next_id()).collect();
    assert!(generated.iter().all(|id| id.len() == ID_LEN));
    let mut deduped = generated.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), generated.len());
}

#[test]
fn test_seeded_palette_is_reproducible() {
    let mut a = SeededPalette::new(9);
    let mut b = SeededPalette::new(9);
    let from_a: Vec<&str> = (0..10).map(|_| a.next_color()).collect();
    let from_b: Vec<&str> = (0..10).map(|_| b.next_color()).collect();
    assert_eq!(from_a, from_b);
    assert!(from_a.iter().all(|c| MUTED_PALETTE.contains(c)));
}

// ============================================================================
// Planner
// ============================================================================

#[test]
fn test_plan_shop_schema() {
    let parsed = parse_sql(
        "CREATE TABLE users (id INT NOT NULL, email VARCHAR(255), PRIMARY KEY (id), UNIQUE (email));
         CREATE TABLE orders (id INT PRIMARY KEY, user_id INT, note TEXT, KEY (note),
           FOREIGN KEY (user_id) REFERENCES users (id));",
    );
    let layout = LayoutConfig::default();
    let mut ids = SequentialIds::new("n");
    let mut colors = SeededPalette::new(1);
    let plan = ImportPlanner::new(&layout, &mut ids, &mut colors).plan(
        "diagram",
        &[summary("legacy", 0.0)],
        &parsed.tables,
        &parsed.relationships,
    );

    assert_eq!(plan.tables.len(), 2);
    assert!(plan.renamed.is_empty());
    assert!(plan.skipped.is_empty());

    // Placed right of the existing table at x=0
    assert_eq!(plan.tables[0].position_x, 400.0);

    let users = &plan.tables[0];
    let types: Vec<IndexType> = users.columns.iter().map(|c| c.index_type).collect();
    assert_eq!(types, vec![IndexType::PrimaryKey, IndexType::Unique]);
    assert!(!users.columns[0].nullable);

    let orders = &plan.tables[1];
    let types: Vec<IndexType> = orders.columns.iter().map(|c| c.index_type).collect();
    assert_eq!(
        types,
        vec![IndexType::PrimaryKey, IndexType::ForeignKey, IndexType::Index]
    );

    assert_eq!(plan.relationships.len(), 1);
    let rel = &plan.relationships[0];
    assert_eq!(rel.source_column_id, orders.columns[1].id);
    assert_eq!(rel.target_column_id, users.columns[0].id);
    assert_eq!(rel.relationship_type, RelationshipType::OneToMany);
    assert_eq!(rel.diagram_id, "diagram");
}

#[test]
fn test_plan_duplicate_names_in_one_batch() {
    let parsed = parse_sql(
        "CREATE TABLE logs (id INT); CREATE TABLE logs (id INT, extra INT); CREATE TABLE LOGS (id INT);",
    );
    let layout = LayoutConfig::default();
    let mut ids = SequentialIds::new("n");
    let mut colors = SeededPalette::new(1);
    let plan = ImportPlanner::new(&layout, &mut ids, &mut colors).plan(
        "d",
        &[],
        &parsed.tables,
        &parsed.relationships,
    );
    let names: Vec<&str> = plan.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["logs", "logs_1", "LOGS_2"]);
    assert_eq!(plan.renamed.len(), 2);
}
