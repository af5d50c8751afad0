//! Diagram editor tests through the public API

use ddl_ingest::editor::{ColumnUpdate, DiagramEditor, Endpoint, TableUpdate};
use ddl_ingest::model::{IndexType, RelationshipType, SequentialIds};
use ddl_ingest::palette::SeededPalette;
use ddl_ingest::parser::{parse_sql, DataType};
use ddl_ingest::{ImportRequest, SchemaStore};

use crate::common::{deterministic_importer, detached_diagram, memory_store_with_diagram};

fn editor_for(diagram: ddl_ingest::model::Diagram) -> DiagramEditor {
    DiagramEditor::with_sources(
        diagram,
        Box::new(SequentialIds::new("ed")),
        Box::new(SeededPalette::new(5)),
    )
}

#[test]
fn test_build_schema_by_hand() {
    let mut ed = editor_for(detached_diagram("d"));
    let customers = ed.create_table(0.0, 0.0);
    ed.update_table(
        &customers,
        TableUpdate {
            name: Some("customers".into()),
            ..Default::default()
        },
    )
    .unwrap();
    let invoices = ed.create_table(400.0, 0.0);
    let customer_ref = ed.add_column(&invoices).unwrap();
    ed.update_column(
        &customer_ref,
        ColumnUpdate {
            name: Some("customer_id".into()),
            data_type: Some(DataType::Bigint),
            unsigned: Some(true),
            index_type: Some(IndexType::ForeignKey),
            ..Default::default()
        },
    )
    .unwrap();

    let customer_pk = ed.diagram().table(&customers).unwrap().columns[0].id.clone();
    ed.create_relationship(
        Endpoint::new(&customers, &customer_pk),
        Endpoint::new(&invoices, &customer_ref),
        RelationshipType::OneToMany,
    )
    .unwrap();

    ed.select(vec![customers.clone()]);
    assert!(ed.selection().highlighted.contains(&invoices));
    assert!(ed.diagram().check_invariants().is_ok());
}

#[test]
fn test_save_round_trip_through_store() {
    let (mut store, diagram) = memory_store_with_diagram("shop");
    let request = ImportRequest::from(parse_sql(
        "CREATE TABLE users (id INT PRIMARY KEY); CREATE TABLE posts (id INT, user_id INT);",
    ));
    deterministic_importer("i")
        .import(&mut store, &diagram.id, &request)
        .unwrap();

    let mut ed = DiagramEditor::open(&store, &diagram.id).unwrap();
    assert!(!ed.is_dirty());
    let users = ed.diagram().table_by_name("users").unwrap().id.clone();
    ed.delete_table(&users).unwrap();
    assert!(ed.relationships().is_empty());
    assert!(ed.is_dirty());

    let summary = ed.save(&mut store).unwrap();
    assert_eq!(summary.tables_deleted, 1);
    assert_eq!(summary.relationships_deleted, 1);
    assert!(!ed.is_dirty());

    let stored = store.get_diagram(&diagram.id).unwrap();
    assert_eq!(stored.tables.len(), 1);
    assert!(stored.relationships.is_empty());
    assert_eq!(stored.version, ed.diagram().version);
}

#[test]
fn test_reload_discards_changes() {
    let (mut store, diagram) = memory_store_with_diagram("scratch");
    let mut ed = DiagramEditor::open(&store, &diagram.id).unwrap();
    ed.create_table(0.0, 0.0);
    ed.reload(&store).unwrap();
    assert!(ed.tables().is_empty());
    assert!(!ed.is_dirty());

    // Nothing was written by the discarded edit
    assert!(store.get_diagram(&diagram.id).unwrap().tables.is_empty());
    store.delete_diagram(&diagram.id).unwrap();
    assert!(ed.reload(&store).is_err());
}
