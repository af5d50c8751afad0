//! File store tests across process-like handles

use std::fs;

use pretty_assertions::assert_eq;

use ddl_ingest::model::{IndexType, SequentialIds};
use ddl_ingest::{
    DiagramEditor, FileStore, ImportError, ImportRequest, SchemaStore, StoreError,
};

use crate::common::{deterministic_importer, read_fixture, StoreContext};

#[test]
fn test_diagram_crud() {
    let ctx = StoreContext::new();
    let mut store = FileStore::with_ids(&ctx.store_path, Box::new(SequentialIds::new("d")));

    let first = store.create_diagram("  Billing  ").unwrap();
    assert_eq!(first.name, "Billing");
    assert_eq!(first.version, 0);
    let second = store.create_diagram("Inventory").unwrap();

    let renamed = ctx.store().rename_diagram(&first.id, "Billing v2").unwrap();
    assert_eq!(renamed.version, 1);

    // Most recently touched first
    let names: Vec<String> = store
        .list_diagrams()
        .unwrap()
        .into_iter()
        .map(|l| l.name)
        .collect();
    assert_eq!(names, vec!["Billing v2", "Inventory"]);

    store.delete_diagram(&second.id).unwrap();
    assert!(matches!(
        store.get_diagram(&second.id),
        Err(StoreError::DiagramNotFound { .. })
    ));
    assert_eq!(store.list_diagrams().unwrap().len(), 1);
}

#[test]
fn test_blank_name_writes_nothing() {
    let ctx = StoreContext::new();
    let mut store = ctx.store();
    assert!(matches!(
        store.create_diagram("   "),
        Err(StoreError::InvalidName { .. })
    ));
    assert!(!ctx.store_path.exists());
}

#[test]
fn test_store_file_is_camel_case_json() {
    let ctx = StoreContext::new();
    let mut store = ctx.store();
    let diagram = store.create_diagram("wire").unwrap();
    let request = ImportRequest::from(ddl_ingest::parse_sql(
        "CREATE TABLE users (id INT AUTO_INCREMENT PRIMARY KEY);",
    ));
    deterministic_importer("w")
        .import(&mut store, &diagram.id, &request)
        .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&ctx.store_path).unwrap()).unwrap();
    let stored = &json["diagrams"][0];
    assert_eq!(stored["version"], 1);
    let column = &stored["tables"][0]["columns"][0];
    assert_eq!(column["dataType"], "INT");
    assert_eq!(column["indexType"], "PK");
    assert_eq!(column["autoIncrement"], true);
    assert!(stored["tables"][0]["positionX"].is_number());
}

#[test]
fn test_editor_save_cascades_in_file_store() {
    let ctx = StoreContext::new();
    let mut store = ctx.store();
    let diagram = store.create_diagram("shop").unwrap();
    let request = ImportRequest::from(ddl_ingest::parse_sql(&read_fixture("shop.sql")));
    deterministic_importer("s")
        .import(&mut store, &diagram.id, &request)
        .unwrap();

    let mut editor = DiagramEditor::open(&store, &diagram.id).unwrap();
    let category_id = editor
        .diagram()
        .table_by_name("products")
        .unwrap()
        .columns
        .iter()
        .find(|c| c.name == "category_id")
        .unwrap()
        .id
        .clone();
    editor.delete_column(&category_id).unwrap();
    let summary = editor.save(&mut ctx.store()).unwrap();

    assert_eq!(summary.columns_deleted, 1);
    assert_eq!(summary.relationships_deleted, 1);
    assert_eq!(summary.tables_deleted, 0);

    let stored = ctx.store().get_diagram(&diagram.id).unwrap();
    assert_eq!(stored.relationships.len(), 3);
    let products = stored.table_by_name("products").unwrap();
    let orders: Vec<usize> = products.columns.iter().map(|c| c.order).collect();
    assert_eq!(orders, vec![0, 1, 2, 3]);
    assert_eq!(products.columns[0].index_type, IndexType::PrimaryKey);
    assert!(stored.check_invariants().is_ok());
}

#[test]
fn test_snapshot_tracks_version_and_positions() {
    let ctx = StoreContext::new();
    let mut store = ctx.store();
    let diagram = store.create_diagram("snap").unwrap();
    assert_eq!(store.snapshot(&diagram.id).unwrap().version, 0);

    let request = ImportRequest::from(ddl_ingest::parse_sql(
        "CREATE TABLE a (id INT); CREATE TABLE b (id INT);",
    ));
    deterministic_importer("n")
        .import(&mut store, &diagram.id, &request)
        .unwrap();

    let snapshot = ctx.store().snapshot(&diagram.id).unwrap();
    assert_eq!(snapshot.version, 1);
    let names: Vec<&str> = snapshot.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(snapshot.tables[0].position_x, 100.0);
    assert_eq!(snapshot.tables[1].position_x, 500.0);
}

#[test]
fn test_corrupt_store_is_reported() {
    let ctx = StoreContext::new();
    fs::write(&ctx.store_path, "{ not json").unwrap();
    let err = ctx.store().list_diagrams().unwrap_err();
    assert!(matches!(err, StoreError::Json { .. }));
    // The broken file is left for inspection
    assert_eq!(fs::read_to_string(&ctx.store_path).unwrap(), "{ not json");
}

#[test]
fn test_parallel_importers_keep_every_reported_table() {
    use std::thread;

    let ctx = StoreContext::new();
    let diagram = ctx.store().create_diagram("busy").unwrap();

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let path = ctx.store_path.clone();
            let diagram_id = diagram.id.clone();
            thread::spawn(move || {
                let mut store = FileStore::open(path);
                let request = ImportRequest::from(ddl_ingest::parse_sql(&format!(
                    "CREATE TABLE batch_{i} (id INT PRIMARY KEY);"
                )));
                deterministic_importer(&format!("p{i}-")).import(&mut store, &diagram_id, &request)
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.join().unwrap() {
            Ok(response) => created += response.tables_created,
            Err(err) => assert!(
                matches!(err, ImportError::Store(StoreError::VersionConflict { .. })),
                "{err}"
            ),
        }
    }

    // Whatever interleaving happened, nothing reported as imported is missing
    let stored = ctx.store().get_diagram(&diagram.id).unwrap();
    assert!(created >= 1);
    assert_eq!(stored.tables.len(), created);
    assert_eq!(stored.version, created as u64);
    assert!(stored.check_invariants().is_ok());
}
