//! Unit tests for the MySQL DDL parser
//!
//! These go through the public parse entry points only.

use pretty_assertions::assert_eq;

use ddl_ingest::parser::{
    parse_sources, parse_sql, parse_sql_with, DataType, ParseOptions, ParsedRelationship,
    RelationshipOrigin, Severity, SqlSource,
};
use ddl_ingest::relationship::ReferenceNaming;

use crate::common::read_fixture;

fn relationship(
    source: (&str, &str),
    target: (&str, &str),
    origin: RelationshipOrigin,
) -> ParsedRelationship {
    ParsedRelationship {
        source_table: source.0.to_string(),
        source_column: source.1.to_string(),
        target_table: target.0.to_string(),
        target_column: target.1.to_string(),
        origin,
    }
}

// ============================================================================
// Core behaviour
// ============================================================================

#[test]
fn test_inline_primary_key_does_not_imply_not_null() {
    let result = parse_sql("CREATE TABLE t (id INT PRIMARY KEY)");
    assert!(result.errors.is_empty());
    assert_eq!(result.tables.len(), 1);

    let table = &result.tables[0];
    assert_eq!(table.name, "t");
    assert_eq!(table.primary_keys, vec!["id"]);
    assert_eq!(table.columns.len(), 1);
    assert!(table.columns[0].nullable);
}

#[test]
fn test_users_table() {
    let result = parse_sql("CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR(50));");
    assert_eq!(result.tables.len(), 1);
    let users = &result.tables[0];
    assert_eq!(users.columns.len(), 2);
    let name = &users.columns[1];
    assert_eq!(name.name, "name");
    assert!(name.nullable);
    assert_eq!(name.data_type, DataType::Varchar);
}

#[test]
fn test_explicit_foreign_key() {
    let result = parse_sql(
        "CREATE TABLE users (id INT PRIMARY KEY);
         CREATE TABLE posts (id INT PRIMARY KEY, user_id INT NOT NULL,
           FOREIGN KEY (user_id) REFERENCES users(id));",
    );
    assert_eq!(
        result.relationships,
        vec![relationship(
            ("posts", "user_id"),
            ("users", "id"),
            RelationshipOrigin::Explicit
        )]
    );
}

#[test]
fn test_implicit_relationship() {
    let result = parse_sql("CREATE TABLE users (id INT); CREATE TABLE posts (user_id INT);");
    assert_eq!(
        result.relationships,
        vec![relationship(
            ("posts", "user_id"),
            ("users", "id"),
            RelationshipOrigin::Implicit
        )]
    );
}

#[test]
fn test_unknown_type_warns_and_falls_back() {
    let result = parse_sql("CREATE TABLE t (c MYTYPE)");
    assert_eq!(result.tables[0].columns[0].data_type, DataType::Varchar);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].severity, Severity::Warning);
    assert_eq!(
        result.errors[0].message,
        "Unknown data type \"MYTYPE\", defaulting to VARCHAR"
    );
    assert!(!result.has_errors());
}

#[test]
fn test_missing_closing_paren_does_not_stop_parsing() {
    let result = parse_sql("CREATE TABLE broken (id INT; CREATE TABLE fine (id INT);");
    assert_eq!(result.tables.len(), 1);
    assert_eq!(result.tables[0].name, "fine");
    assert_eq!(result.error_count(), 1);
    assert_eq!(result.errors[0].line, 1);
    assert_eq!(
        result.errors[0].message,
        "Could not extract table body for table \"broken\""
    );
}

#[test]
fn test_parse_is_idempotent() {
    let sql = read_fixture("shop.sql");
    assert_eq!(parse_sql(&sql), parse_sql(&sql));
}

// ============================================================================
// Errors and warnings
// ============================================================================

#[test]
fn test_missing_table_name() {
    let result = parse_sql("CREATE TABLE (id INT)");
    assert!(result.tables.is_empty());
    assert_eq!(
        result.errors[0].message,
        "Could not extract table name from CREATE TABLE statement"
    );
    assert!(result.errors[0].is_error());
}

#[test]
fn test_bad_column_dropped_alone() {
    let result = parse_sql("CREATE TABLE t (id INT, lonely, name VARCHAR(10))");
    let names: Vec<&str> = result.tables[0]
        .columns
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["id", "name"]);
    assert_eq!(
        result.errors[0].message,
        "Could not extract data type for column \"lonely\""
    );
}

#[test]
fn test_unsupported_statement_warning() {
    let result = parse_sql("RENAME TABLE old_name TO new_name; FOO;");
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].severity, Severity::Warning);
    assert_eq!(
        result.errors[0].message,
        "Skipped unsupported statement: RENAME TABLE old_name TO new_name..."
    );
}

#[test]
fn test_unsupported_preview_truncated() {
    let long = format!("RENAME TABLE {} TO b", "a".repeat(80));
    let result = parse_sql(&long);
    let expected: String = long.chars().take(50).collect();
    assert_eq!(
        result.errors[0].message,
        format!("Skipped unsupported statement: {}...", expected)
    );
}

#[test]
fn test_errors_use_statement_index() {
    let result = parse_sql(
        "SET NAMES utf8mb4; CREATE TABLE a (id INT); CREATE TABLE (x INT);",
    );
    assert_eq!(result.errors[0].line, 3);
}

// ============================================================================
// Dialect coverage
// ============================================================================

#[test]
fn test_mysqldump_fixture() {
    let result = parse_sql(&read_fixture("shop.sql"));
    assert!(result.errors.is_empty(), "{:?}", result.errors);

    let names: Vec<&str> = result.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["users", "categories", "products", "orders", "order_items"]
    );

    let users = result.table("users").unwrap();
    assert_eq!(users.primary_keys, vec!["id"]);
    assert_eq!(users.unique_keys, vec![vec!["email".to_string()]]);
    let id = users.column("id").unwrap();
    assert!(id.unsigned && id.auto_increment && !id.nullable);
    let created = users.column("created_at").unwrap();
    assert_eq!(created.data_type, DataType::Datetime);
    assert_eq!(created.default_value.as_deref(), Some("CURRENT_TIMESTAMP"));
    assert_eq!(users.column("display_name").unwrap().default_value, None);

    let categories = result.table("categories").unwrap();
    assert_eq!(
        categories.column("name").unwrap().comment.as_deref(),
        Some("Shown in menus; keep it short")
    );

    let products = result.table("products").unwrap();
    assert_eq!(products.column("price").unwrap().data_type, DataType::Decimal);
    assert_eq!(
        products.column("price").unwrap().default_value.as_deref(),
        Some("0.00")
    );
    assert_eq!(products.column("status").unwrap().data_type, DataType::Enum);
    assert_eq!(products.indexes, vec![vec!["category_id".to_string()]]);

    let order_items = result.table("order_items").unwrap();
    assert_eq!(order_items.primary_keys, vec!["order_id", "product_id"]);

    let explicit = result
        .relationships
        .iter()
        .filter(|r| r.origin == RelationshipOrigin::Explicit)
        .count();
    assert_eq!(explicit, 3);
    assert!(result.relationships.contains(&relationship(
        ("orders", "user_id"),
        ("users", "id"),
        RelationshipOrigin::Implicit
    )));
    assert_eq!(result.relationships.len(), 4);
}

#[test]
fn test_phpmyadmin_fixture_applies_alter_keys() {
    let result = parse_sql(&read_fixture("phpmyadmin.sql"));
    assert!(result.errors.is_empty(), "{:?}", result.errors);

    let authors = result.table("authors").unwrap();
    assert_eq!(authors.primary_keys, vec!["id"]);
    assert_eq!(authors.column("bio").unwrap().default_value, None);

    let books = result.table("books").unwrap();
    assert_eq!(books.primary_keys, vec!["id"]);
    assert_eq!(books.unique_keys, vec![vec!["isbn".to_string()]]);
    assert_eq!(books.indexes, vec![vec!["author_id".to_string()]]);
    assert_eq!(books.column("published").unwrap().data_type, DataType::Year);

    assert_eq!(
        result.relationships,
        vec![relationship(
            ("books", "author_id"),
            ("authors", "id"),
            RelationshipOrigin::Explicit
        )]
    );
}

#[test]
fn test_schema_qualified_names() {
    let result = parse_sql(
        "CREATE TABLE `shop`.`users` (id INT);
         CREATE TABLE shop.orders (id INT, buyer INT,
           FOREIGN KEY (buyer) REFERENCES `shop`.`users` (id));",
    );
    assert_eq!(result.tables[0].name, "users");
    assert_eq!(result.tables[1].name, "orders");
    assert_eq!(result.relationships[0].target_table, "users");
}

#[test]
fn test_double_quoted_identifiers() {
    let result = parse_sql(
        r#"CREATE TABLE "users" ("id" INT, PRIMARY KEY ("id"));
           CREATE TABLE posts (id INT, author INT,
             FOREIGN KEY ("author") REFERENCES "users" ("id"));"#,
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);

    let users = &result.tables[0];
    assert_eq!(users.name, "users");
    assert_eq!(users.columns.len(), 1);
    assert_eq!(users.columns[0].name, "id");
    assert_eq!(users.primary_keys, vec!["id"]);

    assert_eq!(result.relationships.len(), 1);
    let rel = &result.relationships[0];
    assert_eq!(
        (rel.source_table.as_str(), rel.source_column.as_str()),
        ("posts", "author")
    );
    assert_eq!(
        (rel.target_table.as_str(), rel.target_column.as_str()),
        ("users", "id")
    );
    assert_eq!(rel.origin, RelationshipOrigin::Explicit);
}

#[test]
fn test_composite_foreign_key_pairs_positionally() {
    let result = parse_sql(
        "CREATE TABLE a (x INT, y INT, PRIMARY KEY (x, y));
         CREATE TABLE b (ax INT, ay INT,
           CONSTRAINT fk_ab FOREIGN KEY (ax, ay) REFERENCES a (x, y));",
    );
    assert_eq!(
        result.relationships,
        vec![
            relationship(("b", "ax"), ("a", "x"), RelationshipOrigin::Explicit),
            relationship(("b", "ay"), ("a", "y"), RelationshipOrigin::Explicit),
        ]
    );
}

#[test]
fn test_mismatched_foreign_key_skipped_silently() {
    let result = parse_sql(
        "CREATE TABLE a (x INT);
         CREATE TABLE b (ax INT, ay INT, FOREIGN KEY (ax, ay) REFERENCES a (x));",
    );
    assert!(result.relationships.is_empty());
    assert!(result.errors.is_empty());
}

#[test]
fn test_alter_table_with_several_foreign_keys() {
    let result = parse_sql(
        "CREATE TABLE users (id INT); CREATE TABLE tags (id INT);
         CREATE TABLE posts (id INT, author INT, tag INT);
         ALTER TABLE posts
           ADD CONSTRAINT fk_author FOREIGN KEY (author) REFERENCES users (id) ON DELETE CASCADE,
           ADD FOREIGN KEY (tag) REFERENCES tags (id);",
    );
    assert_eq!(
        result.relationships,
        vec![
            relationship(("posts", "author"), ("users", "id"), RelationshipOrigin::Explicit),
            relationship(("posts", "tag"), ("tags", "id"), RelationshipOrigin::Explicit),
        ]
    );
}

#[test]
fn test_create_temporary_table() {
    let result = parse_sql("CREATE TEMPORARY TABLE IF NOT EXISTS scratch (id INT)");
    assert!(result.errors.is_empty());
    assert_eq!(result.tables[0].name, "scratch");
}

// ============================================================================
// Multiple sources and options
// ============================================================================

#[test]
fn test_sources_tag_errors_and_share_implicit_detection() {
    let sources = vec![
        SqlSource::new("users.sql", "CREATE TABLE users (id INT);"),
        SqlSource::new("posts.sql", "CREATE TABLE posts (user_id INT); CREATE TABLE (x INT);"),
    ];
    let result = parse_sources(&sources, &ParseOptions::default());

    assert_eq!(result.tables.len(), 2);
    assert_eq!(result.relationships.len(), 1);
    assert_eq!(result.errors[0].source.as_deref(), Some("posts.sql"));
    assert_eq!(result.errors[0].line, 2);
}

#[test]
fn test_many_sources_keep_input_order() {
    let sources: Vec<SqlSource> = (0..12)
        .map(|i| SqlSource::new(format!("{i}.sql"), format!("CREATE TABLE t{i} (id INT);")))
        .collect();
    let result = parse_sources(&sources, &ParseOptions::default());
    let names: Vec<String> = result.tables.iter().map(|t| t.name.clone()).collect();
    let expected: Vec<String> = (0..12).map(|i| format!("t{i}")).collect();
    assert_eq!(names, expected);
}

struct FkPrefixNaming;

impl ReferenceNaming for FkPrefixNaming {
    fn candidate_tables(&self, column: &str) -> Vec<String> {
        column
            .strip_prefix("fk_")
            .map(|base| vec![base.to_string()])
            .unwrap_or_default()
    }
}

#[test]
fn test_custom_naming_strategy() {
    let options = ParseOptions {
        naming: Box::new(FkPrefixNaming),
        ..ParseOptions::default()
    };
    let result = parse_sql_with(
        "CREATE TABLE owner (id INT); CREATE TABLE pet (fk_owner INT, owner_id INT);",
        &options,
    );
    assert_eq!(
        result.relationships,
        vec![relationship(
            ("pet", "fk_owner"),
            ("owner", "id"),
            RelationshipOrigin::Implicit
        )]
    );
}
