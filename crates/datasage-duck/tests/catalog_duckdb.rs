//! Schema catalog against a real DuckDB store

use datasage_core::catalog::Catalog;
use datasage_core::{AssistantError, Store};
use datasage_duck::DuckStore;

fn store_with_schema() -> DuckStore {
    let store = DuckStore::open_in_memory().expect("in-memory duckdb");
    store
        .connection()
        .execute_batch(
            "CREATE TABLE products (
                id INTEGER PRIMARY KEY,
                product_name VARCHAR NOT NULL,
                price DOUBLE,
                stock INTEGER
             );
             CREATE TABLE orders (id INTEGER PRIMARY KEY, customer_id INTEGER, order_date DATE);
             CREATE VIEW expensive AS SELECT * FROM products WHERE price > 100;",
        )
        .expect("schema");
    store
}

#[test]
fn test_list_tables_sorted_without_views() {
    let store = store_with_schema();
    assert_eq!(store.list_tables().unwrap(), vec!["orders", "products"]);
}

#[test]
fn test_describe_table_metadata() {
    let store = store_with_schema();
    let columns = store.describe_table("products").unwrap();

    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "product_name", "price", "stock"]);

    assert!(columns[0].primary_key);
    assert!(!columns[1].primary_key);
    assert!(!columns[1].nullable);
    assert!(columns[2].nullable);
    assert_eq!(columns[2].data_type, "DOUBLE");
    assert_eq!(columns[3].data_type, "INTEGER");
}

#[test]
fn test_describe_unknown_table_is_empty() {
    let store = store_with_schema();
    assert!(store.describe_table("nope").unwrap().is_empty());
}

#[test]
fn test_require_table_and_column() {
    let store = store_with_schema();
    let catalog = Catalog::new(&store);

    assert!(matches!(
        catalog.require_table("nope"),
        Err(AssistantError::TableNotFound(t)) if t == "nope"
    ));
    assert!(matches!(
        catalog.require_column("products", "colour"),
        Err(AssistantError::ColumnNotFound { .. })
    ));
    assert_eq!(catalog.require_column("orders", "order_date").unwrap().data_type, "DATE");
}

#[test]
fn test_database_stats_and_schema_description() {
    let store = store_with_schema();
    let catalog = Catalog::new(&store);

    let stats = catalog.database_stats().unwrap();
    assert_eq!(stats.tables, 2);
    assert_eq!(stats.columns, 7);

    let schema = catalog.schema_description().unwrap();
    assert_eq!(
        schema,
        "CREATE TABLE orders (id INTEGER, customer_id INTEGER, order_date DATE);\n\
         CREATE TABLE products (id INTEGER, product_name VARCHAR, price DOUBLE, stock INTEGER);"
    );

    let metadata = catalog.extract_metadata().unwrap();
    assert_eq!(metadata.len(), 2);
    assert_eq!(metadata["orders"].len(), 3);
}
