//! Fail-soft fact extraction against a real DuckDB store

use datasage_core::{ChatFacts, Fact, FactExtractor, FactTarget};
use datasage_duck::DuckStore;

fn store(sql: &str) -> DuckStore {
    let store = DuckStore::open_in_memory().expect("in-memory duckdb");
    store.connection().execute_batch(sql).expect("setup sql");
    store
}

#[test]
fn test_missing_designated_table() {
    let store = store("CREATE TABLE employees (id INTEGER, name VARCHAR);");
    let report = FactExtractor::new(&store).extract();

    assert!(!report.target_present);
    assert!(report.is_complete());
    assert_eq!(
        report.facts,
        ChatFacts {
            tables: vec!["employees".to_string()],
            ..ChatFacts::default()
        }
    );
    assert_eq!(report.facts.customer_count, 0);
    assert!(report.facts.top_states.is_empty());
}

#[test]
fn test_empty_store() {
    let store = store("SELECT 1;");
    let report = FactExtractor::new(&store).extract();

    assert!(report.is_complete());
    assert_eq!(report.facts, ChatFacts::default());
}

#[test]
fn test_full_facts_with_alphabetical_tie_break() {
    let store = store(
        "CREATE TABLE customers (customer_id INTEGER, city VARCHAR, state VARCHAR);
         INSERT INTO customers VALUES
            (1, 'Buffalo', 'NY'),
            (2, 'Campbell', 'CA'),
            (3, 'Monroe', 'NY'),
            (4, 'Campbell', 'CA'),
            (5, 'Garland', 'TX'),
            (6, NULL, NULL);",
    );
    let report = FactExtractor::new(&store).extract();

    assert!(report.target_present);
    assert!(report.is_complete());
    assert_eq!(report.facts.tables, vec!["customers"]);
    assert_eq!(report.facts.customer_count, 6);
    assert_eq!(report.facts.customer_states, 3);
    assert_eq!(report.facts.customer_cities, 4);
    assert_eq!(report.facts.top_states, vec!["CA", "NY", "TX"]);
}

#[test]
fn test_top_states_capped_at_five() {
    let store = store(
        "CREATE TABLE customers (customer_id INTEGER, city VARCHAR, state VARCHAR);
         INSERT INTO customers VALUES
            (1, 'a', 'WA'), (2, 'b', 'WA'), (3, 'c', 'WA'),
            (4, 'd', 'OR'), (5, 'e', 'OR'),
            (6, 'f', 'AZ'), (7, 'g', 'NV'), (8, 'h', 'UT'), (9, 'i', 'ID'), (10, 'j', 'MT');",
    );
    let report = FactExtractor::new(&store).extract();

    assert_eq!(report.facts.customer_states, 7);
    assert_eq!(report.facts.top_states, vec!["WA", "OR", "AZ", "ID", "MT"]);
}

#[test]
fn test_missing_columns_degrade_only_their_facts() {
    let store = store(
        "CREATE TABLE customers (customer_id INTEGER, city VARCHAR);
         INSERT INTO customers VALUES (1, 'Austin'), (2, 'Austin'), (3, 'Dallas');",
    );
    let report = FactExtractor::new(&store).extract();

    assert!(report.target_present);
    assert!(!report.is_complete());
    assert!(report.is_degraded(Fact::CustomerStates));
    assert!(report.is_degraded(Fact::TopStates));
    assert!(!report.is_degraded(Fact::CustomerCount));
    assert!(!report.is_degraded(Fact::CustomerCities));

    assert_eq!(report.facts.customer_count, 3);
    assert_eq!(report.facts.customer_cities, 2);
    assert_eq!(report.facts.customer_states, 0);
    assert!(report.facts.top_states.is_empty());
}

#[test]
fn test_custom_target() {
    let store = store(
        "CREATE TABLE clients (id INTEGER, town VARCHAR, province VARCHAR);
         INSERT INTO clients VALUES (1, 'Halifax', 'NS'), (2, 'Toronto', 'ON'), (3, 'Ottawa', 'ON');",
    );
    let target = FactTarget {
        table: "clients".to_string(),
        region_column: "province".to_string(),
        locality_column: "town".to_string(),
    };
    let report = FactExtractor::with_target(&store, target).extract();

    assert!(report.is_complete());
    assert_eq!(report.facts.customer_count, 3);
    assert_eq!(report.facts.customer_states, 2);
    assert_eq!(report.facts.top_states, vec!["ON", "NS"]);
}
