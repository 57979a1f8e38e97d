//! Storage trait consumed by the profiling and answering engine

use serde_json::Value;
use thiserror::Error;

use crate::types::{ColumnMeta, QueryResult};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Query failed: {message} (sql: {sql})")]
    Query { sql: String, message: String },

    #[error("Store connection error: {0}")]
    Connection(String),
}

/// Read-only access to a single embedded relational store
///
/// Implementations hold no state between calls that the engine relies on;
/// every operation reflects the store as it is at call time.
pub trait Store {
    /// All user table names, excluding internal/system tables
    fn list_tables(&self) -> Result<Vec<String>, StoreError>;

    /// Column metadata for a table
    ///
    /// May return an empty vector for a nonexistent table, so callers must
    /// check the name against `list_tables()` first.
    fn describe_table(&self, table: &str) -> Result<Vec<ColumnMeta>, StoreError>;

    /// Run a read-only statement
    fn execute_query(&self, sql: &str) -> Result<QueryResult, StoreError>;
}

impl<S: Store + ?Sized> Store for &S {
    fn list_tables(&self) -> Result<Vec<String>, StoreError> {
        (**self).list_tables()
    }

    fn describe_table(&self, table: &str) -> Result<Vec<ColumnMeta>, StoreError> {
        (**self).describe_table(table)
    }

    fn execute_query(&self, sql: &str) -> Result<QueryResult, StoreError> {
        (**self).execute_query(sql)
    }
}

/// Quote an identifier for interpolation into generated SQL
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string literal for interpolation into generated SQL
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Read a count-like cell; NULL and non-numeric cells count as zero
pub(crate) fn value_as_u64(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

/// Read a numeric cell as f64, if it is one
pub(crate) fn value_as_f64(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("customers"), "\"customers\"");
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }

    #[test]
    fn test_quote_literal_escapes_quotes() {
        assert_eq!(quote_literal("o'brien"), "'o''brien'");
    }

    #[test]
    fn test_value_as_u64() {
        assert_eq!(value_as_u64(Some(&json!(42))), 42);
        assert_eq!(value_as_u64(Some(&json!("7"))), 7);
        assert_eq!(value_as_u64(Some(&Value::Null)), 0);
        assert_eq!(value_as_u64(None), 0);
    }

    #[test]
    fn test_value_as_f64() {
        assert_eq!(value_as_f64(Some(&json!(2.5))), Some(2.5));
        assert_eq!(value_as_f64(Some(&json!(3))), Some(3.0));
        assert_eq!(value_as_f64(Some(&Value::Null)), None);
    }
}
