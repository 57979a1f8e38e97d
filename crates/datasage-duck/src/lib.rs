//! DuckDB-backed store for the DataSage engine

use std::path::Path;

use datasage_core::{ColumnMeta, QueryResult, Store, StoreError};
use duckdb::{Connection, Result as DuckResult};
use thiserror::Error;
use tracing::debug;

pub mod demo;
pub mod value;

pub use value::value_ref_to_json;

/// Path value that selects an in-memory database
pub const IN_MEMORY: &str = ":memory:";

#[derive(Debug, Error)]
pub enum DuckError {
    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),
}

/// Embedded DuckDB store
///
/// `duckdb::Connection` is `Send` but not `Sync`; share a store across
/// threads by handing each worker its own [`DuckStore::try_clone`].
pub struct DuckStore {
    conn: Connection,
}

impl DuckStore {
    /// Open a database file, or an in-memory database for `:memory:`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DuckError> {
        let path = path.as_ref();
        if path.as_os_str() == IN_MEMORY {
            return Self::open_in_memory();
        }
        debug!(path = %path.display(), "Opening DuckDB database");
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self, DuckError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// A new connection to the same database
    pub fn try_clone(&self) -> Result<Self, DuckError> {
        Ok(Self {
            conn: self.conn.try_clone()?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run a statement and collect every row as JSON cells
    fn run(&self, sql: &str) -> DuckResult<QueryResult> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;

        let columns: Vec<String> = rows
            .as_ref()
            .map(|s| s.column_names())
            .unwrap_or_default();

        let mut result_rows = Vec::new();
        while let Some(row) = rows.next()? {
            let mut json_row = Vec::with_capacity(columns.len());
            for idx in 0..columns.len() {
                json_row.push(value_ref_to_json(row.get_ref(idx)?));
            }
            result_rows.push(json_row);
        }

        Ok(QueryResult::new(columns, result_rows))
    }

    fn primary_key_columns(&self, table: &str) -> DuckResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT UNNEST(constraint_column_names) \
             FROM duckdb_constraints() \
             WHERE schema_name = 'main' AND table_name = ? AND constraint_type = 'PRIMARY KEY'",
        )?;
        let names = stmt
            .query_map([table], |row| row.get::<_, String>(0))?
            .collect::<DuckResult<Vec<_>>>()?;
        Ok(names)
    }
}

fn query_error(sql: &str, e: duckdb::Error) -> StoreError {
    StoreError::Query {
        sql: sql.to_string(),
        message: e.to_string(),
    }
}

impl Store for DuckStore {
    fn list_tables(&self) -> Result<Vec<String>, StoreError> {
        let sql = "SELECT table_name FROM information_schema.tables \
                   WHERE table_schema = 'main' AND table_type = 'BASE TABLE' \
                   AND table_catalog = current_database() \
                   ORDER BY table_name";

        let mut stmt = self.conn.prepare(sql).map_err(|e| query_error(sql, e))?;
        let tables = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<DuckResult<Vec<_>>>())
            .map_err(|e| query_error(sql, e))?;
        Ok(tables)
    }

    fn describe_table(&self, table: &str) -> Result<Vec<ColumnMeta>, StoreError> {
        let sql = "SELECT column_name, data_type, is_nullable \
                   FROM information_schema.columns \
                   WHERE table_schema = 'main' AND table_name = ? \
                   AND table_catalog = current_database() \
                   ORDER BY ordinal_position";

        let mut stmt = self.conn.prepare(sql).map_err(|e| query_error(sql, e))?;
        let columns: Vec<(String, String, String)> = stmt
            .query_map([table], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .and_then(|rows| rows.collect::<DuckResult<Vec<_>>>())
            .map_err(|e| query_error(sql, e))?;

        if columns.is_empty() {
            return Ok(Vec::new());
        }

        let primary_keys = self
            .primary_key_columns(table)
            .map_err(|e| query_error("duckdb_constraints()", e))?;

        Ok(columns
            .into_iter()
            .map(|(name, data_type, is_nullable)| ColumnMeta {
                primary_key: primary_keys.contains(&name),
                nullable: is_nullable == "YES",
                name,
                data_type,
            })
            .collect())
    }

    fn execute_query(&self, sql: &str) -> Result<QueryResult, StoreError> {
        debug!(sql, "Executing query");
        self.run(sql).map_err(|e| query_error(sql, e))
    }
}
