//! Schema catalog - table listing and column metadata

use std::collections::BTreeMap;

use crate::error::{AssistantError, Result};
use crate::store::Store;
use crate::types::{ColumnMeta, DatabaseStats};

/// Catalog view over a store
///
/// Nothing is cached: every call re-reads the store's metadata.
pub struct Catalog<'a, S: Store + ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> Catalog<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self.store.list_tables()?)
    }

    /// Column metadata, trusting the table name
    pub fn describe_table(&self, table: &str) -> Result<Vec<ColumnMeta>> {
        Ok(self.store.describe_table(table)?)
    }

    /// Column metadata for a table validated against `list_tables()`
    pub fn require_table(&self, table: &str) -> Result<Vec<ColumnMeta>> {
        let tables = self.list_tables()?;
        if !tables.iter().any(|t| t == table) {
            return Err(AssistantError::TableNotFound(table.to_string()));
        }
        self.describe_table(table)
    }

    /// Metadata for one column of a validated table
    pub fn require_column(&self, table: &str, column: &str) -> Result<ColumnMeta> {
        self.require_table(table)?
            .into_iter()
            .find(|c| c.name == column)
            .ok_or_else(|| AssistantError::ColumnNotFound {
                table: table.to_string(),
                column: column.to_string(),
            })
    }

    /// Every table with its columns
    pub fn extract_metadata(&self) -> Result<BTreeMap<String, Vec<ColumnMeta>>> {
        let mut metadata = BTreeMap::new();
        for table in self.list_tables()? {
            let columns = self.describe_table(&table)?;
            metadata.insert(table, columns);
        }
        Ok(metadata)
    }

    pub fn database_stats(&self) -> Result<DatabaseStats> {
        let tables = self.list_tables()?;
        let mut columns = 0;
        for table in &tables {
            columns += self.describe_table(table)?.len();
        }
        Ok(DatabaseStats {
            tables: tables.len(),
            columns,
        })
    }

    /// One `CREATE TABLE` line per table, used as translator context
    pub fn schema_description(&self) -> Result<String> {
        let mut lines = Vec::new();
        for table in self.list_tables()? {
            let column_defs: Vec<String> = self
                .describe_table(&table)?
                .iter()
                .map(|c| format!("{} {}", c.name, c.data_type))
                .collect();
            lines.push(format!("CREATE TABLE {} ({});", table, column_defs.join(", ")));
        }
        Ok(lines.join("\n"))
    }
}
