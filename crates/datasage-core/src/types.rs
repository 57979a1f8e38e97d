//! Value objects derived from the live store on every request

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Column metadata as reported by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String, // Backend-reported type name, e.g. "INTEGER"
    pub nullable: bool,
    pub primary_key: bool,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            primary_key: false,
        }
    }
}

/// Per-column statistic
///
/// Serialized untagged so numeric columns render as `{"min", "max", "avg"}`
/// and everything else as `{"distinct"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnStat {
    Numeric {
        min: Option<Value>,
        max: Option<Value>,
        avg: Option<f64>,
    },
    Categorical {
        distinct: u64,
    },
}

impl ColumnStat {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnStat::Numeric { .. })
    }
}

/// A single sample row keyed by column name
pub type SampleRow = Map<String, Value>;

/// Full profile of one table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableProfile {
    pub table: String,
    pub columns: Vec<ColumnMeta>,
    pub row_count: u64,
    pub sample: Vec<SampleRow>,
    pub statistics: BTreeMap<String, ColumnStat>,
}

/// Raw result of a store query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub row_count: usize,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let row_count = rows.len();
        Self {
            columns,
            rows,
            row_count,
        }
    }

    /// First cell of the first row, if any
    pub fn scalar(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.first())
    }

    /// Zip each row with the column names
    pub fn to_records(&self) -> Vec<SampleRow> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect::<SampleRow>()
            })
            .collect()
    }
}

/// Compact summary of the designated table used by the chat router
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatFacts {
    pub tables: Vec<String>,
    pub customer_count: u64,
    pub customer_states: u64,
    pub customer_cities: u64,
    pub top_states: Vec<String>,
}

/// Table and column totals across the whole store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseStats {
    pub tables: usize,
    pub columns: usize,
}
