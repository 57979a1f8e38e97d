//! Table profiler - row counts, per-column statistics, and sample rows
//!
//! Statistics are computed with one query per column. That is fine for
//! exploratory schema inspection but scales linearly with column count.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::store::{quote_ident, value_as_f64, value_as_u64, Store, StoreError};
use crate::types::{ColumnStat, QueryResult, TableProfile};

/// Default number of sample rows in a profile
pub const DEFAULT_SAMPLE_LIMIT: usize = 5;

/// Type-name fragments that mark a column as numeric
const NUMERIC_MARKERS: [&str; 4] = ["INT", "REAL", "FLOAT", "DOUBLE"];

/// Types that contain a numeric marker but have no MIN/MAX/AVG:
/// lists (`INTEGER[]`), nested types, `INTERVAL` and `POINT`
const NON_SCALAR_MARKERS: [&str; 6] = ["[", "STRUCT", "MAP", "UNION", "INTERVAL", "POINT"];

/// Which statistic a column gets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    Numeric,
    Categorical,
}

impl StatKind {
    /// Classify a backend type name by case-insensitive substring match.
    /// Unrecognized and non-scalar types are categorical.
    pub fn classify(data_type: &str) -> Self {
        let upper = data_type.to_uppercase();
        if NON_SCALAR_MARKERS.iter().any(|marker| upper.contains(marker)) {
            return StatKind::Categorical;
        }
        if NUMERIC_MARKERS.iter().any(|marker| upper.contains(marker)) {
            StatKind::Numeric
        } else {
            StatKind::Categorical
        }
    }
}

/// Round half up (away from zero) to two decimal places.
///
/// Works on the shortest decimal form of `value`, so `1.005` becomes
/// `1.01` even though its binary value is slightly below `1.005`.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let text = value.abs().to_string();
    let Some((whole, frac)) = text.split_once('.') else {
        return value;
    };
    if frac.len() <= 2 {
        return value;
    }

    let Ok(mut scaled) = format!("{}{}", whole, &frac[..2]).parse::<u128>() else {
        return (value * 100.0).round() / 100.0;
    };
    if frac.as_bytes()[2] >= b'5' {
        scaled += 1;
    }
    (scaled as f64 / 100.0).copysign(value)
}

pub struct Profiler<'a, S: Store + ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> Profiler<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Up to `limit` rows in store-native order.
    ///
    /// The order is arbitrary but stable within a single query.
    pub fn preview(&self, table: &str, limit: usize) -> Result<QueryResult> {
        let sql = format!("SELECT * FROM {} LIMIT {}", quote_ident(table), limit);
        debug!(table, limit, "Previewing table");
        Ok(self.store.execute_query(&sql)?)
    }

    /// Row count plus one statistic per column
    pub fn stats(&self, table: &str) -> Result<(u64, BTreeMap<String, ColumnStat>)> {
        let quoted_table = quote_ident(table);

        let count_sql = format!("SELECT COUNT(*) FROM {}", quoted_table);
        let row_count = value_as_u64(self.store.execute_query(&count_sql)?.scalar());

        let mut statistics = BTreeMap::new();
        for column in self.store.describe_table(table)? {
            let quoted_column = quote_ident(&column.name);
            let stat = match StatKind::classify(&column.data_type) {
                StatKind::Numeric => match self.numeric_stat(&quoted_table, &quoted_column) {
                    Ok(stat) => stat,
                    Err(e) => {
                        debug!(
                            table,
                            column = %column.name,
                            data_type = %column.data_type,
                            error = %e,
                            "Numeric aggregate rejected, counting distinct values instead"
                        );
                        self.categorical_stat(&quoted_table, &quoted_column)?
                    }
                },
                StatKind::Categorical => self.categorical_stat(&quoted_table, &quoted_column)?,
            };
            statistics.insert(column.name, stat);
        }

        debug!(table, row_count, columns = statistics.len(), "Computed table stats");
        Ok((row_count, statistics))
    }

    fn numeric_stat(
        &self,
        quoted_table: &str,
        quoted_column: &str,
    ) -> std::result::Result<ColumnStat, StoreError> {
        let sql = format!(
            "SELECT MIN({col}), MAX({col}), AVG({col}) FROM {table}",
            col = quoted_column,
            table = quoted_table
        );
        let result = self.store.execute_query(&sql)?;
        let row = result.rows.first();
        let cell = |idx: usize| {
            row.and_then(|r| r.get(idx))
                .filter(|v| !v.is_null())
                .cloned()
        };
        Ok(ColumnStat::Numeric {
            min: cell(0),
            max: cell(1),
            avg: value_as_f64(cell(2).as_ref()).map(round2),
        })
    }

    fn categorical_stat(
        &self,
        quoted_table: &str,
        quoted_column: &str,
    ) -> std::result::Result<ColumnStat, StoreError> {
        let sql = format!(
            "SELECT COUNT(DISTINCT {}) FROM {}",
            quoted_column, quoted_table
        );
        let result = self.store.execute_query(&sql)?;
        Ok(ColumnStat::Categorical {
            distinct: value_as_u64(result.scalar()),
        })
    }

    /// Columns, row count, bounded sample, and statistics for a validated table
    pub fn profile(&self, table: &str, sample_limit: usize) -> Result<TableProfile> {
        let columns = Catalog::new(self.store).require_table(table)?;
        let sample = self.preview(table, sample_limit)?.to_records();
        let (row_count, statistics) = self.stats(table)?;

        Ok(TableProfile {
            table: table.to_string(),
            columns,
            row_count,
            sample,
            statistics,
        })
    }

    /// Non-null values of one column from the first `scan_limit` rows,
    /// rendered as strings, at most `max_values` of them
    pub fn column_samples(
        &self,
        table: &str,
        column: &str,
        scan_limit: usize,
        max_values: usize,
    ) -> Result<Vec<String>> {
        let preview = self.preview(table, scan_limit)?;
        let Some(idx) = preview.columns.iter().position(|c| c == column) else {
            return Ok(Vec::new());
        };

        Ok(preview
            .rows
            .iter()
            .filter_map(|row| row.get(idx))
            .filter(|v| !v.is_null())
            .map(render_value)
            .take(max_values)
            .collect())
    }
}

/// Render a cell the way a person would type it
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_numeric_types() {
        for ty in ["INTEGER", "BIGINT", "real", "Float", "DOUBLE", "SMALLINT", "HUGEINT"] {
            assert_eq!(StatKind::classify(ty), StatKind::Numeric, "{}", ty);
        }
    }

    #[test]
    fn test_classify_categorical_types() {
        for ty in ["VARCHAR", "TEXT", "DATE", "BOOLEAN", "", "TIMESTAMP"] {
            assert_eq!(StatKind::classify(ty), StatKind::Categorical, "{}", ty);
        }
    }

    #[test]
    fn test_classify_non_scalar_types_with_numeric_markers() {
        for ty in [
            "INTEGER[]",
            "DOUBLE[3]",
            "interval",
            "STRUCT(a INTEGER, b VARCHAR)",
            "MAP(VARCHAR, BIGINT)",
            "UNION(n INTEGER, s VARCHAR)",
            "POINT",
        ] {
            assert_eq!(StatKind::classify(ty), StatKind::Categorical, "{}", ty);
        }
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(79250.0), 79250.0);
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235), 1.24);
        assert_eq!(round2(2.0 / 3.0), 0.67);
    }

    #[test]
    fn test_round2_half_up_on_decimal_form() {
        assert_eq!(round2(1.005), 1.01);
        assert_eq!(round2(2.675), 2.68);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-1.005), -1.01);
        assert_eq!(round2(-2.344), -2.34);
        assert_eq!(round2(12.5), 12.5);
        assert!(round2(f64::NAN).is_nan());
    }

    /// Store with one INTEGER column whose numeric aggregate is rejected
    struct RejectingAggregateStore;

    impl Store for RejectingAggregateStore {
        fn list_tables(&self) -> std::result::Result<Vec<String>, StoreError> {
            Ok(vec!["t".to_string()])
        }

        fn describe_table(
            &self,
            _table: &str,
        ) -> std::result::Result<Vec<crate::types::ColumnMeta>, StoreError> {
            Ok(vec![crate::types::ColumnMeta::new("odd", "INTEGER")])
        }

        fn execute_query(&self, sql: &str) -> std::result::Result<QueryResult, StoreError> {
            if sql.starts_with("SELECT MIN") {
                return Err(StoreError::Query {
                    sql: sql.to_string(),
                    message: "Binder Error: No function matches".to_string(),
                });
            }
            let cell = if sql.contains("DISTINCT") { json!(3) } else { json!(7) };
            Ok(QueryResult::new(vec!["n".to_string()], vec![vec![cell]]))
        }
    }

    #[test]
    fn test_rejected_numeric_aggregate_falls_back_to_distinct_count() {
        let (row_count, stats) = Profiler::new(&RejectingAggregateStore).stats("t").unwrap();
        assert_eq!(row_count, 7);
        assert_eq!(stats["odd"], ColumnStat::Categorical { distinct: 3 });
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&json!("Austin")), "Austin");
        assert_eq!(render_value(&json!(42)), "42");
        assert_eq!(render_value(&json!(true)), "true");
    }
}
