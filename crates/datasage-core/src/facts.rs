//! Fact extraction for the chat router
//!
//! Extraction never fails. Each sub-fact is computed on its own; when one
//! query errors (missing column, store hiccup) that fact keeps its default
//! and is recorded as degraded so callers and tests can see what was lost.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::warn;

use crate::store::{quote_ident, value_as_u64, Store, StoreError};
use crate::types::ChatFacts;

/// Number of region values reported in `top_states`
pub const TOP_REGION_LIMIT: usize = 5;

/// Which table and dimension columns the facts describe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactTarget {
    pub table: String,
    pub region_column: String,
    pub locality_column: String,
}

impl Default for FactTarget {
    fn default() -> Self {
        Self {
            table: "customers".to_string(),
            region_column: "state".to_string(),
            locality_column: "city".to_string(),
        }
    }
}

/// One independently computed piece of `ChatFacts`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Fact {
    Tables,
    CustomerCount,
    CustomerStates,
    CustomerCities,
    TopStates,
}

/// Facts plus a record of which sub-facts fell back to defaults
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactReport {
    pub facts: ChatFacts,
    /// Whether the designated table was listed by the store
    pub target_present: bool,
    pub degraded: BTreeSet<Fact>,
}

impl FactReport {
    pub fn is_degraded(&self, fact: Fact) -> bool {
        self.degraded.contains(&fact)
    }

    pub fn is_complete(&self) -> bool {
        self.degraded.is_empty()
    }

    fn record<T>(&mut self, fact: Fact, result: Result<T, StoreError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(fact = ?fact, error = %e, "Fact extraction degraded");
                self.degraded.insert(fact);
                None
            }
        }
    }
}

pub struct FactExtractor<'a, S: Store + ?Sized> {
    store: &'a S,
    target: FactTarget,
}

impl<'a, S: Store + ?Sized> FactExtractor<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self::with_target(store, FactTarget::default())
    }

    pub fn with_target(store: &'a S, target: FactTarget) -> Self {
        Self { store, target }
    }

    /// Facts for the designated table; absent tables or columns degrade
    /// the affected fields to zero/empty instead of failing.
    pub fn extract(&self) -> FactReport {
        let mut report = FactReport::default();

        let Some(tables) = report.record(Fact::Tables, self.store.list_tables()) else {
            return report;
        };
        report.target_present = tables.iter().any(|t| *t == self.target.table);
        report.facts.tables = tables;

        if !report.target_present {
            return report;
        }

        let table = quote_ident(&self.target.table);
        let region = quote_ident(&self.target.region_column);
        let locality = quote_ident(&self.target.locality_column);

        let count = self.count(&format!("SELECT COUNT(*) FROM {}", table));
        if let Some(n) = report.record(Fact::CustomerCount, count) {
            report.facts.customer_count = n;
        }

        let states = self.count(&format!(
            "SELECT COUNT(DISTINCT {col}) FROM {table} WHERE {col} IS NOT NULL",
            col = region,
            table = table
        ));
        if let Some(n) = report.record(Fact::CustomerStates, states) {
            report.facts.customer_states = n;
        }

        let cities = self.count(&format!(
            "SELECT COUNT(DISTINCT {col}) FROM {table} WHERE {col} IS NOT NULL",
            col = locality,
            table = table
        ));
        if let Some(n) = report.record(Fact::CustomerCities, cities) {
            report.facts.customer_cities = n;
        }

        let top = self.top_regions(&table, &region);
        if let Some(values) = report.record(Fact::TopStates, top) {
            report.facts.top_states = values;
        }

        report
    }

    fn count(&self, sql: &str) -> Result<u64, StoreError> {
        Ok(value_as_u64(self.store.execute_query(sql)?.scalar()))
    }

    /// Most frequent region values; equal counts order alphabetically
    fn top_regions(&self, table: &str, region: &str) -> Result<Vec<String>, StoreError> {
        let sql = format!(
            "SELECT {col} FROM {table} WHERE {col} IS NOT NULL \
             GROUP BY {col} ORDER BY COUNT(*) DESC, {col} ASC LIMIT {limit}",
            col = region,
            table = table,
            limit = TOP_REGION_LIMIT
        );
        let result = self.store.execute_query(&sql)?;
        Ok(result
            .rows
            .iter()
            .filter_map(|row| row.first())
            .map(crate::profile::render_value)
            .collect())
    }
}
