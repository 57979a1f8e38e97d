//! Assistant facade - the operations offered to the request layer
//!
//! Every call reads the store fresh; nothing is cached between calls.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::chat::{self, Intent};
use crate::docs;
use crate::error::Result;
use crate::facts::{FactExtractor, FactReport, FactTarget};
use crate::profile::{Profiler, DEFAULT_SAMPLE_LIMIT};
use crate::store::Store;
use crate::translate::{Translation, Translator};
use crate::types::{ColumnMeta, DatabaseStats, TableProfile};

/// Rows previewed when documenting a table
const TABLE_DOC_PREVIEW: usize = 3;
/// Rows scanned for column examples
const COLUMN_DOC_SCAN: usize = 20;
/// Column examples handed to the generator
const COLUMN_DOC_VALUES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantConfig {
    /// Sample rows in a profile
    pub sample_limit: usize,
    pub target: FactTarget,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            target: FactTarget::default(),
        }
    }
}

/// Chat answer plus the intent that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatAnswer {
    pub intent: Intent,
    pub answer: String,
}

pub struct Assistant<S: Store> {
    store: S,
    config: AssistantConfig,
}

impl<S: Store> Assistant<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, AssistantConfig::default())
    }

    pub fn with_config(store: S, config: AssistantConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    fn catalog(&self) -> Catalog<'_, S> {
        Catalog::new(&self.store)
    }

    fn profiler(&self) -> Profiler<'_, S> {
        Profiler::new(&self.store)
    }

    pub fn list_tables(&self) -> Result<Vec<String>> {
        self.catalog().list_tables()
    }

    pub fn extract_metadata(&self) -> Result<BTreeMap<String, Vec<ColumnMeta>>> {
        self.catalog().extract_metadata()
    }

    pub fn database_stats(&self) -> Result<DatabaseStats> {
        self.catalog().database_stats()
    }

    pub fn schema_description(&self) -> Result<String> {
        self.catalog().schema_description()
    }

    /// Full profile of a table; unknown tables are `TableNotFound`
    pub fn profile(&self, table: &str) -> Result<TableProfile> {
        info!(table, "Profiling table");
        self.profiler().profile(table, self.config.sample_limit)
    }

    pub fn facts(&self) -> FactReport {
        FactExtractor::with_target(&self.store, self.config.target.clone()).extract()
    }

    pub fn chat(&self, question: &str) -> ChatAnswer {
        let report = self.facts();
        let intent = chat::classify(question);
        debug!(
            intent = intent.as_str(),
            degraded = ?report.degraded,
            "Routed chat question"
        );
        ChatAnswer {
            intent,
            answer: chat::render(intent, &report.facts),
        }
    }

    pub fn chat_answer(&self, question: &str) -> String {
        self.chat(question).answer
    }

    pub fn translate(&self, text: &str) -> Result<Translation> {
        let schema = self.schema_description()?;
        let translation = Translator::new(self.config.target.clone()).translate(text, &schema);
        debug!(shape = translation.shape.as_str(), sql = %translation.sql, "Translated request");
        Ok(translation)
    }

    pub fn translate_to_query(&self, text: &str) -> Result<String> {
        Ok(self.translate(text)?.sql)
    }

    pub fn document_table(&self, table: &str) -> Result<String> {
        let columns = self.catalog().require_table(table)?;
        let names: Vec<String> = columns.into_iter().map(|c| c.name).collect();
        let sample = self.profiler().preview(table, TABLE_DOC_PREVIEW)?.to_records();
        Ok(docs::describe_table(table, &names, &sample))
    }

    pub fn document_column(&self, table: &str, column: &str) -> Result<String> {
        let meta = self.catalog().require_column(table, column)?;
        let samples =
            self.profiler()
                .column_samples(table, column, COLUMN_DOC_SCAN, COLUMN_DOC_VALUES)?;
        Ok(docs::describe_column(table, column, &meta.data_type, &samples))
    }
}
