//! Errors surfaced to callers of the assistant

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Column not found: {table}.{column}")]
    ColumnNotFound { table: String, column: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AssistantError {
    /// Whether this is a missing table or column rather than a store failure
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AssistantError::TableNotFound(_) | AssistantError::ColumnNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AssistantError>;
