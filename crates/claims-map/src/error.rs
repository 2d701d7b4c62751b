//! Error types for mapping review operations.
//!
//! Suggestion itself never fails; these errors come from reviewer actions
//! that name fields or columns that do not exist.

use thiserror::Error;

/// Errors from mapping review operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// Target field not present in the layout.
    #[error("Field not found in layout: {0}")]
    FieldNotFound(String),
    /// Column not present in the source table.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),
    /// Field has no engine suggestion to accept.
    #[error("No suggestion for field: {0}")]
    NoSuggestion(String),
}

pub type Result<T> = std::result::Result<T, MappingError>;
