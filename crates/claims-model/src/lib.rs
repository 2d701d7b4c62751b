//! Data model for mapping claims files onto a fixed field layout.

pub mod error;
pub mod layout;
pub mod mapping;
pub mod suggestion;
pub mod value;

pub use error::{ModelError, Result};
pub use layout::{FieldUsage, TargetField, TargetLayout};
pub use mapping::{FieldMapping, MappingConfig, MappingMode};
pub use suggestion::{
    ConfidenceLevel, ConfidenceThresholds, SuggestionEntry, SuggestionOrigin, SuggestionSet,
    confidence_percent,
};
pub use value::ValueType;
