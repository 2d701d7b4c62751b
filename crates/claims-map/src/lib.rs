//! Column-to-field mapping suggestions for claims files.
//!
//! Given a target field layout and a source table, the engine proposes one
//! source column per field from name similarity, recognized code shapes
//! (ICD, CPT, NPI, ZIP), and a coarse type guess over a small value sample.
//! Suggestions then flow through [`MappingReview`] and can be stored with
//! [`MappingRepository`].
//!
//! # Example
//!
//! ```
//! use claims_map::{InMemoryTable, suggest_mapping};
//! use claims_model::TargetLayout;
//!
//! let layout = TargetLayout::from_names([("NPI", "")]);
//! let table = InMemoryTable::new().with_values("NPI", ["1234567890"]);
//!
//! let suggestions = suggest_mapping(&layout, &table, 0.6);
//! assert_eq!(suggestions.get("NPI").map(|s| s.confidence_percent), Some(125.0));
//! ```

#![deny(unsafe_code)]

pub mod cache;
pub mod engine;
pub mod error;
pub mod guess;
pub mod patterns;
pub mod repository;
pub mod review;
pub mod sample;
pub mod score;
pub mod similarity;

pub use cache::{
    CacheKey, DEFAULT_CACHE_CAPACITY, LayoutFingerprint, SourceFingerprint, SuggestionCache,
};
pub use engine::{DEFAULT_THRESHOLD, EngineOptions, MappingEngine, suggest_mapping};
pub use error::{MappingError, Result};
pub use guess::{classify_value, guess_type};
pub use patterns::{CodePattern, detect_pattern};
pub use repository::{MappingMetadata, MappingRepository, StoredMappingConfig};
pub use review::{FieldStatus, MappingReview, ReviewIssue, ReviewSummary};
pub use sample::{
    ColumnProfile, DEFAULT_SAMPLE_SIZE, InMemoryTable, SampleSource, profile_columns,
};
pub use score::{ColumnScore, ScoreComponent, score_column};
pub use similarity::{name_similarity, sequence_ratio};
