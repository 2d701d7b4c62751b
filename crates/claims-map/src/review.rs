//! Review state for turning suggestions into a confirmed mapping.
//!
//! Suggestions are only proposals. A reviewer accepts, rejects, or overrides
//! them field by field, and [`MappingReview::validate`] reports what still
//! blocks processing before the result is frozen into a [`MappingConfig`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use claims_model::{
    FieldMapping, MappingConfig, MappingMode, SuggestionSet, TargetLayout,
};
use rapidfuzz::distance::jaro_winkler;
use tracing::debug;

use crate::error::{MappingError, Result};

/// Minimum Jaro-Winkler similarity for a "did you mean" column hint.
const CLOSEST_COLUMN_MIN: f64 = 0.7;

#[derive(Debug, Clone, PartialEq)]
enum Decision {
    Accepted {
        column: String,
        confidence_percent: f64,
    },
    Overridden {
        column: String,
    },
    Rejected,
}

/// Review status of one target field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    /// The engine's suggestion was accepted.
    Accepted,
    /// A reviewer picked the column by hand.
    Overridden,
    /// A suggestion exists but has not been decided on.
    Suggested,
    /// The reviewer declined any mapping.
    Rejected,
    /// No suggestion and no decision.
    Unmapped,
}

impl FieldStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldStatus::Accepted => "accepted",
            FieldStatus::Overridden => "overridden",
            FieldStatus::Suggested => "suggested",
            FieldStatus::Rejected => "rejected",
            FieldStatus::Unmapped => "unmapped",
        }
    }
}

impl fmt::Display for FieldStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Problem found by [`MappingReview::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewIssue {
    /// A mandatory field has no accepted or overridden column.
    RequiredFieldUnmapped { field: String },
    /// A mapped column is not present in the source table.
    ColumnNotFound {
        field: String,
        column: String,
        closest: Option<String>,
    },
    /// One column feeds several fields. Allowed, reported for visibility.
    ColumnReused { column: String, fields: Vec<String> },
}

impl ReviewIssue {
    /// True for issues that should stop processing.
    pub fn is_blocking(&self) -> bool {
        !matches!(self, ReviewIssue::ColumnReused { .. })
    }
}

impl fmt::Display for ReviewIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewIssue::RequiredFieldUnmapped { field } => {
                write!(f, "required field '{field}' is not mapped")
            }
            ReviewIssue::ColumnNotFound {
                field,
                column,
                closest,
            } => {
                write!(f, "field '{field}' maps to missing column '{column}'")?;
                if let Some(closest) = closest {
                    write!(f, " (did you mean '{closest}'?)")?;
                }
                Ok(())
            }
            ReviewIssue::ColumnReused { column, fields } => {
                write!(f, "column '{column}' is used by {}", fields.join(", "))
            }
        }
    }
}

/// Summary counts of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewSummary {
    pub total_fields: usize,
    /// Fields with an accepted or overridden column.
    pub mapped: usize,
    /// Fields with an undecided suggestion.
    pub suggested: usize,
    pub required_total: usize,
    pub required_mapped: usize,
}

/// Review of one suggestion set against one source table.
#[derive(Debug, Clone)]
pub struct MappingReview {
    layout: TargetLayout,
    suggestions: SuggestionSet,
    source_columns: Vec<String>,
    decisions: BTreeMap<String, Decision>,
}

impl MappingReview {
    pub fn new(
        layout: TargetLayout,
        suggestions: SuggestionSet,
        source_columns: Vec<String>,
    ) -> Self {
        Self {
            layout,
            suggestions,
            source_columns,
            decisions: BTreeMap::new(),
        }
    }

    pub fn layout(&self) -> &TargetLayout {
        &self.layout
    }

    pub fn suggestions(&self) -> &SuggestionSet {
        &self.suggestions
    }

    pub fn source_columns(&self) -> &[String] {
        &self.source_columns
    }

    fn require_field(&self, field: &str) -> Result<()> {
        if self.layout.field(field).is_some() {
            Ok(())
        } else {
            Err(MappingError::FieldNotFound(field.to_string()))
        }
    }

    /// Accepts the engine's suggestion for `field`.
    pub fn accept(&mut self, field: &str) -> Result<()> {
        self.require_field(field)?;
        let entry = self
            .suggestions
            .get(field)
            .ok_or_else(|| MappingError::NoSuggestion(field.to_string()))?;
        let decision = Decision::Accepted {
            column: entry.source_column.clone(),
            confidence_percent: entry.confidence_percent,
        };
        self.decisions.insert(field.to_string(), decision);
        Ok(())
    }

    /// Accepts every suggestion that has no decision yet. Returns the number
    /// of fields accepted.
    pub fn accept_all(&mut self) -> usize {
        let pending: Vec<String> = self
            .suggestions
            .iter()
            .filter(|entry| {
                self.layout.field(&entry.target_field).is_some()
                    && !self.decisions.contains_key(&entry.target_field)
            })
            .map(|entry| entry.target_field.clone())
            .collect();
        let mut accepted = 0;
        for field in pending {
            if self.accept(&field).is_ok() {
                accepted += 1;
            }
        }
        debug!(accepted, "accepted pending suggestions");
        accepted
    }

    /// Marks `field` as deliberately left unmapped.
    pub fn reject(&mut self, field: &str) -> Result<()> {
        self.require_field(field)?;
        self.decisions.insert(field.to_string(), Decision::Rejected);
        Ok(())
    }

    /// Maps `field` to `column` by hand, replacing any earlier decision.
    pub fn override_with(&mut self, field: &str, column: &str) -> Result<()> {
        self.require_field(field)?;
        if !self.source_columns.iter().any(|c| c == column) {
            return Err(MappingError::ColumnNotFound(column.to_string()));
        }
        self.decisions.insert(
            field.to_string(),
            Decision::Overridden {
                column: column.to_string(),
            },
        );
        Ok(())
    }

    /// Forgets the decision for `field`. Returns `false` if there was none.
    pub fn clear(&mut self, field: &str) -> bool {
        self.decisions.remove(field).is_some()
    }

    /// Replays the decisions of a stored mapping.
    ///
    /// Columns are not checked here so that stale templates surface through
    /// [`MappingReview::validate`]. Fields unknown to the layout are skipped.
    /// Returns the number of fields applied.
    pub fn apply_config(&mut self, config: &MappingConfig) -> usize {
        let mut applied = 0;
        for mapping in &config.mappings {
            if self.layout.field(&mapping.target_field).is_none() {
                continue;
            }
            let decision = match (mapping.mode, mapping.confidence_percent) {
                (MappingMode::Algorithmic, Some(confidence_percent)) => Decision::Accepted {
                    column: mapping.source_column.clone(),
                    confidence_percent,
                },
                _ => Decision::Overridden {
                    column: mapping.source_column.clone(),
                },
            };
            self.decisions.insert(mapping.target_field.clone(), decision);
            applied += 1;
        }
        for field in &config.unmapped_fields {
            if self.layout.field(field).is_some() && !self.decisions.contains_key(field) {
                self.decisions.insert(field.clone(), Decision::Rejected);
                applied += 1;
            }
        }
        applied
    }

    pub fn status(&self, field: &str) -> FieldStatus {
        match self.decisions.get(field) {
            Some(Decision::Accepted { .. }) => FieldStatus::Accepted,
            Some(Decision::Overridden { .. }) => FieldStatus::Overridden,
            Some(Decision::Rejected) => FieldStatus::Rejected,
            None if self.suggestions.contains(field) => FieldStatus::Suggested,
            None => FieldStatus::Unmapped,
        }
    }

    /// The confirmed column for `field`, if any.
    pub fn mapped_column(&self, field: &str) -> Option<&str> {
        match self.decisions.get(field)? {
            Decision::Accepted { column, .. } | Decision::Overridden { column } => {
                Some(column.as_str())
            }
            Decision::Rejected => None,
        }
    }

    /// Distinct field names in layout order.
    fn field_names(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.layout
            .iter()
            .map(|f| f.name.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }

    pub fn validate(&self) -> Vec<ReviewIssue> {
        let mut issues = Vec::new();

        for field in self.layout.required_fields() {
            if self.mapped_column(&field.name).is_none() {
                issues.push(ReviewIssue::RequiredFieldUnmapped {
                    field: field.name.clone(),
                });
            }
        }

        let mut by_column: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for field in self.field_names() {
            let Some(column) = self.mapped_column(field) else {
                continue;
            };
            if !self.source_columns.iter().any(|c| c == column) {
                issues.push(ReviewIssue::ColumnNotFound {
                    field: field.to_string(),
                    column: column.to_string(),
                    closest: self.closest_column(column),
                });
            }
            by_column.entry(column).or_default().push(field.to_string());
        }

        for (column, fields) in by_column {
            if fields.len() > 1 {
                issues.push(ReviewIssue::ColumnReused {
                    column: column.to_string(),
                    fields,
                });
            }
        }

        issues
    }

    /// Source column most similar to `column`, if any is close enough.
    pub fn closest_column(&self, column: &str) -> Option<String> {
        let needle = column.to_lowercase();
        self.source_columns
            .iter()
            .map(|candidate| {
                let score =
                    jaro_winkler::similarity(needle.chars(), candidate.to_lowercase().chars());
                (candidate, score)
            })
            .filter(|(_, score)| *score >= CLOSEST_COLUMN_MIN)
            .fold(None::<(&String, f64)>, |best, (candidate, score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((candidate, score)),
            })
            .map(|(candidate, _)| candidate.clone())
    }

    pub fn summary(&self) -> ReviewSummary {
        let names = self.field_names();
        let required: BTreeSet<&str> = self
            .layout
            .required_fields()
            .into_iter()
            .map(|f| f.name.as_str())
            .collect();

        ReviewSummary {
            total_fields: names.len(),
            mapped: names
                .iter()
                .filter(|name| self.mapped_column(name).is_some())
                .count(),
            suggested: names
                .iter()
                .filter(|name| self.status(name) == FieldStatus::Suggested)
                .count(),
            required_total: required.len(),
            required_mapped: required
                .iter()
                .filter(|name| self.mapped_column(name).is_some())
                .count(),
        }
    }

    /// Freezes the confirmed decisions. Undecided suggestions are not
    /// included; call [`MappingReview::accept_all`] first to keep them.
    pub fn to_config(
        &self,
        layout_name: impl Into<String>,
        source_name: impl Into<String>,
    ) -> MappingConfig {
        let mut mappings = Vec::new();
        let mut unmapped_fields = Vec::new();
        for field in self.field_names() {
            match self.decisions.get(field) {
                Some(Decision::Accepted {
                    column,
                    confidence_percent,
                }) => mappings.push(FieldMapping {
                    target_field: field.to_string(),
                    source_column: column.clone(),
                    confidence_percent: Some(*confidence_percent),
                    mode: MappingMode::Algorithmic,
                }),
                Some(Decision::Overridden { column }) => mappings.push(FieldMapping {
                    target_field: field.to_string(),
                    source_column: column.clone(),
                    confidence_percent: None,
                    mode: MappingMode::Manual,
                }),
                Some(Decision::Rejected) | None => unmapped_fields.push(field.to_string()),
            }
        }
        MappingConfig {
            layout_name: layout_name.into(),
            source_name: source_name.into(),
            mappings,
            unmapped_fields,
        }
    }
}
