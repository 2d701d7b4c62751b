//! Mapping suggestion engine.
//!
//! For every target field independently, every source column is scored (see
//! [`crate::score`]) and the best column at or above the threshold wins. The
//! assignment is greedy per field: the same column may win several fields,
//! and no global matching is attempted.

use std::cmp::Ordering;

use claims_model::{SuggestionEntry, SuggestionSet, TargetField, TargetLayout};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::sample::{ColumnProfile, DEFAULT_SAMPLE_SIZE, SampleSource, profile_columns};
use crate::score::{ColumnScore, score_column};

/// Default minimum raw score for a suggestion.
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// Tunable engine parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Minimum raw score (inclusive). Not validated: values of 1.45 and up
    /// suppress every suggestion, values of 0 and below accept the best
    /// column whatever its quality.
    pub threshold: f64,
    /// Leading non-null values sampled per column.
    pub sample_size: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

impl EngineOptions {
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }
}

/// Suggests a source column for every target field using default sampling.
///
/// Pure function of its inputs: identical inputs give identical output.
pub fn suggest_mapping<S: SampleSource + ?Sized>(
    layout: &TargetLayout,
    source: &S,
    threshold: f64,
) -> SuggestionSet {
    MappingEngine::new(EngineOptions::default().with_threshold(threshold)).suggest(layout, source)
}

/// Engine for suggesting source columns for target layout fields.
///
/// # Example
///
/// ```
/// use claims_map::{EngineOptions, InMemoryTable, MappingEngine};
/// use claims_model::TargetLayout;
///
/// let engine = MappingEngine::new(EngineOptions::default().with_threshold(0.6));
/// let layout = TargetLayout::from_names([("NPI", ""), ("Zip", "")]);
/// let table = InMemoryTable::new()
///     .with_values("PROV_NPI", ["1234567890"])
///     .with_values("NPI", ["1234567890"]);
///
/// let suggestions = engine.suggest(&layout, &table);
/// let npi = suggestions.get("NPI").expect("NPI is suggested");
/// assert_eq!(npi.source_column, "NPI");
/// assert_eq!(npi.confidence_percent, 125.0);
/// assert!(!suggestions.contains("Zip"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MappingEngine {
    options: EngineOptions,
}

impl MappingEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn threshold(&self) -> f64 {
        self.options.threshold
    }

    /// Samples `source` the way [`MappingEngine::suggest`] does.
    pub fn profile<S: SampleSource + ?Sized>(&self, source: &S) -> Vec<ColumnProfile> {
        profile_columns(source, self.options.sample_size)
    }

    /// Suggests the best source column for each field of `layout`.
    ///
    /// Fields whose best score stays below the threshold are absent from the
    /// result. With duplicate field names the later field's entry replaces
    /// the earlier one.
    pub fn suggest<S: SampleSource + ?Sized>(
        &self,
        layout: &TargetLayout,
        source: &S,
    ) -> SuggestionSet {
        let profiles = self.profile(source);
        self.suggest_profiled(layout, &profiles)
    }

    /// Same as [`MappingEngine::suggest`] over already sampled columns.
    pub fn suggest_profiled(
        &self,
        layout: &TargetLayout,
        profiles: &[ColumnProfile],
    ) -> SuggestionSet {
        let mut suggestions = SuggestionSet::new();
        for field in layout.iter() {
            if let Some((column, score)) = self.best_column(field, profiles) {
                debug!(
                    field = %field.name,
                    column = %column.name,
                    score = score.total,
                    "suggested column"
                );
                suggestions.insert(SuggestionEntry::new(
                    field.name.clone(),
                    column.name.clone(),
                    score.total,
                ));
            }
        }
        info!(
            fields = layout.len(),
            columns = profiles.len(),
            suggested = suggestions.len(),
            threshold = self.options.threshold,
            "mapping suggestions computed"
        );
        suggestions
    }

    /// The first column reaching the threshold, replaced only by a column
    /// with a strictly greater score.
    fn best_column<'p>(
        &self,
        field: &TargetField,
        profiles: &'p [ColumnProfile],
    ) -> Option<(&'p ColumnProfile, ColumnScore)> {
        let mut best: Option<(&ColumnProfile, ColumnScore)> = None;
        for column in profiles {
            let score = score_column(field, column);
            trace!(
                field = %field.name,
                column = %column.name,
                name_score = score.name_score,
                total = score.total,
                "scored pair"
            );
            if score.total < self.options.threshold {
                continue;
            }
            let replace = match &best {
                Some((_, current)) => score.total > current.total,
                None => true,
            };
            if replace {
                best = Some((column, score));
            }
        }
        best
    }

    /// Scores a single field against a single profiled column.
    pub fn score(&self, field: &TargetField, column: &ColumnProfile) -> ColumnScore {
        score_column(field, column)
    }

    /// Scores every source column against `field`, highest first.
    ///
    /// Equal scores keep table order. The threshold is not applied.
    pub fn score_all_for_field<S: SampleSource + ?Sized>(
        &self,
        field: &TargetField,
        source: &S,
    ) -> Vec<(String, ColumnScore)> {
        let mut scores: Vec<(String, ColumnScore)> = self
            .profile(source)
            .into_iter()
            .map(|column| {
                let score = score_column(field, &column);
                (column.name, score)
            })
            .collect();
        scores.sort_by(|a, b| b.1.total.partial_cmp(&a.1.total).unwrap_or(Ordering::Equal));
        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::InMemoryTable;

    fn npi_values() -> [&'static str; 5] {
        [
            "1234567890",
            "1234567891",
            "1234567892",
            "1234567893",
            "1234567894",
        ]
    }

    #[test]
    fn exact_name_match_is_suggested_unclamped() {
        let layout = TargetLayout::from_names([("NPI", "")]);
        let table = InMemoryTable::new().with_values("NPI", npi_values());

        let suggestions = suggest_mapping(&layout, &table, DEFAULT_THRESHOLD);
        let entry = suggestions.get("NPI").expect("NPI suggested");
        assert_eq!(entry.source_column, "NPI");
        assert!((entry.raw_score - 1.25).abs() < 1e-9);
        assert_eq!(entry.confidence_percent, 125.0);
    }

    #[test]
    fn first_column_keeps_win_on_ties() {
        let layout = TargetLayout::from_names([("NPI", "")]);
        let table = InMemoryTable::new()
            .with_values("npi", npi_values())
            .with_values("NPI", npi_values());

        let suggestions = suggest_mapping(&layout, &table, DEFAULT_THRESHOLD);
        assert_eq!(
            suggestions.get("NPI").map(|e| e.source_column.as_str()),
            Some("npi")
        );
    }

    #[test]
    fn threshold_at_max_score_suppresses_everything() {
        let layout = TargetLayout::from_names([("NPI", "")]);
        let table = InMemoryTable::new().with_values("NPI", npi_values());
        assert!(suggest_mapping(&layout, &table, 1.45).is_empty());
    }

    #[test]
    fn non_positive_threshold_always_picks_best_name() {
        let layout = TargetLayout::from_names([("Claim Amount", "")]);
        let table = InMemoryTable::new()
            .with_values("xyz", ["1/2/2020"])
            .with_values("Claim Amt", ["1/2/2020"]);
        let suggestions = suggest_mapping(&layout, &table, 0.0);
        assert_eq!(
            suggestions.get("Claim Amount").map(|e| e.source_column.as_str()),
            Some("Claim Amt")
        );

        let zero_scores = InMemoryTable::new().with_values("xyz", ["1/2/2020"]);
        let suggestions = suggest_mapping(&layout, &zero_scores, 0.0);
        assert_eq!(
            suggestions.get("Claim Amount").map(|e| e.raw_score),
            Some(0.0)
        );
    }

    #[test]
    fn score_all_sorts_descending() {
        let field = TargetField::new("Zip", "");
        let table = InMemoryTable::new()
            .with_values("Notes", ["hello"])
            .with_values("ZIP5", ["30301"]);
        let engine = MappingEngine::default();
        let scores = engine.score_all_for_field(&field, &table);
        assert_eq!(scores[0].0, "ZIP5");
        assert_eq!(scores[1].0, "Notes");
    }

    #[test]
    fn sample_size_option_limits_values() {
        let table = InMemoryTable::new().with_values("A", ["1", "2", "3"]);
        let engine = MappingEngine::new(EngineOptions::default().with_sample_size(2));
        let profiles = engine.profile(&table);
        assert_eq!(profiles[0].samples, vec!["1", "2"]);
    }
}
