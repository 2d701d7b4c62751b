//! Mapping suggestion types produced by the suggestion engine.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};

/// Where a suggestion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionOrigin {
    #[default]
    Algorithmic,
}

/// The winning source column for one target field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionEntry {
    pub target_field: String,
    pub source_column: String,
    /// Unclamped sum of name similarity and heuristic boosts.
    pub raw_score: f64,
    /// `raw_score * 100`, rounded to two decimals. Not a probability.
    pub confidence_percent: f64,
    #[serde(default)]
    pub origin: SuggestionOrigin,
}

impl SuggestionEntry {
    pub fn new(
        target_field: impl Into<String>,
        source_column: impl Into<String>,
        raw_score: f64,
    ) -> Self {
        Self {
            target_field: target_field.into(),
            source_column: source_column.into(),
            raw_score,
            confidence_percent: confidence_percent(raw_score),
            origin: SuggestionOrigin::Algorithmic,
        }
    }
}

/// Converts a raw score to a percentage rounded to two decimals.
///
/// Rounding works on the exact binary value with ties to even, so
/// `0.65625` becomes `65.62`.
pub fn confidence_percent(raw_score: f64) -> f64 {
    let percent = raw_score * 100.0;
    format!("{percent:.2}").parse().unwrap_or(percent)
}

/// Confidence level categories for suggestion quality assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    /// Uncertain; needs manual verification.
    Low,
    /// Reasonable; should be reviewed.
    Medium,
    /// Near-certain.
    High,
}

impl ConfidenceLevel {
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::High => "high confidence - likely correct",
            Self::Medium => "medium confidence - should review",
            Self::Low => "low confidence - needs verification",
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// Raw-score boundaries between confidence levels.
///
/// Raw scores are unclamped, so `high` may sit at or above 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceThresholds {
    /// Minimum raw score for high-quality matches (default: 1.0).
    pub high: f64,
    /// Minimum raw score for medium-quality matches (default: 0.8).
    pub medium: f64,
    /// Minimum raw score to be categorized at all (default: 0.6).
    pub low: f64,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high: 1.0,
            medium: 0.8,
            low: 0.6,
        }
    }
}

impl ConfidenceThresholds {
    #[must_use]
    pub fn strict() -> Self {
        Self {
            high: 1.15,
            medium: 0.95,
            low: 0.75,
        }
    }

    #[must_use]
    pub fn relaxed() -> Self {
        Self {
            high: 0.9,
            medium: 0.7,
            low: 0.5,
        }
    }

    /// Categorizes a raw score. Returns `None` below the low threshold.
    #[must_use]
    pub fn categorize(&self, raw_score: f64) -> Option<ConfidenceLevel> {
        if raw_score >= self.high {
            Some(ConfidenceLevel::High)
        } else if raw_score >= self.medium {
            Some(ConfidenceLevel::Medium)
        } else if raw_score >= self.low {
            Some(ConfidenceLevel::Low)
        } else {
            None
        }
    }
}

/// Target field name to winning suggestion. Fields without a qualifying
/// candidate are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuggestionSet {
    entries: BTreeMap<String, SuggestionEntry>,
}

impl SuggestionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry keyed by its target field. A later entry for the
    /// same field replaces the earlier one.
    pub fn insert(&mut self, entry: SuggestionEntry) -> Option<SuggestionEntry> {
        self.entries.insert(entry.target_field.clone(), entry)
    }

    pub fn get(&self, target_field: &str) -> Option<&SuggestionEntry> {
        self.entries.get(target_field)
    }

    pub fn contains(&self, target_field: &str) -> bool {
        self.entries.contains_key(target_field)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Values<'_, String, SuggestionEntry> {
        self.entries.values()
    }

    /// Target fields whose suggestion points at `source_column`.
    pub fn fields_for_column(&self, source_column: &str) -> Vec<&str> {
        self.entries
            .values()
            .filter(|e| e.source_column == source_column)
            .map(|e| e.target_field.as_str())
            .collect()
    }

    #[must_use]
    pub fn count_by_level_with(
        &self,
        thresholds: &ConfidenceThresholds,
    ) -> BTreeMap<ConfidenceLevel, usize> {
        let mut counts = BTreeMap::new();
        for entry in self.entries.values() {
            if let Some(level) = thresholds.categorize(entry.raw_score) {
                *counts.entry(level).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Entries at or above `min_level`.
    #[must_use]
    pub fn filter_by_level_with(
        &self,
        min_level: ConfidenceLevel,
        thresholds: &ConfidenceThresholds,
    ) -> Vec<&SuggestionEntry> {
        self.entries
            .values()
            .filter(|e| {
                thresholds
                    .categorize(e.raw_score)
                    .is_some_and(|level| level >= min_level)
            })
            .collect()
    }

    #[must_use]
    pub fn group_by_level_with(
        &self,
        thresholds: &ConfidenceThresholds,
    ) -> BTreeMap<ConfidenceLevel, Vec<&SuggestionEntry>> {
        let mut groups: BTreeMap<ConfidenceLevel, Vec<&SuggestionEntry>> = BTreeMap::new();
        for entry in self.entries.values() {
            if let Some(level) = thresholds.categorize(entry.raw_score) {
                groups.entry(level).or_default().push(entry);
            }
        }
        groups
    }

    #[must_use]
    pub fn min_confidence(&self) -> Option<f64> {
        self.entries
            .values()
            .map(|e| e.raw_score)
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
    }

    #[must_use]
    pub fn max_confidence(&self) -> Option<f64> {
        self.entries
            .values()
            .map(|e| e.raw_score)
            .max_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
    }

    #[must_use]
    pub fn mean_confidence(&self) -> Option<f64> {
        if self.entries.is_empty() {
            return None;
        }
        let sum: f64 = self.entries.values().map(|e| e.raw_score).sum();
        Some(sum / self.entries.len() as f64)
    }
}

impl FromIterator<SuggestionEntry> for SuggestionSet {
    fn from_iter<I: IntoIterator<Item = SuggestionEntry>>(iter: I) -> Self {
        let mut set = SuggestionSet::new();
        for entry in iter {
            set.insert(entry);
        }
        set
    }
}

impl<'a> IntoIterator for &'a SuggestionSet {
    type Item = &'a SuggestionEntry;
    type IntoIter = btree_map::Values<'a, String, SuggestionEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_rounds_to_two_decimals() {
        assert_eq!(confidence_percent(1.25), 125.0);
        assert_eq!(confidence_percent(0.123_456), 12.35);
        assert_eq!(confidence_percent(0.0), 0.0);
    }

    #[test]
    fn confidence_ties_round_to_even() {
        assert_eq!(confidence_percent(0.65625), 65.62);
        assert_eq!(confidence_percent(0.73125), 73.12);
    }

    #[test]
    fn later_insert_replaces_earlier() {
        let mut set = SuggestionSet::new();
        set.insert(SuggestionEntry::new("Zip", "ZIP5", 0.9));
        set.insert(SuggestionEntry::new("Zip", "POSTAL", 0.7));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("Zip").map(|e| e.source_column.as_str()), Some("POSTAL"));
    }

    #[test]
    fn levels_use_raw_score() {
        let thresholds = ConfidenceThresholds::default();
        assert_eq!(thresholds.categorize(1.25), Some(ConfidenceLevel::High));
        assert_eq!(thresholds.categorize(0.85), Some(ConfidenceLevel::Medium));
        assert_eq!(thresholds.categorize(0.6), Some(ConfidenceLevel::Low));
        assert_eq!(thresholds.categorize(0.59), None);
    }

    #[test]
    fn statistics_and_grouping() {
        let set: SuggestionSet = [
            SuggestionEntry::new("NPI", "NPI", 1.25),
            SuggestionEntry::new("Zip", "ZIP5", 0.9),
            SuggestionEntry::new("Postal Code", "ZIP5", 0.65),
        ]
        .into_iter()
        .collect();

        let thresholds = ConfidenceThresholds::default();
        let counts = set.count_by_level_with(&thresholds);
        assert_eq!(counts.get(&ConfidenceLevel::High), Some(&1));
        assert_eq!(counts.get(&ConfidenceLevel::Medium), Some(&1));
        assert_eq!(counts.get(&ConfidenceLevel::Low), Some(&1));
        assert_eq!(
            set.filter_by_level_with(ConfidenceLevel::Medium, &thresholds)
                .len(),
            2
        );
        assert_eq!(set.max_confidence(), Some(1.25));
        assert_eq!(set.min_confidence(), Some(0.65));
        let mean = set.mean_confidence().expect("non-empty set");
        assert!((mean - 2.8 / 3.0).abs() < 1e-12);
        assert_eq!(SuggestionSet::new().mean_confidence(), None);
        assert_eq!(set.fields_for_column("ZIP5"), vec!["Postal Code", "Zip"]);
    }

    #[test]
    fn serializes_as_plain_map() {
        let set: SuggestionSet = [SuggestionEntry::new("NPI", "NPI", 1.25)]
            .into_iter()
            .collect();
        let json = serde_json::to_value(&set).expect("serialize set");
        assert_eq!(json["NPI"]["source_column"], "NPI");
        assert_eq!(json["NPI"]["origin"], "algorithmic");
        let round: SuggestionSet = serde_json::from_value(json).expect("deserialize set");
        assert_eq!(round, set);
    }
}
