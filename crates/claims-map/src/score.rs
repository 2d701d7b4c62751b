//! Scoring of a single (target field, source column) pair.
//!
//! The score is additive: name similarity in `[0, 1]` plus fixed boosts for
//! an example-value hit, a recognized code pattern, and a matching coarse
//! type. Nothing is clamped, so a perfect pair scores 1.45.

use claims_model::{TargetField, ValueType};

use crate::guess::guess_type;
use crate::patterns::{CodePattern, detect_pattern};
use crate::sample::ColumnProfile;
use crate::similarity::name_similarity;

/// Added when the field's example value occurs inside a sampled value.
pub const EXAMPLE_BOOST: f64 = 0.2;
/// Added when the sample contains a recognized code shape.
pub const PATTERN_BOOST: f64 = 0.15;
/// Added when the guessed column type equals the field's expected type.
pub const TYPE_BOOST: f64 = 0.1;

/// Score for a single column-field pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnScore {
    /// Sum of all components.
    pub total: f64,
    pub name_score: f64,
    pub example_boost: f64,
    pub pattern_boost: f64,
    pub type_boost: f64,
    /// Pattern detected in the column sample.
    pub pattern: CodePattern,
    /// Type guessed from the column sample.
    pub guessed_type: ValueType,
    /// Breakdown of score components for explainability.
    pub explanation: Vec<ScoreComponent>,
}

impl ColumnScore {
    /// Human-readable explanation of the score.
    pub fn explain(&self) -> String {
        self.explanation
            .iter()
            .map(|c| format!("{}: {:.0}%", c.name, c.value * 100.0))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A component contributing to the final score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreComponent {
    /// Component name (e.g., "Name similarity").
    pub name: &'static str,
    pub value: f64,
    pub description: String,
}

/// True when `example` is non-empty and occurs, ignoring case, in any sample.
pub fn example_matches(example: &str, samples: &[String]) -> bool {
    if example.is_empty() {
        return false;
    }
    let needle = example.to_lowercase();
    samples
        .iter()
        .any(|sample| sample.to_lowercase().contains(&needle))
}

/// Scores one profiled source column against one target field.
pub fn score_column(field: &TargetField, column: &ColumnProfile) -> ColumnScore {
    let mut components = Vec::new();

    let name_score = name_similarity(&field.name, &column.name);
    components.push(ScoreComponent {
        name: "Name similarity",
        value: name_score,
        description: format!("'{}' vs '{}'", field.name, column.name),
    });

    let example_boost = if example_matches(&field.example, &column.samples) {
        components.push(ScoreComponent {
            name: "Example match",
            value: EXAMPLE_BOOST,
            description: format!("Sample contains example '{}'", field.example),
        });
        EXAMPLE_BOOST
    } else {
        0.0
    };

    let pattern = detect_pattern(&column.samples);
    let pattern_boost = if pattern.is_known() {
        components.push(ScoreComponent {
            name: "Pattern match",
            value: PATTERN_BOOST,
            description: format!("Sample looks like {pattern} codes"),
        });
        PATTERN_BOOST
    } else {
        0.0
    };

    let guessed_type = guess_type(&column.samples);
    let type_boost = if guessed_type == field.expected_type {
        components.push(ScoreComponent {
            name: "Type match",
            value: TYPE_BOOST,
            description: format!("Column values look {guessed_type}"),
        });
        TYPE_BOOST
    } else {
        0.0
    };

    ColumnScore {
        total: name_score + example_boost + pattern_boost + type_boost,
        name_score,
        example_boost,
        pattern_boost,
        type_boost,
        pattern,
        guessed_type,
        explanation: components,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str, samples: &[&str]) -> ColumnProfile {
        ColumnProfile {
            name: name.to_string(),
            samples: samples.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[test]
    fn exact_npi_match_collects_all_numeric_boosts() {
        let field = TargetField::new("NPI", "");
        let column = profile(
            "NPI",
            &["1234567890", "1234567891", "1234567892", "1234567893", "1234567894"],
        );
        let score = score_column(&field, &column);
        assert_eq!(score.name_score, 1.0);
        assert_eq!(score.example_boost, 0.0);
        assert_eq!(score.pattern, CodePattern::Npi);
        assert_eq!(score.pattern_boost, PATTERN_BOOST);
        assert_eq!(score.guessed_type, ValueType::Numeric);
        assert_eq!(score.type_boost, TYPE_BOOST);
        assert!((score.total - 1.25).abs() < 1e-9);
    }

    #[test]
    fn example_match_is_case_insensitive_substring() {
        let samples = vec!["Dr. SMITH, John".to_string()];
        assert!(example_matches("smith", &samples));
        assert!(!example_matches("", &samples));
        assert!(!example_matches("jones", &samples));
    }

    #[test]
    fn example_boost_applies() {
        let field = TargetField::new("Rendering Provider", "smith");
        let column = profile("RENDERING_PROV", &["Dr Smith", "Dr Jones"]);
        let score = score_column(&field, &column);
        assert_eq!(score.example_boost, EXAMPLE_BOOST);
        assert_eq!(score.type_boost, TYPE_BOOST);
        assert_eq!(score.pattern_boost, 0.0);
    }

    #[test]
    fn empty_sample_gets_text_type_boost_only() {
        let field = TargetField::new("Notes", "");
        let column = profile("Comments", &[]);
        let score = score_column(&field, &column);
        assert_eq!(score.pattern, CodePattern::Unknown);
        assert_eq!(score.guessed_type, ValueType::Text);
        assert_eq!(score.type_boost, TYPE_BOOST);
    }

    #[test]
    fn explanation_lists_components() {
        let field = TargetField::new("NPI", "");
        let column = profile("NPI", &["1234567890"]);
        let score = score_column(&field, &column);
        insta::assert_snapshot!(score.explain(), @"Name similarity: 100%; Pattern match: 15%; Type match: 10%");
    }
}
