//! Plain-text renderings for `explain` and `layout`.

use std::fmt::Write;

use claims_map::ColumnScore;
use claims_model::{TargetField, TargetLayout};

/// Renders the score breakdown of every column for one field, best first.
///
/// The first column is marked when it clears the threshold, which makes it
/// the column the engine would suggest.
pub fn render_explanation(
    field: &TargetField,
    scores: &[(String, ColumnScore)],
    threshold: f64,
) -> String {
    let mut out = String::new();
    let example = if field.has_example() {
        format!(", example '{}'", field.example)
    } else {
        String::new()
    };
    let _ = writeln!(
        out,
        "{} (expects {}{example}; threshold {:.2}%)",
        field.name,
        field.expected_type,
        threshold * 100.0
    );
    if scores.is_empty() {
        let _ = writeln!(out, "  no source columns");
        return out;
    }

    let width = scores.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (rank, (column, score)) in scores.iter().enumerate() {
        let mut parts = vec![format!("name {:.2}%", score.name_score * 100.0)];
        if score.example_boost > 0.0 {
            parts.push(format!("example +{:.2}%", score.example_boost * 100.0));
        }
        if score.pattern_boost > 0.0 {
            parts.push(format!(
                "pattern +{:.2}% ({})",
                score.pattern_boost * 100.0,
                score.pattern
            ));
        }
        if score.type_boost > 0.0 {
            parts.push(format!(
                "type +{:.2}% ({})",
                score.type_boost * 100.0,
                score.guessed_type
            ));
        }
        let marker = if rank == 0 && score.total >= threshold {
            "  <- suggested"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "{:>3}. {column:<width$} {:>7.2}%  {}{marker}",
            rank + 1,
            score.total * 100.0,
            parts.join(", ")
        );
    }
    out
}

/// Renders field counts by usage and category.
pub fn render_layout_overview(layout: &TargetLayout) -> String {
    let required = layout.required_fields().len();
    let optional = layout.optional_fields().len();
    let mut out = String::new();
    let _ = writeln!(out, "Fields:      {}", layout.len());
    let _ = writeln!(out, "Required:    {required}");
    let _ = writeln!(out, "Optional:    {optional}");
    let _ = writeln!(out, "Unspecified: {}", layout.len() - required - optional);
    let counts = layout.category_counts();
    if !counts.is_empty() {
        let _ = writeln!(out, "Categories:");
        for (category, count) in counts {
            let _ = writeln!(out, "  {category}: {count}");
        }
    }
    out
}
