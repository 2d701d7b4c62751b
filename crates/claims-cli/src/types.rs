use std::path::PathBuf;

use claims_map::{MappingReview, ReviewIssue, ReviewSummary};
use claims_model::{MappingConfig, SuggestionSet};
use serde::Serialize;

/// Outcome of suggesting and reviewing one claims file.
#[derive(Debug, Clone)]
pub struct ClaimsResult {
    pub path: PathBuf,
    pub source_name: String,
    pub rows: usize,
    pub columns: Vec<String>,
    pub suggestions: SuggestionSet,
    pub review: MappingReview,
    pub issues: Vec<ReviewIssue>,
    pub summary: ReviewSummary,
    /// Decisions replayed from a stored template.
    pub template_applied: usize,
    pub saved_to: Option<PathBuf>,
}

impl ClaimsResult {
    pub fn has_blocking_issues(&self) -> bool {
        self.issues.iter().any(ReviewIssue::is_blocking)
    }

    pub fn to_config(&self, layout_name: &str) -> MappingConfig {
        self.review.to_config(layout_name, self.source_name.as_str())
    }

    pub fn report(&self, layout_name: &str) -> ClaimsReport<'_> {
        ClaimsReport {
            path: self.path.display().to_string(),
            source_name: &self.source_name,
            rows: self.rows,
            columns: self.columns.len(),
            suggestions: &self.suggestions,
            mapping: self.to_config(layout_name),
            issues: self.issues.iter().map(IssueReport::from).collect(),
            summary: SummaryReport::from(&self.summary),
            saved_to: self.saved_to.as_ref().map(|p| p.display().to_string()),
        }
    }
}

/// A whole `suggest` run.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub layout_name: String,
    pub layout_fields: usize,
    pub results: Vec<ClaimsResult>,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl BatchResult {
    pub fn has_errors(&self) -> bool {
        self.results.iter().any(ClaimsResult::has_blocking_issues)
    }

    pub fn reports(&self) -> Vec<ClaimsReport<'_>> {
        self.results
            .iter()
            .map(|result| result.report(&self.layout_name))
            .collect()
    }
}

/// JSON shape of one reviewed claims file.
#[derive(Debug, Serialize)]
pub struct ClaimsReport<'a> {
    pub path: String,
    pub source_name: &'a str,
    pub rows: usize,
    pub columns: usize,
    pub suggestions: &'a SuggestionSet,
    pub mapping: MappingConfig,
    pub issues: Vec<IssueReport>,
    pub summary: SummaryReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IssueReport {
    pub kind: &'static str,
    pub blocking: bool,
    pub message: String,
}

impl From<&ReviewIssue> for IssueReport {
    fn from(issue: &ReviewIssue) -> Self {
        let kind = match issue {
            ReviewIssue::RequiredFieldUnmapped { .. } => "required_field_unmapped",
            ReviewIssue::ColumnNotFound { .. } => "column_not_found",
            ReviewIssue::ColumnReused { .. } => "column_reused",
        };
        Self {
            kind,
            blocking: issue.is_blocking(),
            message: issue.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SummaryReport {
    pub total_fields: usize,
    pub mapped: usize,
    pub suggested: usize,
    pub required_total: usize,
    pub required_mapped: usize,
}

impl From<&ReviewSummary> for SummaryReport {
    fn from(summary: &ReviewSummary) -> Self {
        Self {
            total_fields: summary.total_fields,
            mapped: summary.mapped,
            suggested: summary.suggested,
            required_total: summary.required_total,
            required_mapped: summary.required_mapped,
        }
    }
}
