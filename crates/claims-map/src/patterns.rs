//! Well-known coded value shapes.
//!
//! Diagnosis codes (ICD-10 style), procedure codes (CPT), provider
//! identifiers (NPI) and postal codes (ZIP / ZIP+4) are recognized by shape
//! only; no code list is consulted.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Letter (excluding U), digit, alphanumeric (excluding U), then anything.
pub(crate) static DIAGNOSIS_CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-TV-Z][0-9][0-9A-TV-Z].*$").expect("Invalid diagnosis code regex")
});

/// Exactly five digits.
pub(crate) static PROCEDURE_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}$").expect("Invalid procedure code regex"));

/// Exactly ten digits.
pub(crate) static PROVIDER_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{10}$").expect("Invalid provider id regex"));

/// Five digits with an optional four-digit extension.
pub(crate) static POSTAL_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("Invalid postal code regex"));

/// `D[D]` / `D[D]` / `DD[DD]` with `/` or `-` separators.
pub(crate) static LOOSE_DATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{1,2}[/-]\d{1,2}[/-]\d{2,4}$").expect("Invalid date regex")
});

/// Coded format detected in a column sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodePattern {
    /// Diagnosis code.
    Icd,
    /// Procedure code.
    Cpt,
    /// Provider identifier.
    Npi,
    /// Postal code.
    Zip,
    Unknown,
}

impl CodePattern {
    /// True for every recognized code shape.
    pub fn is_known(&self) -> bool {
        !matches!(self, CodePattern::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CodePattern::Icd => "icd",
            CodePattern::Cpt => "cpt",
            CodePattern::Npi => "npi",
            CodePattern::Zip => "zip",
            CodePattern::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CodePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Matches one trimmed value against the code shapes in precedence order.
pub fn match_value(value: &str) -> Option<CodePattern> {
    let value = value.trim();
    if DIAGNOSIS_CODE_REGEX.is_match(value) {
        Some(CodePattern::Icd)
    } else if PROCEDURE_CODE_REGEX.is_match(value) {
        Some(CodePattern::Cpt)
    } else if PROVIDER_ID_REGEX.is_match(value) {
        Some(CodePattern::Npi)
    } else if POSTAL_CODE_REGEX.is_match(value) {
        Some(CodePattern::Zip)
    } else {
        None
    }
}

/// Pattern of the first sample that matches any known shape.
///
/// This is first-match-wins over the sample order, not a vote.
pub fn detect_pattern<S: AsRef<str>>(samples: &[S]) -> CodePattern {
    samples
        .iter()
        .find_map(|sample| match_value(sample.as_ref()))
        .unwrap_or(CodePattern::Unknown)
}
