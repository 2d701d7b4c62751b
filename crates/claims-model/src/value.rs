//! Coarse value types shared by the layout and the type guesser.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Field-name keywords whose values are expected to be numeric codes.
const NUMERIC_KEYWORDS: [&str; 3] = ["zip", "npi", "cpt"];

/// Coarse semantic type of a column's values.
///
/// Declaration order is significant: when two types receive the same number
/// of votes, the one declared first wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Numeric,
    Text,
    Date,
}

impl ValueType {
    /// All types in tie-break order.
    pub const ALL: [ValueType; 3] = [ValueType::Numeric, ValueType::Text, ValueType::Date];

    /// Infers the type a target field expects from keywords in its name.
    ///
    /// Names mentioning a zip, npi or cpt code expect numeric values; every
    /// other name (including icd, date and dob fields) expects text.
    pub fn expected_for_field_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if NUMERIC_KEYWORDS.iter().any(|keyword| lower.contains(keyword)) {
            ValueType::Numeric
        } else {
            ValueType::Text
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Numeric => "numeric",
            ValueType::Text => "text",
            ValueType::Date => "date",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "numeric" | "number" | "num" => Ok(ValueType::Numeric),
            "text" | "char" | "string" => Ok(ValueType::Text),
            "date" => Ok(ValueType::Date),
            _ => Err(format!("Unknown value type: {}", s)),
        }
    }
}
