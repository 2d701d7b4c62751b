//! Target field layout: the fixed destination schema claims are mapped onto.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::value::ValueType;

/// Whether a target field must be populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldUsage {
    Mandatory,
    Optional,
    #[default]
    Unspecified,
}

impl FieldUsage {
    /// Reads a usage cell from a layout file.
    ///
    /// Unrecognized values (including blanks) become [`FieldUsage::Unspecified`].
    pub fn from_layout_value(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldUsage::Mandatory => "Mandatory",
            FieldUsage::Optional => "Optional",
            FieldUsage::Unspecified => "Unspecified",
        }
    }

    pub fn is_mandatory(&self) -> bool {
        matches!(self, FieldUsage::Mandatory)
    }
}

impl fmt::Display for FieldUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldUsage {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mandatory" | "required" | "yes" | "y" => Ok(FieldUsage::Mandatory),
            "optional" | "no" | "n" => Ok(FieldUsage::Optional),
            _ => Err(ModelError::UnknownUsage(s.to_string())),
        }
    }
}

/// One row of the target layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetField {
    pub name: String,
    /// Example value from the layout; empty when the layout has none.
    #[serde(default)]
    pub example: String,
    /// Derived from keywords in `name`.
    pub expected_type: ValueType,
    #[serde(default)]
    pub usage: FieldUsage,
    #[serde(default)]
    pub category: String,
}

impl TargetField {
    pub fn new(name: impl Into<String>, example: impl Into<String>) -> Self {
        let name = name.into();
        let expected_type = ValueType::expected_for_field_name(&name);
        Self {
            name,
            example: example.into(),
            expected_type,
            usage: FieldUsage::Unspecified,
            category: String::new(),
        }
    }

    pub fn with_usage(mut self, usage: FieldUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// True when the layout supplied a non-empty example value.
    pub fn has_example(&self) -> bool {
        !self.example.is_empty()
    }
}

/// Ordered collection of target fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetLayout {
    pub fields: Vec<TargetField>,
}

impl TargetLayout {
    pub fn new(fields: Vec<TargetField>) -> Self {
        Self { fields }
    }

    /// Builds a layout from raw rows, trimming names and dropping blank ones.
    pub fn from_fields(fields: impl IntoIterator<Item = TargetField>) -> Self {
        let fields = fields
            .into_iter()
            .filter_map(|mut field| {
                let trimmed = field.name.trim();
                if trimmed.is_empty() {
                    return None;
                }
                if trimmed.len() != field.name.len() {
                    field.name = trimmed.to_string();
                }
                Some(field)
            })
            .collect();
        Self { fields }
    }

    /// Convenience constructor used mostly by tests: `(name, example)` pairs.
    pub fn from_names<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::from_fields(
            entries
                .into_iter()
                .map(|(name, example)| TargetField::new(name, example)),
        )
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TargetField> {
        self.fields.iter()
    }

    /// Looks up a field by exact name. With duplicate names the last one wins.
    pub fn field(&self, name: &str) -> Option<&TargetField> {
        self.fields.iter().rev().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> Vec<&TargetField> {
        self.fields.iter().filter(|f| f.usage.is_mandatory()).collect()
    }

    pub fn optional_fields(&self) -> Vec<&TargetField> {
        self.fields
            .iter()
            .filter(|f| f.usage == FieldUsage::Optional)
            .collect()
    }

    /// Distinct, non-empty categories in sorted order.
    pub fn field_groups(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|f| f.category.as_str())
            .filter(|c| !c.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Number of fields per non-empty category.
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for field in &self.fields {
            if field.category.is_empty() {
                continue;
            }
            *counts.entry(field.category.clone()).or_insert(0) += 1;
        }
        counts
    }
}
