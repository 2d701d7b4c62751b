//! Target layout file loading.
//!
//! A layout file is a delimited table with one row per target field and
//! the columns `Data Field`, `Usage` and `Category`, plus an optional
//! `Example Value` column feeding the engine's example boost.

use std::path::Path;

use claims_model::{FieldUsage, TargetField, TargetLayout};
use polars::prelude::*;
use tracing::info;

use crate::csv::{ReadOptions, read_csv_table_with};
use crate::error::{IngestError, Result};

pub const FIELD_COLUMN: &str = "Data Field";
pub const USAGE_COLUMN: &str = "Usage";
pub const CATEGORY_COLUMN: &str = "Category";
pub const EXAMPLE_COLUMN: &str = "Example Value";

/// Columns every layout file must carry.
pub const REQUIRED_LAYOUT_COLUMNS: [&str; 3] = [FIELD_COLUMN, USAGE_COLUMN, CATEGORY_COLUMN];

/// Loads and cleans a layout file.
///
/// Headers and values are trimmed, rows with a blank field name are
/// dropped, usage values are normalized, and categories are title-cased.
pub fn load_layout(path: &Path) -> Result<TargetLayout> {
    load_layout_with(path, &ReadOptions::default())
}

/// Like [`load_layout`] with explicit read options. Columns are always
/// read as text.
pub fn load_layout_with(path: &Path, options: &ReadOptions) -> Result<TargetLayout> {
    let mut options = options.clone();
    options.text_only = true;
    options.header_names = None;
    let mut df = read_csv_table_with(path, &options)?;

    let trimmed: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.trim().to_string())
        .collect();
    df.set_column_names(trimmed.iter().map(String::as_str))?;

    for column in REQUIRED_LAYOUT_COLUMNS {
        if !trimmed.iter().any(|name| name == column) {
            return Err(IngestError::MissingColumn {
                column: column.to_string(),
                path: path.to_path_buf(),
            });
        }
    }

    let names = column_values(&df, FIELD_COLUMN)?;
    let usages = column_values(&df, USAGE_COLUMN)?;
    let categories = column_values(&df, CATEGORY_COLUMN)?;
    let examples = if trimmed.iter().any(|name| name == EXAMPLE_COLUMN) {
        column_values(&df, EXAMPLE_COLUMN)?
    } else {
        vec![String::new(); df.height()]
    };

    let fields = names
        .into_iter()
        .zip(examples)
        .zip(usages.iter().zip(&categories))
        .map(|((name, example), (usage, category))| {
            TargetField::new(name, example)
                .with_usage(FieldUsage::from_layout_value(usage))
                .with_category(title_case(category))
        });
    let layout = TargetLayout::from_fields(fields);

    if layout.is_empty() {
        return Err(IngestError::EmptyLayout {
            path: path.to_path_buf(),
        });
    }

    info!(
        path = %path.display(),
        fields = layout.len(),
        required = layout.required_fields().len(),
        "loaded layout"
    );
    Ok(layout)
}

/// Trimmed string values of a column, with nulls as empty strings.
fn column_values(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = df.column(name)?.cast(&DataType::String)?;
    let values = column.str()?;
    Ok(values
        .into_iter()
        .map(|value| value.map(str::trim).unwrap_or_default().to_string())
        .collect())
}

/// Capitalizes the first letter of every alphabetic run and lowercases the
/// rest, so `"MEMBER info"` becomes `"Member Info"`.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut previous_is_letter = false;
    for c in value.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("MEMBER info"), "Member Info");
        assert_eq!(title_case("provider-npi"), "Provider-Npi");
        assert_eq!(title_case("claim 2nd line"), "Claim 2Nd Line");
        assert_eq!(title_case(""), "");
    }
}
