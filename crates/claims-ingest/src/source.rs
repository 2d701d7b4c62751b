//! DataFrame adapter for the mapping engine's sampling seam.

use claims_map::SampleSource;
use polars::prelude::*;

/// Converts a Polars `AnyValue` to the string the engine samples.
///
/// Returns `None` for nulls and float NaN. Floats are written without
/// trailing zeros, so `30301.0` samples as `30301`.
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use claims_ingest::any_to_string;
///
/// assert_eq!(any_to_string(AnyValue::Null), None);
/// assert_eq!(any_to_string(AnyValue::Float64(30301.0)).as_deref(), Some("30301"));
/// assert_eq!(any_to_string(AnyValue::String("E11.9")).as_deref(), Some("E11.9"));
/// ```
pub fn any_to_string(value: AnyValue<'_>) -> Option<String> {
    let text = match value {
        AnyValue::Null => return None,
        AnyValue::Float32(v) if v.is_nan() => return None,
        AnyValue::Float64(v) if v.is_nan() => return None,
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        other => {
            let s = other.to_string();
            if s.starts_with('"') && s.ends_with('"') && s.len() >= 2 {
                s[1..s.len() - 1].to_string()
            } else {
                s
            }
        }
    };
    Some(text)
}

/// Formats a float without trailing zeros after the decimal point.
///
/// ```
/// use claims_ingest::format_numeric;
///
/// assert_eq!(format_numeric(40.0), "40");
/// assert_eq!(format_numeric(125.50), "125.5");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// Borrowed view of a claims DataFrame as a [`SampleSource`].
#[derive(Debug, Clone, Copy)]
pub struct FrameSource<'a> {
    df: &'a DataFrame,
}

impl<'a> FrameSource<'a> {
    pub fn new(df: &'a DataFrame) -> Self {
        Self { df }
    }

    pub fn frame(&self) -> &'a DataFrame {
        self.df
    }
}

impl<'a> From<&'a DataFrame> for FrameSource<'a> {
    fn from(df: &'a DataFrame) -> Self {
        Self::new(df)
    }
}

impl SampleSource for FrameSource<'_> {
    fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    fn sample_values(&self, column: &str, limit: usize) -> Vec<String> {
        let Ok(series) = self.df.column(column) else {
            return Vec::new();
        };
        let mut values = Vec::with_capacity(limit.min(series.len()));
        for idx in 0..series.len() {
            if values.len() >= limit {
                break;
            }
            if let Some(value) = any_to_string(series.get(idx).unwrap_or(AnyValue::Null)) {
                values.push(value);
            }
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        df!(
            "NPI" => [Some(1234567890i64), None, Some(1234567891)],
            "Amount" => [Some(12.5f64), Some(f64::NAN), Some(40.0)],
            "Notes" => [Some("ok"), None, Some("  spaced  ")],
        )
        .unwrap()
    }

    #[test]
    fn column_names_in_order() {
        let df = frame();
        let source = FrameSource::new(&df);
        assert_eq!(source.column_names(), vec!["NPI", "Amount", "Notes"]);
    }

    #[test]
    fn samples_skip_nulls_and_nan() {
        let df = frame();
        let source = FrameSource::new(&df);
        assert_eq!(
            source.sample_values("NPI", 5),
            vec!["1234567890", "1234567891"]
        );
        assert_eq!(source.sample_values("Amount", 5), vec!["12.5", "40"]);
        assert_eq!(source.sample_values("Notes", 5), vec!["ok", "  spaced  "]);
        assert_eq!(source.sample_values("Notes", 1), vec!["ok"]);
    }

    #[test]
    fn unknown_column_is_empty() {
        let df = frame();
        assert!(FrameSource::new(&df).sample_values("Missing", 5).is_empty());
    }

    #[test]
    fn format_numeric_trims() {
        assert_eq!(format_numeric(1.0), "1");
        assert_eq!(format_numeric(1.50), "1.5");
        assert_eq!(format_numeric(0.0), "0");
        assert_eq!(format_numeric(100.0), "100");
    }
}
