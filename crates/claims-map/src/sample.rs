//! Access to the source table's column names and leading cell values.
//!
//! The engine only ever looks at a small prefix of each column. Sampling is
//! the first `limit` non-null cells in row order, stringified as-is; no
//! trimming happens here.

/// Number of leading non-null values sampled per column.
pub const DEFAULT_SAMPLE_SIZE: usize = 5;

/// A table the engine can draw column samples from.
pub trait SampleSource {
    /// Column names in table order.
    fn column_names(&self) -> Vec<String>;

    /// The first `limit` non-null values of `column`, stringified.
    ///
    /// Unknown columns yield an empty sample.
    fn sample_values(&self, column: &str, limit: usize) -> Vec<String>;
}

impl<T: SampleSource + ?Sized> SampleSource for &T {
    fn column_names(&self) -> Vec<String> {
        (**self).column_names()
    }

    fn sample_values(&self, column: &str, limit: usize) -> Vec<String> {
        (**self).sample_values(column, limit)
    }
}

/// A source column reduced to what the scorer needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnProfile {
    pub name: String,
    pub samples: Vec<String>,
}

/// Samples every column of `source` once, in table order.
pub fn profile_columns<S: SampleSource + ?Sized>(
    source: &S,
    sample_size: usize,
) -> Vec<ColumnProfile> {
    source
        .column_names()
        .into_iter()
        .map(|name| {
            let samples = source.sample_values(&name, sample_size);
            ColumnProfile { name, samples }
        })
        .collect()
}

/// Column-oriented table of optional strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryTable {
    columns: Vec<(String, Vec<Option<String>>)>,
}

impl InMemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column. A column with an existing name replaces it in place.
    pub fn with_column<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<V>>,
        V: Into<String>,
    {
        self.push_column(name, values);
        self
    }

    /// Adds a column of non-null values.
    pub fn with_values<I, V>(self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.with_column(name, values.into_iter().map(Some))
    }

    pub fn push_column<I, V>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = Option<V>>,
        V: Into<String>,
    {
        let name = name.into();
        let values: Vec<Option<String>> = values.into_iter().map(|v| v.map(Into::into)).collect();
        match self.columns.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = values,
            None => self.columns.push((name, values)),
        }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl SampleSource for InMemoryTable {
    fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.clone()).collect()
    }

    fn sample_values(&self, column: &str, limit: usize) -> Vec<String> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, values)| values.iter().flatten().take(limit).cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_skips_nulls_and_keeps_order() {
        let table = InMemoryTable::new().with_column(
            "NPI",
            [None, Some("1"), Some("2"), None, Some(" 3 "), Some("4"), Some("5"), Some("6")],
        );
        assert_eq!(
            table.sample_values("NPI", DEFAULT_SAMPLE_SIZE),
            vec!["1", "2", " 3 ", "4", "5"]
        );
    }

    #[test]
    fn unknown_column_yields_empty_sample() {
        let table = InMemoryTable::new().with_values("A", ["x"]);
        assert!(table.sample_values("B", 5).is_empty());
    }

    #[test]
    fn profiles_follow_table_order() {
        let table = InMemoryTable::new()
            .with_values("B", ["1"])
            .with_values("A", ["2"]);
        let profiles = profile_columns(&table, 5);
        let names: Vec<&str> = profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn replacing_a_column_keeps_position() {
        let table = InMemoryTable::new()
            .with_values("A", ["1"])
            .with_values("B", ["2"])
            .with_values("A", ["3"]);
        assert_eq!(table.column_names(), vec!["A", "B"]);
        assert_eq!(table.sample_values("A", 5), vec!["3"]);
    }
}
