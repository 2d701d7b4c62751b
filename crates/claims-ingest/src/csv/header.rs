//! Header line parsing, external header files, and delimiter sniffing.

use std::path::Path;

use crate::error::{IngestError, Result};

use super::reader::read_first_lines;

/// Delimiters tried by [`detect_delimiter`], in tie-break order.
pub const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b'\t', b';', b'|'];

/// Lines sampled when sniffing the delimiter.
pub const DELIMITER_SAMPLE_LINES: usize = 10;

/// Normalizes a header value by trimming whitespace.
pub fn normalize_header(value: &str) -> String {
    value.trim().to_string()
}

/// Parses one delimited line into trimmed fields, honoring double quotes.
pub fn parse_delimited_line(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if !in_quotes => {
                in_quotes = true;
            }
            '"' if in_quotes => {
                // Check for escaped quote ("")
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            c if c == delimiter && !in_quotes => {
                fields.push(normalize_header(&current));
                current.clear();
            }
            _ => {
                current.push(c);
            }
        }
    }

    fields.push(normalize_header(&current));
    fields
}

/// Picks the delimiter whose per-line count is both high and consistent.
///
/// Each candidate scores `mean * 1 / (1 + variance)` over the non-blank
/// lines containing it. Falls back to a comma when no candidate appears.
pub fn detect_delimiter<S: AsRef<str>>(lines: &[S]) -> u8 {
    let mut best: Option<(u8, f64)> = None;
    for delimiter in CANDIDATE_DELIMITERS {
        let needle = char::from(delimiter);
        let counts: Vec<f64> = lines
            .iter()
            .map(AsRef::as_ref)
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.matches(needle).count())
            .filter(|&count| count > 0)
            .map(|count| count as f64)
            .collect();
        if counts.is_empty() {
            continue;
        }
        let n = counts.len() as f64;
        let mean = counts.iter().sum::<f64>() / n;
        let variance = counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / n;
        let score = mean / (1.0 + variance);
        if best.is_none_or(|(_, current)| score > current) {
            best = Some((delimiter, score));
        }
    }
    best.map_or(b',', |(delimiter, _)| delimiter)
}

/// Reads column names from the first line of an external header file.
///
/// Blank names are dropped. The delimiter is sniffed when not given.
pub fn read_header_file(path: &Path, delimiter: Option<u8>) -> Result<Vec<String>> {
    let lines = read_first_lines(path, DELIMITER_SAMPLE_LINES)?;
    let Some(first) = lines.iter().find(|line| !line.trim().is_empty()) else {
        return Err(IngestError::NoHeaderDetected {
            path: path.to_path_buf(),
        });
    };
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&lines));
    let names: Vec<String> = parse_delimited_line(first, char::from(delimiter))
        .into_iter()
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        return Err(IngestError::NoHeaderDetected {
            path: path.to_path_buf(),
        });
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  hello  "), "hello");
        assert_eq!(normalize_header("hello"), "hello");
    }

    #[test]
    fn test_parse_line_simple() {
        assert_eq!(parse_delimited_line("a,b,c", ','), vec!["a", "b", "c"]);
        assert_eq!(parse_delimited_line("a|b", '|'), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_line_quoted() {
        let result = parse_delimited_line("\"hello, world\",b,c", ',');
        assert_eq!(result, vec!["hello, world", "b", "c"]);
    }

    #[test]
    fn test_parse_line_escaped_quotes() {
        let result = parse_delimited_line("\"he said \"\"hello\"\"\",b", ',');
        assert_eq!(result, vec!["he said \"hello\"", "b"]);
    }

    #[test]
    fn test_parse_line_trimmed() {
        assert_eq!(parse_delimited_line("  a  ;  b  ", ';'), vec!["a", "b"]);
    }

    #[test]
    fn test_detect_delimiter() {
        let pipes = ["NPI|Zip|Notes", "1234567890|30301|a, b", "1234567891|30302|ok"];
        assert_eq!(detect_delimiter(&pipes), b'|');

        let tabs = ["NPI\tZip", "1\t2", "3\t4"];
        assert_eq!(detect_delimiter(&tabs), b'\t');

        assert_eq!(detect_delimiter(&["single column"]), b',');
        assert_eq!(detect_delimiter::<&str>(&[]), b',');
    }

    #[test]
    fn test_comma_wins_ties() {
        let lines = ["a,b;c", "d,e;f"];
        assert_eq!(detect_delimiter(&lines), b',');
    }

    #[test]
    fn test_read_header_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "\n Member ID ; NPI ;; Zip\n").unwrap();
        let names = read_header_file(file.path(), None).unwrap();
        assert_eq!(names, vec!["Member ID", "NPI", "Zip"]);
    }

    #[test]
    fn test_read_empty_header_file() {
        let file = NamedTempFile::new().unwrap();
        let result = read_header_file(file.path(), None);
        assert!(matches!(result, Err(IngestError::NoHeaderDetected { .. })));
    }
}
