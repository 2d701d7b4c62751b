//! Claims file reading into Polars DataFrames.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::Path;

use encoding_rs::{Encoding, WINDOWS_1252};
use polars::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{IngestError, Result};

use super::header::{DELIMITER_SAMPLE_LINES, detect_delimiter, read_header_file};

/// Maximum file size for CSV loading (500 MB default).
pub const MAX_CSV_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Tables wider than this are loaded with a warning.
const WIDE_TABLE_COLUMNS: usize = 500;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// How a delimited claims file is read.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Field separator. Sniffed from the first lines when `None`.
    pub delimiter: Option<u8>,
    /// Source encoding. When `None`, UTF-8 is assumed and Windows-1252 is
    /// used as a fallback for files that are not valid UTF-8.
    pub encoding: Option<&'static Encoding>,
    /// Column names for a headerless file. The first line is then data.
    pub header_names: Option<Vec<String>>,
    /// Read every column as a string instead of inferring types.
    pub text_only: bool,
    pub max_file_size: u64,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            encoding: None,
            header_names: None,
            text_only: false,
            max_file_size: MAX_CSV_FILE_SIZE,
        }
    }
}

impl ReadOptions {
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    #[must_use]
    pub fn with_header_names(mut self, names: Vec<String>) -> Self {
        self.header_names = Some(names);
        self
    }

    /// Uses the first line of `header_path` as the column names.
    pub fn with_header_file(self, header_path: &Path) -> Result<Self> {
        let names = read_header_file(header_path, self.delimiter)?;
        Ok(self.with_header_names(names))
    }

    #[must_use]
    pub fn text_only(mut self) -> Self {
        self.text_only = true;
        self
    }
}

/// Resolves a WHATWG encoding label such as `latin1` or `utf-16le`.
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| IngestError::UnknownEncoding {
        label: label.to_string(),
    })
}

/// Check file size before loading.
pub fn check_file_size(path: &Path) -> Result<()> {
    check_file_size_with_limit(path, MAX_CSV_FILE_SIZE)
}

/// Check file size against a custom limit.
pub fn check_file_size_with_limit(path: &Path, max_size: u64) -> Result<()> {
    let metadata = fs::metadata(path).map_err(|e| IngestError::io(path, e))?;

    if metadata.len() > max_size {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size,
        });
    }

    Ok(())
}

/// Rejects files starting with a UTF-16 byte order mark.
///
/// Only relevant when no explicit encoding was requested.
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = File::open(path).map_err(|e| IngestError::io(path, e))?;

    let mut buffer = [0u8; 4];
    let bytes_read = file
        .read(&mut buffer)
        .map_err(|e| IngestError::io(path, e))?;

    if bytes_read >= 2 {
        if buffer[0..2] == [0xFF, 0xFE] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 LE",
            });
        }
        if buffer[0..2] == [0xFE, 0xFF] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 BE",
            });
        }
    }

    Ok(())
}

/// Reads the first N lines from a file, dropping a UTF-8 BOM.
pub(crate) fn read_first_lines(path: &Path, n: usize) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| IngestError::io(path, e))?;

    let reader = BufReader::new(file);
    let mut lines = Vec::with_capacity(n);

    for line_result in reader.lines().take(n) {
        let line = line_result.map_err(|e| IngestError::io(path, e))?;
        let cleaned = line.strip_prefix('\u{feff}').unwrap_or(&line).to_string();
        lines.push(cleaned);
    }

    Ok(lines)
}

fn decode(path: &Path, bytes: Vec<u8>, encoding: Option<&'static Encoding>) -> String {
    if let Some(encoding) = encoding {
        let (text, _, had_errors) = encoding.decode(&bytes);
        if had_errors {
            warn!(path = %path.display(), encoding = encoding.name(), "replaced undecodable bytes");
        }
        return text.into_owned();
    }

    let bytes = if bytes.starts_with(&UTF8_BOM) {
        bytes[UTF8_BOM.len()..].to_vec()
    } else {
        bytes
    };
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            warn!(
                path = %path.display(),
                "file is not valid UTF-8, decoding as windows-1252"
            );
            let (text, _, _) = WINDOWS_1252.decode(err.as_bytes());
            text.into_owned()
        }
    }
}

/// Reads a claims file with default options (header row, sniffed
/// delimiter, inferred column types).
pub fn read_csv_table(path: &Path) -> Result<DataFrame> {
    read_csv_table_with(path, &ReadOptions::default())
}

/// Reads a claims file into a DataFrame.
pub fn read_csv_table_with(path: &Path, options: &ReadOptions) -> Result<DataFrame> {
    check_file_size_with_limit(path, options.max_file_size)?;
    if options.encoding.is_none() {
        validate_encoding(path)?;
    }

    let bytes = fs::read(path).map_err(|e| IngestError::io(path, e))?;
    let text = decode(path, bytes, options.encoding);
    if text.trim().is_empty() {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let delimiter = options.delimiter.unwrap_or_else(|| {
        let sample: Vec<&str> = text.lines().take(DELIMITER_SAMPLE_LINES).collect();
        detect_delimiter(&sample)
    });
    debug!(path = %path.display(), delimiter = %char::from(delimiter), "reading delimited file");

    let infer_schema_length = if options.text_only { Some(0) } else { Some(100) };
    let mut df = CsvReadOptions::default()
        .with_has_header(options.header_names.is_none())
        .with_infer_schema_length(infer_schema_length)
        .map_parse_options(move |parse| parse.with_separator(delimiter))
        .into_reader_with_file_handle(Cursor::new(text.into_bytes()))
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if let Some(names) = &options.header_names {
        if names.len() != df.width() {
            return Err(IngestError::HeaderMismatch {
                path: path.to_path_buf(),
                expected: names.len(),
                found: df.width(),
            });
        }
        df.set_column_names(names.iter().map(String::as_str))?;
    }

    if df.width() > WIDE_TABLE_COLUMNS {
        warn!(
            path = %path.display(),
            columns = df.width(),
            "Dataset has more than {WIDE_TABLE_COLUMNS} columns - may impact performance"
        );
    }
    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "loaded table"
    );

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_read_csv_table() {
        let file = create_temp_csv(b"A,B,C\n1,2,3\n4,5,6\n");
        let df = read_csv_table(file.path()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);
    }

    #[test]
    fn test_read_with_bom_and_pipes() {
        let file = create_temp_csv("\u{feff}NPI|Zip\n1234567890|30301\n".as_bytes());
        let df = read_csv_table(file.path()).unwrap();
        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, vec!["NPI", "Zip"]);
    }

    #[test]
    fn test_empty_file() {
        let file = create_temp_csv(b"");
        let result = read_csv_table(file.path());
        assert!(matches!(result, Err(IngestError::EmptyCsv { .. })));
    }

    #[test]
    fn test_utf16_rejected() {
        let file = create_temp_csv(&[0xFF, 0xFE, b'A', 0x00]);
        let result = read_csv_table(file.path());
        assert!(matches!(
            result,
            Err(IngestError::UnsupportedEncoding {
                encoding: "UTF-16 LE",
                ..
            })
        ));
    }

    #[test]
    fn test_size_limit() {
        let file = create_temp_csv(b"A\n1\n");
        let result = check_file_size_with_limit(file.path(), 2);
        assert!(matches!(result, Err(IngestError::FileTooLarge { size: 4, .. })));
        assert!(check_file_size(file.path()).is_ok());
    }

    #[test]
    fn test_missing_file() {
        let result = read_csv_table(Path::new("/nonexistent/claims.csv"));
        assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
    }

    #[test]
    fn test_windows_1252_fallback() {
        // "Jos\xe9" is not valid UTF-8.
        let file = create_temp_csv(b"Name\nJos\xe9\n");
        let df = read_csv_table_with(file.path(), &ReadOptions::default().text_only()).unwrap();
        let value = df.column("Name").unwrap().str().unwrap().get(0).map(str::to_string);
        assert_eq!(value.as_deref(), Some("Jos\u{e9}"));
    }

    #[test]
    fn test_header_names_for_headerless_file() {
        let file = create_temp_csv(b"1234567890,30301\n1234567891,30302\n");
        let options = ReadOptions::default()
            .with_header_names(vec!["NPI".to_string(), "Zip".to_string()]);
        let df = read_csv_table_with(file.path(), &options).unwrap();
        assert_eq!(df.height(), 2);
        assert!(df.column("NPI").is_ok());

        let wrong = ReadOptions::default().with_header_names(vec!["NPI".to_string()]);
        let result = read_csv_table_with(file.path(), &wrong);
        assert!(matches!(
            result,
            Err(IngestError::HeaderMismatch {
                expected: 1,
                found: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_encoding_label() {
        assert_eq!(encoding_for_label("latin1").unwrap().name(), "windows-1252");
        assert!(matches!(
            encoding_for_label("klingon"),
            Err(IngestError::UnknownEncoding { .. })
        ));
    }
}
