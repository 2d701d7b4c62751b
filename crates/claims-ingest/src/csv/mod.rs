//! Delimited claims file reading.

mod header;
mod reader;

pub use header::{detect_delimiter, parse_delimited_line, read_header_file};
pub use reader::{
    MAX_CSV_FILE_SIZE, ReadOptions, check_file_size, check_file_size_with_limit,
    encoding_for_label, read_csv_table, read_csv_table_with, validate_encoding,
};
