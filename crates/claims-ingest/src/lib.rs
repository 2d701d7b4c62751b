//! Claims file ingestion.
//!
//! Loads claims files and target layout files into Polars DataFrames and
//! exposes DataFrames to the mapping engine through [`FrameSource`].
//!
//! # Features
//!
//! - **CSV Loading**: size limit, encoding checks with a Windows-1252
//!   fallback, delimiter sniffing, and external header files
//! - **Layout Loading**: `Data Field` / `Usage` / `Category` layout files
//!   with optional example values
//! - **Sampling**: leading non-null values per column for the engine
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use claims_ingest::{FrameSource, load_layout, read_csv_table};
//! use claims_map::suggest_mapping;
//!
//! let layout = load_layout(Path::new("layout.csv"))?;
//! let claims = read_csv_table(Path::new("claims.csv"))?;
//! let suggestions = suggest_mapping(&layout, &FrameSource::new(&claims), 0.6);
//! ```

#![deny(unsafe_code)]

mod csv;
mod error;
mod layout;
mod source;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use csv::{
    MAX_CSV_FILE_SIZE, ReadOptions, check_file_size, check_file_size_with_limit,
    detect_delimiter, encoding_for_label, parse_delimited_line, read_csv_table,
    read_csv_table_with, read_header_file, validate_encoding,
};

// === Layout Files ===
pub use layout::{REQUIRED_LAYOUT_COLUMNS, load_layout, load_layout_with, title_case};

// === Sampling ===
pub use source::{FrameSource, any_to_string, format_numeric};
