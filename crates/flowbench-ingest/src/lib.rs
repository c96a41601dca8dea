//! Flowbench input decoding.
//!
//! This crate turns raw uploaded bytes into the structures the pipelines
//! work on, and back:
//!
//! - **CSV parsing**: bytes to [`Dataset`](flowbench_model::Dataset), with or without a header row
//! - **CSV generation**: dataset to CSV text with minimal quoting
//! - **Documents**: UTF-8 decoding of text-extracted invoices
//!
//! # Example
//!
//! ```ignore
//! use flowbench_ingest::{parse_csv, write_csv};
//! use flowbench_model::CsvFormat;
//!
//! let dataset = parse_csv(b"name,email\nJo,jo@example.com\n", &CsvFormat::default())?;
//! let text = write_csv(&dataset, None, b',')?;
//! ```

mod tabular;
mod document;
mod error;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV ===
pub use tabular::{parse_csv, synthesized_column_name, write_csv};

// === Documents ===
pub use document::decode_document;
