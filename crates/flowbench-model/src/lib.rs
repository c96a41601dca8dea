//! Flowbench data model.
//!
//! Shared types for the transformation pipelines:
//!
//! - **Value / Row / Dataset**: the tabular currency passed between steps
//! - **Options**: closed, per-tool configuration structs and their validation
//! - **Output**: tool identifiers, artifacts, and summary counters

pub mod dataset;
pub mod error;
pub mod options;
pub mod output;
pub mod value;

pub use dataset::{Dataset, Row};
pub use error::ConfigError;
pub use options::{
    CsvFormat, ExcelFixItOptions, InvoiceExtractorOptions, LeadScrubberOptions, MergeColumns,
    QR_MAX_PAYLOAD_BYTES, QrGeneratorOptions, ROLLUP_COUNT_COLUMN, Recipe, Rule, Secret,
    SheetsAutomationOptions, SplitColumn, ToolConfig, UtmParams,
};
pub use output::{Artifact, MIME_CSV, MIME_JSON, Summary, SummaryValue, ToolId};
pub use value::Value;
