//! Error types for pipeline runs.

use std::fmt;

use flowbench_ingest::IngestError;
use flowbench_model::{ConfigError, ToolId};
use serde::Serialize;
use thiserror::Error;

/// Errors that abort a run.
///
/// A run that fails with any of these produces no artifacts.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PipelineError {
    // === Config Errors ===
    /// The tool options failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    // === Input Errors ===
    /// The input file could not be parsed.
    #[error("failed to parse input: {0}")]
    Parse(#[from] IngestError),

    /// The tool was invoked without an input file.
    #[error("{tool} requires at least one input file")]
    MissingInput { tool: ToolId },

    // === Step Errors ===
    /// A configured column does not exist in the dataset.
    #[error("column '{column}' not found in input")]
    ColumnNotFound { column: String },

    /// A step failed while producing its result.
    #[error("step '{step}' failed: {message}")]
    Step { step: String, message: String },

    // === Output Errors ===
    /// Serializing a JSON artifact failed.
    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PipelineError {
    pub(crate) fn step(step: &str, message: impl fmt::Display) -> Self {
        Self::Step {
            step: step.to_string(),
            message: message.to_string(),
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Failure of a single item inside a per-file or per-row loop.
///
/// Never raised: the loop records it as a warning and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub item: String,
    pub reason: String,
}

impl ItemFailure {
    pub fn new(item: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.item, self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::ColumnNotFound {
            column: "email".to_string(),
        };
        assert_eq!(err.to_string(), "column 'email' not found in input");

        let err = PipelineError::MissingInput {
            tool: ToolId::InvoiceExtractor,
        };
        assert_eq!(
            err.to_string(),
            "invoice-extractor requires at least one input file"
        );
    }

    #[test]
    fn test_item_failure_display() {
        let failure = ItemFailure::new("scan.txt", "No invoice data found");
        assert_eq!(failure.to_string(), "scan.txt: No invoice data found");
    }
}
