//! Error types for input decoding.

use thiserror::Error;

/// Errors that make an input file unusable.
///
/// Any of these aborts the run: no step executes on malformed input.
#[derive(Debug, Error)]
pub enum IngestError {
    // === Encoding Errors ===
    /// Input carries a byte order mark for an encoding other than UTF-8.
    #[error("unsupported encoding: {encoding}")]
    UnsupportedEncoding { encoding: &'static str },

    /// Input is not valid UTF-8.
    #[error("input is not valid UTF-8 (first invalid byte at offset {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },

    // === CSV Parsing Errors ===
    /// CSV input has no records.
    #[error("CSV input is empty")]
    EmptyCsv,

    /// Two header columns share a name.
    #[error("duplicate column name '{name}' in header")]
    DuplicateHeader { name: String },

    /// A record is malformed or has the wrong number of fields.
    #[error("malformed CSV at line {line}: {message}")]
    Parse { line: u64, message: String },

    /// Writing CSV output failed.
    #[error("failed to write CSV: {message}")]
    Write { message: String },
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map_or(0, csv::Position::line);
        Self::Parse {
            line,
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::Parse {
            line: 3,
            message: "expected 2 fields, found 3".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "malformed CSV at line 3: expected 2 fields, found 3"
        );
    }
}
