//! Configuration errors raised at the boundary, before any pipeline starts.

use thiserror::Error;

use crate::output::ToolId;

/// Invalid or unreadable tool configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required option is empty.
    #[error("{tool}: option '{field}' must not be empty")]
    EmptyField { tool: ToolId, field: &'static str },

    /// The CSV delimiter cannot be used by the reader.
    #[error("{tool}: delimiter {delimiter:?} must be a single ASCII character other than '\"'")]
    InvalidDelimiter { tool: ToolId, delimiter: char },

    /// A rule-driven recipe was configured without rules.
    #[error("{tool}: recipe '{recipe}' needs at least one rule")]
    NoRules { tool: ToolId, recipe: &'static str },

    /// Two rollup output columns would share a name.
    #[error("{tool}: rollup column '{column}' {conflict}")]
    RollupColumnConflict {
        tool: ToolId,
        column: String,
        conflict: &'static str,
    },

    /// A numeric option is outside its allowed range.
    #[error("{tool}: option '{field}' must be between {min} and {max}, got {value}")]
    OutOfRange {
        tool: ToolId,
        field: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },

    /// TOML config could not be parsed.
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON config could not be parsed.
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::EmptyField {
            tool: ToolId::QrGenerator,
            field: "template",
        };
        assert_eq!(
            err.to_string(),
            "qr-generator: option 'template' must not be empty"
        );
    }
}
