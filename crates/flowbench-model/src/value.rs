//! Scalar cell values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single cell of a tabular dataset.
///
/// Parsed CSV input only ever produces [`Value::Text`]; numbers appear when a
/// step derives them (for example rollup sums). Serializes untagged, so a row
/// renders as a plain JSON object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Number(f64),
    Text(String),
}

impl Value {
    /// Creates a text value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true for Null and for text that is empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Number(_) => false,
            Self::Text(text) => text.trim().is_empty(),
        }
    }

    /// Borrow the inner string of a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Render the value as it appears in CSV output.
    ///
    /// Null renders as the empty string; integral numbers render without a
    /// fractional part.
    pub fn as_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text.clone(),
        }
    }

    /// Numeric interpretation of the value.
    ///
    /// Non-numeric text yields NaN, and so do `inf` and `NaN` spelled out.
    pub fn as_number(&self) -> f64 {
        match self {
            Self::Null => f64::NAN,
            Self::Number(number) => *number,
            Self::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite())
                .unwrap_or(f64::NAN),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_numbers_render_without_fraction() {
        assert_eq!(Value::Number(3.0).as_text(), "3");
        assert_eq!(Value::Number(2.5).as_text(), "2.5");
        assert_eq!(Value::Number(-12.0).as_text(), "-12");
    }

    #[test]
    fn null_and_whitespace_are_blank() {
        assert!(Value::Null.is_blank());
        assert!(Value::text("   ").is_blank());
        assert!(!Value::text("x").is_blank());
        assert!(!Value::Number(0.0).is_blank());
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(Value::text(" 150 ").as_number(), 150.0);
        assert!(Value::text("abc").as_number().is_nan());
        assert!(Value::Null.as_number().is_nan());
        assert!(Value::text("inf").as_number().is_nan());
        assert!(Value::text("-Infinity").as_number().is_nan());
    }

    #[test]
    fn serializes_untagged() {
        let json = serde_json::to_string(&vec![
            Value::Null,
            Value::Number(1.5),
            Value::text("a"),
        ])
        .unwrap();
        assert_eq!(json, r#"[null,1.5,"a"]"#);
    }
}
