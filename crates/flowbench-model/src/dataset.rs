//! Tabular datasets shared by every step of a pipeline.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::value::Value;

/// Separates a key from its value inside a canonical row key.
const UNIT_SEPARATOR: char = '\u{1f}';
/// Separates fields inside a canonical row key.
const RECORD_SEPARATOR: char = '\u{1e}';

/// One record: an insertion-ordered mapping of column name to value.
///
/// Keys are unique; [`Row::set`] overwrites an existing key in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a row from `(column, value)` pairs; later duplicates overwrite earlier ones.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut row = Self::new();
        for (key, value) in pairs {
            row.set(key, value);
        }
        row
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(key, _)| key == column)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, column: &str) -> Option<&mut Value> {
        self.cells
            .iter_mut()
            .find(|(key, _)| key == column)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Sets a value, keeping the original position of an existing key.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.get_mut(&column) {
            Some(slot) => *slot = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        let idx = self.cells.iter().position(|(key, _)| key == column)?;
        Some(self.cells.remove(idx).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Value)> {
        self.cells
            .iter_mut()
            .map(|(key, value)| (key.as_str(), value))
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.cells.iter_mut().map(|(_, value)| value)
    }

    /// True when every cell is Null or blank text.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, value)| value.is_blank())
    }

    /// Stable serialization of the full row used as a deduplication identity.
    ///
    /// Keys are sorted, and the value kind is part of the key so that Null,
    /// empty text and numbers never collide.
    pub fn canonical_key(&self) -> String {
        let mut cells: Vec<&(String, Value)> = self.cells.iter().collect();
        cells.sort_by(|a, b| a.0.cmp(&b.0));
        let mut key = String::new();
        for (pos, (column, value)) in cells.into_iter().enumerate() {
            if pos > 0 {
                key.push(RECORD_SEPARATOR);
            }
            key.push_str(column);
            key.push(UNIT_SEPARATOR);
            match value {
                Value::Null => key.push('0'),
                Value::Number(number) => {
                    key.push('n');
                    key.push_str(&number.to_string());
                }
                Value::Text(text) => {
                    key.push('t');
                    key.push_str(text);
                }
            }
        }
        key
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (key, value) in &self.cells {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Ordered rows plus ordered column headers.
///
/// Rows should carry every header key but are not required to; a missing
/// key is treated as Null on output.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self { headers, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Finds a header by exact name, then case-insensitively.
    pub fn resolve_column(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.headers
            .iter()
            .find(|header| header.as_str() == name)
            .or_else(|| {
                self.headers
                    .iter()
                    .find(|header| header.eq_ignore_ascii_case(name))
            })
            .map(String::as_str)
    }

    /// Appends row keys missing from the headers, in first-seen order.
    ///
    /// Returns the number of headers added.
    pub fn recompute_headers(&mut self) -> usize {
        let before = self.headers.len();
        for row in &self.rows {
            for key in row.keys() {
                if !self.headers.iter().any(|header| header == key) {
                    self.headers.push(key.to_string());
                }
            }
        }
        self.headers.len() - before
    }
}
