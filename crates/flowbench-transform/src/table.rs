//! Dataset-level operations used by the tabular tools.
//!
//! Each operation mutates the dataset in place and returns what it counted,
//! so the calling step can report it.

use std::collections::HashSet;
use std::sync::LazyLock;

use flowbench_model::{Dataset, Row, Value};
use regex::{Captures, Regex};

/// A `{name}` token with no nested braces.
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]*)\}").expect("Invalid placeholder regex"));

/// Trims leading and trailing whitespace from every text cell.
///
/// Returns the number of cells that changed.
pub fn trim_cells(dataset: &mut Dataset) -> usize {
    let mut trimmed = 0;
    for row in &mut dataset.rows {
        for value in row.values_mut() {
            if let Value::Text(text) = value {
                let clean = text.trim();
                if clean.len() != text.len() {
                    *text = clean.to_string();
                    trimmed += 1;
                }
            }
        }
    }
    trimmed
}

/// Drops rows whose every cell is Null or blank text.
pub fn remove_empty_rows(dataset: &mut Dataset) -> usize {
    let before = dataset.rows.len();
    dataset.rows.retain(|row| !row.is_blank());
    before - dataset.rows.len()
}

/// Drops exact duplicate rows, keeping the first occurrence.
///
/// Identity is [`Row::canonical_key`]; surviving rows keep their order.
pub fn dedupe_rows(dataset: &mut Dataset) -> usize {
    let before = dataset.rows.len();
    let mut seen = HashSet::with_capacity(before);
    dataset.rows.retain(|row| seen.insert(row.canonical_key()));
    before - dataset.rows.len()
}

/// Drops rows whose `column` value was already seen.
///
/// Keys are compared trimmed and lowercased. Rows with a blank or missing
/// key are always kept.
pub fn dedupe_by_column(dataset: &mut Dataset, column: &str) -> usize {
    let before = dataset.rows.len();
    let mut seen = HashSet::new();
    dataset.rows.retain(|row| match row.get(column) {
        Some(value) if !value.is_blank() => seen.insert(value.as_text().trim().to_lowercase()),
        _ => true,
    });
    before - dataset.rows.len()
}

/// Outcome of [`split_column`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SplitOutcome {
    pub rows_affected: usize,
    pub columns_added: usize,
}

/// Splits a text column on `delimiter` into `{column}_1..N`.
///
/// Parts are trimmed. Rows where the column is missing or not text are left
/// untouched. Headers are recomputed afterwards.
pub fn split_column(dataset: &mut Dataset, column: &str, delimiter: &str) -> SplitOutcome {
    if delimiter.is_empty() {
        return SplitOutcome::default();
    }
    let mut rows_affected = 0;
    for row in &mut dataset.rows {
        let Some(Value::Text(text)) = row.get(column) else {
            continue;
        };
        let parts: Vec<String> = text
            .split(delimiter)
            .map(|part| part.trim().to_string())
            .collect();
        for (idx, part) in parts.into_iter().enumerate() {
            row.set(format!("{column}_{}", idx + 1), part);
        }
        rows_affected += 1;
    }
    let columns_added = dataset.recompute_headers();
    SplitOutcome {
        rows_affected,
        columns_added,
    }
}

/// Writes `fill_template(template, headers, row)` into `target` for every row.
///
/// Returns the number of rows written; headers are recomputed.
pub fn merge_columns(dataset: &mut Dataset, template: &str, target: &str) -> usize {
    let Dataset { headers, rows } = &mut *dataset;
    for row in rows.iter_mut() {
        let merged = fill_template(template, headers, row);
        row.set(target, merged);
    }
    dataset.recompute_headers();
    dataset.rows.len()
}

/// Substitutes `{column}` tokens with the row's values.
///
/// The template is scanned once, left to right; substituted values are never
/// re-scanned. A token naming a header the row lacks becomes an empty string.
/// Braces that do not name a header or row key are kept as written.
pub fn fill_template(template: &str, headers: &[String], row: &Row) -> String {
    PLACEHOLDER_REGEX
        .replace_all(template, |caps: &Captures<'_>| {
            let name = &caps[1];
            match row.get(name) {
                Some(value) => value.as_text(),
                None if headers.iter().any(|header| header == name) => String::new(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
