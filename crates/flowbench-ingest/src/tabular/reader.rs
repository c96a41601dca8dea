//! CSV parsing into a [`Dataset`].

use csv::{ReaderBuilder, StringRecord};
use flowbench_model::{CsvFormat, Dataset, Row, Value};

use crate::document::decode_document;
use crate::error::{IngestError, Result};

/// Column count above which a warning is logged.
const WIDE_DATASET_COLUMNS: usize = 500;

/// Name given to column `index` (0-based) when there is no header row.
pub fn synthesized_column_name(index: usize) -> String {
    format!("Column {}", index + 1)
}

/// Parses CSV bytes into a dataset.
///
/// With a header row, the first record defines column order and every later
/// record must have the same number of fields. Without one, columns are
/// named `Column 1..N` where N is the widest record. Every cell parses as
/// text.
pub fn parse_csv(bytes: &[u8], format: &CsvFormat) -> Result<Dataset> {
    let text = decode_document(bytes)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(format.delimiter_byte())
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    // Empty lines never reach us: the reader skips them.
    for result in reader.records() {
        records.push(result?);
    }

    let dataset = if format.has_header {
        from_header_records(records)?
    } else {
        from_headerless_records(records)?
    };

    if dataset.column_count() > WIDE_DATASET_COLUMNS {
        tracing::warn!(
            columns = dataset.column_count(),
            "Dataset has more than {WIDE_DATASET_COLUMNS} columns - may impact performance"
        );
    }
    tracing::debug!(
        rows = dataset.row_count(),
        columns = dataset.column_count(),
        "parsed CSV input"
    );
    Ok(dataset)
}

fn from_header_records(records: Vec<StringRecord>) -> Result<Dataset> {
    let mut records = records.into_iter();
    let Some(header_record) = records.next() else {
        return Err(IngestError::EmptyCsv);
    };

    let mut headers: Vec<String> = Vec::with_capacity(header_record.len());
    for (idx, raw) in header_record.iter().enumerate() {
        let name = raw.trim();
        let name = if name.is_empty() {
            synthesized_column_name(idx)
        } else {
            name.to_string()
        };
        if headers.contains(&name) {
            return Err(IngestError::DuplicateHeader { name });
        }
        headers.push(name);
    }

    let mut rows = Vec::new();
    for record in records {
        if record.len() != headers.len() {
            return Err(IngestError::Parse {
                line: record_line(&record),
                message: format!(
                    "expected {} fields, found {}",
                    headers.len(),
                    record.len()
                ),
            });
        }
        let row = Row::from_pairs(
            headers
                .iter()
                .zip(record.iter())
                .map(|(header, value)| (header.clone(), Value::text(value))),
        );
        rows.push(row);
    }

    Ok(Dataset::new(headers, rows))
}

fn from_headerless_records(records: Vec<StringRecord>) -> Result<Dataset> {
    if records.is_empty() {
        return Err(IngestError::EmptyCsv);
    }
    let width = records.iter().map(StringRecord::len).max().unwrap_or(0);
    let headers: Vec<String> = (0..width).map(synthesized_column_name).collect();
    let rows = records
        .iter()
        .map(|record| {
            Row::from_pairs(
                headers
                    .iter()
                    .zip(record.iter())
                    .map(|(header, value)| (header.clone(), Value::text(value))),
            )
        })
        .collect();
    Ok(Dataset::new(headers, rows))
}

fn record_line(record: &StringRecord) -> u64 {
    record.position().map_or(0, csv::Position::line)
}
