//! CSV generation from a [`Dataset`].

use csv::{QuoteStyle, Terminator, WriterBuilder};
use flowbench_model::{Dataset, Value};

use crate::error::{IngestError, Result};

/// Serializes a dataset to CSV text.
///
/// Columns follow `header_order` when given, otherwise the dataset headers.
/// A value is quoted only when it contains the delimiter, a quote, or a line
/// break; embedded quotes are doubled. Null and missing cells are written
/// empty. Records end with `\n`.
pub fn write_csv(dataset: &Dataset, header_order: Option<&[String]>, delimiter: u8) -> Result<String> {
    let headers = header_order.unwrap_or(&dataset.headers);
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(headers).map_err(write_error)?;
    let mut record: Vec<String> = Vec::with_capacity(headers.len());
    for row in &dataset.rows {
        record.clear();
        record.extend(
            headers
                .iter()
                .map(|header| row.get(header).map(Value::as_text).unwrap_or_default()),
        );
        writer.write_record(&record).map_err(write_error)?;
    }

    let bytes = writer.into_inner().map_err(|e| IngestError::Write {
        message: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| IngestError::Write {
        message: e.to_string(),
    })
}

fn write_error(err: csv::Error) -> IngestError {
    IngestError::Write {
        message: err.to_string(),
    }
}
