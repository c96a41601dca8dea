//! Invoice Extractor: batch field extraction from text documents.
//!
//! Files are independent, so extraction runs in parallel across files.
//! Results keep input order and the tallies are a plain sum over them.

use flowbench_ingest::decode_document;
use flowbench_model::{Dataset, InvoiceExtractorOptions, Row, ToolId, Value};
use flowbench_transform::{InvoiceFields, extract_invoice, normalize_document_date};
use rayon::prelude::*;
use serde::Serialize;

use super::csv_artifact;
use crate::error::{ItemFailure, Result};
use crate::run::{InputFile, PipelineOutput, PipelineRun};
use crate::step::StepReport;

pub const OUTPUT_FILE: &str = "invoices.csv";
pub const LINE_ITEMS_FILE: &str = "line_items.csv";

/// Reason recorded for documents without an invoice number or total.
pub const NO_INVOICE_DATA: &str = "No invoice data found";

pub const STEPS: &[&str] = &[
    "load_documents",
    "extract_fields",
    "normalize_fields",
    "generate_output",
];

const INVOICE_COLUMNS: [&str; 8] = [
    "file",
    "vendor",
    "invoice_number",
    "date",
    "currency",
    "total",
    "tax",
    "line_items",
];

const LINE_ITEM_COLUMNS: [&str; 5] = ["file", "description", "quantity", "unit_price", "amount"];

/// Fields extracted from one successfully processed file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedInvoice {
    pub file: String,
    pub fields: InvoiceFields,
}

pub fn run(files: &[InputFile], options: &InvoiceExtractorOptions) -> Result<PipelineOutput> {
    let mut run = PipelineRun::new(ToolId::InvoiceExtractor);
    let total_files = files.len();
    run.record("totalFiles", total_files);

    run.step("load_documents", || {
        let bytes: usize = files.iter().map(|file| file.bytes.len()).sum();
        let report = StepReport::new(format!("Loaded {total_files} documents ({bytes} bytes)"))
            .count("files", total_files)
            .count("bytes", bytes);
        Ok(((), report))
    })?;

    let mut invoices = run.step("extract_fields", || {
        let results: Vec<std::result::Result<ExtractedInvoice, ItemFailure>> =
            files.par_iter().map(extract_file).collect();
        let (success, failed) = results.iter().fold((0, 0), |(ok, err), result| match result {
            Ok(_) => (ok + 1, err),
            Err(_) => (ok, err + 1),
        });
        let mut invoices = Vec::with_capacity(success);
        let mut warnings = Vec::with_capacity(failed);
        for result in results {
            match result {
                Ok(invoice) => invoices.push(invoice),
                Err(failure) => warnings.push(failure.to_string()),
            }
        }
        let report = StepReport::new(format!(
            "Extracted invoice fields from {success} of {total_files} documents"
        ))
        .count("success", success)
        .count("failed", failed)
        .warnings_capped(warnings);
        Ok((invoices, report))
    })?;
    let success = invoices.len();
    run.record("successCount", success);
    run.record("failedCount", total_files - success);
    run.record("accuracy", accuracy(success, total_files));

    if options.normalize {
        run.step("normalize_fields", || {
            Ok(((), normalize_fields(&mut invoices, options.default_currency.as_deref())))
        })?;
    }

    let artifacts = run.step("generate_output", || {
        let mut artifacts = vec![csv_artifact(OUTPUT_FILE, &invoice_table(&invoices), b',')?];
        let mut report = StepReport::new(format!(
            "Wrote {} invoices to {OUTPUT_FILE}",
            invoices.len()
        ))
        .count("rows", invoices.len());
        if options.include_line_items {
            let items = line_item_table(&invoices);
            report = report.count("line_items", items.row_count());
            artifacts.push(csv_artifact(LINE_ITEMS_FILE, &items, b',')?);
        }
        Ok((artifacts, report))
    })?;

    run.finish(artifacts)
}

/// Percentage of files that yielded invoice data, rounded to an integer.
pub fn accuracy(success: usize, total: usize) -> u64 {
    if total == 0 || success == 0 {
        return 0;
    }
    ((success as f64 / total as f64) * 100.0).round() as u64
}

fn extract_file(file: &InputFile) -> std::result::Result<ExtractedInvoice, ItemFailure> {
    let text =
        decode_document(&file.bytes).map_err(|err| ItemFailure::new(&file.name, err.to_string()))?;
    let fields = extract_invoice(text);
    if !fields.has_invoice_data() {
        return Err(ItemFailure::new(&file.name, NO_INVOICE_DATA));
    }
    Ok(ExtractedInvoice {
        file: file.name.clone(),
        fields,
    })
}

fn normalize_fields(
    invoices: &mut [ExtractedInvoice],
    default_currency: Option<&str>,
) -> StepReport {
    let mut dates_normalized = 0;
    let mut currency_defaulted = 0;
    let mut warnings = Vec::new();
    for invoice in invoices.iter_mut() {
        let fields = &mut invoice.fields;
        if let Some(date) = &fields.date {
            match normalize_document_date(date) {
                Some(iso) if iso != *date => {
                    fields.date = Some(iso);
                    dates_normalized += 1;
                }
                Some(_) => {}
                None => warnings.push(format!("{}: unrecognized date '{date}'", invoice.file)),
            }
        }
        if fields.currency.is_none()
            && let Some(currency) = default_currency
        {
            fields.currency = Some(currency.to_ascii_uppercase());
            currency_defaulted += 1;
        }
    }
    StepReport::new(format!(
        "Normalized {dates_normalized} dates and defaulted {currency_defaulted} currencies"
    ))
    .count("dates_normalized", dates_normalized)
    .count("currency_defaulted", currency_defaulted)
    .warnings_capped(warnings)
}

fn headers(columns: &[&str]) -> Vec<String> {
    columns.iter().map(ToString::to_string).collect()
}

fn invoice_table(invoices: &[ExtractedInvoice]) -> Dataset {
    let rows = invoices
        .iter()
        .map(|invoice| {
            let fields = &invoice.fields;
            Row::from_pairs([
                ("file", Value::text(&invoice.file)),
                ("vendor", fields.vendor.clone().into()),
                ("invoice_number", fields.invoice_number.clone().into()),
                ("date", fields.date.clone().into()),
                ("currency", fields.currency.clone().into()),
                ("total", fields.total.into()),
                ("tax", fields.tax.into()),
                ("line_items", Value::Number(fields.line_items.len() as f64)),
            ])
        })
        .collect();
    Dataset::new(headers(&INVOICE_COLUMNS), rows)
}

fn line_item_table(invoices: &[ExtractedInvoice]) -> Dataset {
    let rows = invoices
        .iter()
        .flat_map(|invoice| {
            invoice.fields.line_items.iter().map(|item| {
                Row::from_pairs([
                    ("file", Value::text(&invoice.file)),
                    ("description", Value::text(&item.description)),
                    ("quantity", Value::Number(item.quantity)),
                    ("unit_price", Value::Number(item.unit_price)),
                    ("amount", Value::Number(item.amount)),
                ])
            })
        })
        .collect();
    Dataset::new(headers(&LINE_ITEM_COLUMNS), rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_rounds_and_handles_zero() {
        assert_eq!(accuracy(0, 3), 0);
        assert_eq!(accuracy(2, 3), 67);
        assert_eq!(accuracy(1, 3), 33);
        assert_eq!(accuracy(3, 3), 100);
    }

    #[test]
    fn undecodable_file_is_an_item_failure() {
        let file = InputFile::new("scan.bin", vec![0xff, 0xfe, 0x41, 0x00]);
        let failure = extract_file(&file).unwrap_err();
        assert_eq!(failure.item, "scan.bin");
        assert_eq!(failure.reason, "unsupported encoding: UTF-16 LE");
    }

    #[test]
    fn normalization_fills_currency_and_iso_dates() {
        let mut invoices = vec![ExtractedInvoice {
            file: "a.txt".into(),
            fields: InvoiceFields {
                date: Some("March 5, 2024".into()),
                total: Some(10.0),
                ..InvoiceFields::default()
            },
        }];
        let report = normalize_fields(&mut invoices, Some("eur"));
        assert_eq!(invoices[0].fields.date.as_deref(), Some("2024-03-05"));
        assert_eq!(invoices[0].fields.currency.as_deref(), Some("EUR"));
        assert_eq!(report.counts["dates_normalized"], 1);
        assert_eq!(report.counts["currency_defaulted"], 1);
    }
}
