//! Tool pipelines and dispatch.
//!
//! Each tool has a fixed step declaration order. Optional steps that are
//! disabled by configuration never run and never appear in the audit.

pub mod excel_fix_it;
pub mod invoice_extractor;
pub mod lead_scrubber;
pub mod qr_generator;
pub mod sheets_automation;

use flowbench_ingest::{parse_csv, write_csv};
use flowbench_model::{Artifact, CsvFormat, Dataset, ToolConfig, ToolId};

use crate::error::{PipelineError, Result};
use crate::run::{InputFile, PipelineOutput, PipelineRun, ToolInput};
use crate::step::StepReport;

/// Runs the configured tool over `input`.
///
/// Options are validated first. Tabular tools read the first file; Invoice
/// Extractor reads all of them.
pub fn run_tool(input: &ToolInput, config: &ToolConfig) -> Result<PipelineOutput> {
    config.validate()?;
    let tool = config.tool();
    let files = input.files();
    let first = || files.first().ok_or(PipelineError::MissingInput { tool });
    match config {
        ToolConfig::ExcelFixIt(options) => excel_fix_it::run(first()?, options),
        ToolConfig::LeadScrubber(options) => lead_scrubber::run(first()?, options),
        ToolConfig::SheetsAutomation(options) => sheets_automation::run(first()?, options),
        ToolConfig::InvoiceExtractor(options) => {
            if files.is_empty() {
                return Err(PipelineError::MissingInput { tool });
            }
            invoice_extractor::run(files, options)
        }
        ToolConfig::QrGenerator(options) => qr_generator::run(first()?, options),
    }
}

/// Every step a tool can run, in declaration order.
pub fn step_order(tool: ToolId) -> &'static [&'static str] {
    match tool {
        ToolId::ExcelFixIt => excel_fix_it::STEPS,
        ToolId::LeadScrubber => lead_scrubber::STEPS,
        ToolId::SheetsAutomation => sheets_automation::STEPS,
        ToolId::InvoiceExtractor => invoice_extractor::STEPS,
        ToolId::QrGenerator => qr_generator::STEPS,
    }
}

/// Step 1 of every tabular tool.
fn parse_step(run: &mut PipelineRun, file: &InputFile, format: &CsvFormat) -> Result<Dataset> {
    run.step("parse_csv", || {
        let dataset = parse_csv(&file.bytes, format)?;
        let report = StepReport::new(format!(
            "Parsed {} rows and {} columns from {}",
            dataset.row_count(),
            dataset.column_count(),
            file.name
        ))
        .count("rows", dataset.row_count())
        .count("columns", dataset.column_count());
        Ok((dataset, report))
    })
}

/// Resolves a configured column against the dataset headers.
fn require_column(dataset: &Dataset, column: &str) -> Result<String> {
    dataset
        .resolve_column(column)
        .map(str::to_string)
        .ok_or_else(|| PipelineError::ColumnNotFound {
            column: column.to_string(),
        })
}

fn csv_artifact(name: &str, dataset: &Dataset, delimiter: u8) -> Result<Artifact> {
    let contents = write_csv(dataset, None, delimiter)
        .map_err(|err| PipelineError::step("generate_output", err))?;
    Ok(Artifact::csv(name, contents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowbench_model::{ExcelFixItOptions, InvoiceExtractorOptions};

    #[test]
    fn missing_input_is_an_error() {
        let config = ToolConfig::InvoiceExtractor(InvoiceExtractorOptions::default());
        let result = run_tool(&ToolInput::Batch(Vec::new()), &config);
        assert!(matches!(
            result,
            Err(PipelineError::MissingInput {
                tool: ToolId::InvoiceExtractor
            })
        ));

        let config = ToolConfig::ExcelFixIt(ExcelFixItOptions::default());
        let result = run_tool(&ToolInput::Batch(Vec::new()), &config);
        assert!(matches!(result, Err(PipelineError::MissingInput { .. })));
    }

    #[test]
    fn every_tool_starts_with_input_and_ends_with_output() {
        for tool in ToolId::ALL {
            let steps = step_order(tool);
            assert!(steps.len() >= 2, "{tool}");
            assert_eq!(steps.last(), Some(&"generate_output"), "{tool}");
        }
    }
}
