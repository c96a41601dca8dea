//! Excel Fix It: spreadsheet cleanup.

use flowbench_model::{Dataset, ExcelFixItOptions, ToolId, Value};
use flowbench_transform::{
    dedupe_rows, is_us_date, merge_columns, normalize_date, remove_empty_rows, split_column,
    trim_cells,
};

use super::{csv_artifact, parse_step};
use crate::error::Result;
use crate::run::{InputFile, PipelineOutput, PipelineRun};
use crate::step::StepReport;

pub const OUTPUT_FILE: &str = "cleaned.csv";

pub const STEPS: &[&str] = &[
    "parse_csv",
    "trim_whitespace",
    "remove_empty_rows",
    "remove_duplicates",
    "fix_dates",
    "split_column",
    "merge_columns",
    "generate_output",
];

pub fn run(file: &InputFile, options: &ExcelFixItOptions) -> Result<PipelineOutput> {
    let mut run = PipelineRun::new(ToolId::ExcelFixIt);
    let mut dataset = parse_step(&mut run, file, &options.csv)?;
    run.record("rowsIn", dataset.row_count());

    if options.trim_whitespace {
        let trimmed = run.step("trim_whitespace", || {
            let trimmed = trim_cells(&mut dataset);
            let report = StepReport::new(format!("Trimmed whitespace in {trimmed} cells"))
                .count("cells_trimmed", trimmed);
            Ok((trimmed, report))
        })?;
        run.record("cellsTrimmed", trimmed);
    }

    if options.remove_empty_rows {
        let removed = run.step("remove_empty_rows", || {
            let removed = remove_empty_rows(&mut dataset);
            let report = StepReport::new(format!("Removed {removed} empty rows"))
                .count("empty_rows_removed", removed);
            Ok((removed, report))
        })?;
        run.record("emptyRowsRemoved", removed);
    }

    if options.remove_duplicates {
        let removed = run.step("remove_duplicates", || {
            let removed = dedupe_rows(&mut dataset);
            let report = StepReport::new(format!("Removed {removed} duplicate rows"))
                .count("duplicates_removed", removed);
            Ok((removed, report))
        })?;
        run.record("duplicatesRemoved", removed);
    }

    if options.fix_dates {
        let fixed = run.step("fix_dates", || Ok(fix_dates(&mut dataset)))?;
        run.record("datesFixed", fixed);
    }

    if let Some(split) = &options.split_column {
        let rows_split = run.step("split_column", || {
            let column = dataset
                .resolve_column(&split.column)
                .unwrap_or(&split.column)
                .to_string();
            let outcome = split_column(&mut dataset, &column, &split.delimiter);
            let mut report = StepReport::new(format!(
                "Split '{column}' on '{}' in {} rows",
                split.delimiter, outcome.rows_affected
            ))
            .count("rows_affected", outcome.rows_affected)
            .count("columns_added", outcome.columns_added);
            if outcome.rows_affected == 0 {
                report = report.warn(format!("no row has a text value in column '{column}'"));
            }
            Ok((outcome.rows_affected, report))
        })?;
        run.record("rowsSplit", rows_split);
    }

    if let Some(merge) = &options.merge_columns {
        let rows_merged = run.step("merge_columns", || {
            let rows = merge_columns(&mut dataset, &merge.template, &merge.target);
            let report = StepReport::new(format!(
                "Merged '{}' into '{}' for {rows} rows",
                merge.template, merge.target
            ))
            .count("rows_affected", rows);
            Ok((rows, report))
        })?;
        run.record("rowsMerged", rows_merged);
    }

    let artifact = run.step("generate_output", || {
        let artifact = csv_artifact(OUTPUT_FILE, &dataset, options.csv.delimiter_byte())?;
        let report = StepReport::new(format!(
            "Wrote {} rows to {OUTPUT_FILE}",
            dataset.row_count()
        ))
        .count("rows", dataset.row_count());
        Ok((artifact, report))
    })?;
    run.record("rowsOut", dataset.row_count());

    run.finish(vec![artifact])
}

/// Rewrites US-style dates to ISO 8601.
///
/// Only text cells matching the US date pattern are touched; pattern matches
/// that are not real calendar dates stay as they are and produce a warning.
fn fix_dates(dataset: &mut Dataset) -> (usize, StepReport) {
    let mut fixed = 0;
    let mut warnings = Vec::new();
    for (idx, row) in dataset.rows.iter_mut().enumerate() {
        for (column, value) in row.iter_mut() {
            let Value::Text(text) = value else {
                continue;
            };
            if !is_us_date(text) {
                continue;
            }
            match normalize_date(text) {
                Some(iso) => {
                    *text = iso;
                    fixed += 1;
                }
                None => warnings.push(format!(
                    "row {}: '{text}' in column '{column}' is not a valid date",
                    idx + 1
                )),
            }
        }
    }
    let report = StepReport::new(format!("Normalized {fixed} dates to YYYY-MM-DD"))
        .count("dates_fixed", fixed)
        .warnings_capped(warnings);
    (fixed, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditStep;

    fn input(text: &str) -> InputFile {
        InputFile::new("sheet.csv", text)
    }

    #[test]
    fn disabled_steps_are_not_audited() {
        let output = run(&input("a\n1\n"), &ExcelFixItOptions::default()).unwrap();
        let names: Vec<_> = output.audit.steps().iter().map(AuditStep::step_name).collect();
        assert_eq!(names, vec!["parse_csv", "generate_output"]);
        assert_eq!(output.artifact_text(OUTPUT_FILE), Some("a\n1\n"));
    }

    #[test]
    fn trimming_runs_before_date_fixing() {
        let options = ExcelFixItOptions {
            trim_whitespace: true,
            fix_dates: true,
            ..ExcelFixItOptions::default()
        };
        let output = run(&input("when\n 03/15/2024 \n"), &options).unwrap();
        assert_eq!(output.artifact_text(OUTPUT_FILE), Some("when\n2024-03-15\n"));
        assert_eq!(output.audit.step("fix_dates").unwrap().count("dates_fixed"), Some(1));
    }

    #[test]
    fn invalid_us_dates_warn_and_stay() {
        let options = ExcelFixItOptions {
            fix_dates: true,
            ..ExcelFixItOptions::default()
        };
        let output = run(&input("when\n13/45/2024\n"), &options).unwrap();
        let step = output.audit.step("fix_dates").unwrap();
        assert_eq!(step.count("dates_fixed"), Some(0));
        assert_eq!(
            step.warnings(),
            ["row 1: '13/45/2024' in column 'when' is not a valid date"]
        );
        assert_eq!(output.artifact_text(OUTPUT_FILE), Some("when\n13/45/2024\n"));
    }
}
