//! Lead Scrubber: contact list cleanup.

use flowbench_model::{Dataset, LeadScrubberOptions, ToolId, Value};
use flowbench_transform::{dedupe_by_column, normalize_name, validate_email};

use super::{csv_artifact, parse_step, require_column};
use crate::error::Result;
use crate::run::{InputFile, PipelineOutput, PipelineRun};
use crate::step::StepReport;

pub const OUTPUT_FILE: &str = "leads.csv";

/// Column added with the business domain of each valid email.
pub const COMPANY_DOMAIN_COLUMN: &str = "company_domain";

pub const STEPS: &[&str] = &[
    "parse_csv",
    "normalize_names",
    "validate_emails",
    "remove_invalid_emails",
    "dedupe_by_email",
    "generate_output",
];

/// Tallies from the email validation step.
#[derive(Debug, Default)]
struct EmailTally {
    /// Validity of every row, aligned with `dataset.rows`.
    valid: Vec<bool>,
    valid_count: usize,
    invalid_count: usize,
    free_provider_count: usize,
    warnings: Vec<String>,
}

pub fn run(file: &InputFile, options: &LeadScrubberOptions) -> Result<PipelineOutput> {
    let mut run = PipelineRun::new(ToolId::LeadScrubber);
    let mut dataset = parse_step(&mut run, file, &options.csv)?;
    let email_column = require_column(&dataset, &options.email_column)?;
    run.record("leadsIn", dataset.row_count());

    if options.normalize_names {
        let normalized = run.step("normalize_names", || {
            Ok(normalize_names(&mut dataset, &options.name_column))
        })?;
        run.record("namesNormalized", normalized);
    }

    let tally = run.step("validate_emails", || {
        let mut tally = validate_emails(&mut dataset, &email_column);
        let warnings = std::mem::take(&mut tally.warnings);
        let report = StepReport::new(format!(
            "Validated {} emails: {} valid, {} invalid",
            tally.valid.len(),
            tally.valid_count,
            tally.invalid_count
        ))
        .count("valid_emails", tally.valid_count)
        .count("invalid_emails", tally.invalid_count)
        .count("free_provider_emails", tally.free_provider_count)
        .warnings_capped(warnings);
        Ok((tally, report))
    })?;
    run.record("validEmails", tally.valid_count);
    run.record("invalidEmails", tally.invalid_count);

    if options.remove_invalid {
        let removed = run.step("remove_invalid_emails", || {
            let before = dataset.rows.len();
            let mut validity = tally.valid.iter();
            dataset
                .rows
                .retain(|_| validity.next().copied().unwrap_or(true));
            let removed = before - dataset.rows.len();
            let report = StepReport::new(format!("Removed {removed} rows with invalid emails"))
                .count("invalid_removed", removed);
            Ok((removed, report))
        })?;
        run.record("invalidRemoved", removed);
    }

    if options.dedupe_by_email {
        let removed = run.step("dedupe_by_email", || {
            let removed = dedupe_by_column(&mut dataset, &email_column);
            let report = StepReport::new(format!("Removed {removed} duplicate emails"))
                .count("duplicates_removed", removed);
            Ok((removed, report))
        })?;
        run.record("duplicatesRemoved", removed);
    }

    let artifact = run.step("generate_output", || {
        let artifact = csv_artifact(OUTPUT_FILE, &dataset, options.csv.delimiter_byte())?;
        let report = StepReport::new(format!(
            "Wrote {} leads to {OUTPUT_FILE}",
            dataset.row_count()
        ))
        .count("rows", dataset.row_count());
        Ok((artifact, report))
    })?;
    run.record("leadsOut", dataset.row_count());

    run.finish(vec![artifact])
}

fn normalize_names(dataset: &mut Dataset, name_column: &str) -> (usize, StepReport) {
    let Some(column) = dataset.resolve_column(name_column).map(str::to_string) else {
        let report = StepReport::new("No name column to normalize")
            .count("names_normalized", 0)
            .warn(format!("column '{name_column}' not found; names left unchanged"));
        return (0, report);
    };

    let mut normalized = 0;
    for row in &mut dataset.rows {
        if let Some(Value::Text(name)) = row.get_mut(&column) {
            let clean = normalize_name(name);
            if clean != *name {
                *name = clean;
                normalized += 1;
            }
        }
    }
    let report = StepReport::new(format!("Normalized {normalized} names in '{column}'"))
        .count("names_normalized", normalized);
    (normalized, report)
}

/// Normalizes every email in place and adds the company domain column.
fn validate_emails(dataset: &mut Dataset, email_column: &str) -> EmailTally {
    let mut tally = EmailTally::default();
    for (idx, row) in dataset.rows.iter_mut().enumerate() {
        let raw = row.get(email_column).map(Value::as_text).unwrap_or_default();
        let check = validate_email(&raw);
        if let Some(Value::Text(email)) = row.get_mut(email_column) {
            email.clone_from(&check.normalized);
        }

        if check.is_valid {
            tally.valid_count += 1;
            if check.company_domain.is_none() {
                tally.free_provider_count += 1;
            }
        } else {
            tally.invalid_count += 1;
            if let Some(reason) = check.reason {
                tally.warnings.push(format!("row {}: {}", idx + 1, reason.as_str()));
            }
        }
        tally.valid.push(check.is_valid);
        row.set(COMPANY_DOMAIN_COLUMN, check.company_domain);
    }
    dataset.recompute_headers();
    tally
}
