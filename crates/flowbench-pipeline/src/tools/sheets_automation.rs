//! Sheets Automation: rule-driven labeling, routing, and rollups.

use std::collections::HashMap;

use flowbench_model::{
    Artifact, Dataset, ROLLUP_COUNT_COLUMN, Recipe, Row, Rule, SheetsAutomationOptions, ToolId,
    Value,
};
use flowbench_transform::Condition;

use super::{csv_artifact, parse_step, require_column};
use crate::error::Result;
use crate::run::{InputFile, PipelineOutput, PipelineRun};
use crate::step::StepReport;

pub const OUTPUT_FILE: &str = "automated.csv";

pub const STEPS: &[&str] = &[
    "parse_csv",
    "label_rows",
    "move_rows",
    "rollup_rows",
    "generate_output",
];

/// Result of the recipe step: one dataset, or one per sheet.
enum Automated {
    Single(Dataset),
    Sheets(Vec<Sheet>),
}

struct Sheet {
    slug: String,
    dataset: Dataset,
}

struct Rollup {
    dataset: Dataset,
    filtered_out: usize,
    non_numeric: usize,
}

pub fn run(file: &InputFile, options: &SheetsAutomationOptions) -> Result<PipelineOutput> {
    let mut run = PipelineRun::new(ToolId::SheetsAutomation);
    let mut dataset = parse_step(&mut run, file, &options.csv)?;
    run.record("recipe", options.recipe.name());
    run.record("rowsIn", dataset.row_count());

    let automated = match &options.recipe {
        Recipe::Label {
            rules,
            label_column,
            default_label,
        } => {
            let (labeled, unlabeled) = run.step("label_rows", || {
                Ok(label_rows(
                    &mut dataset,
                    rules,
                    label_column,
                    default_label.as_deref(),
                ))
            })?;
            run.record("rowsLabeled", labeled);
            run.record("rowsUnlabeled", unlabeled);
            Automated::Single(dataset)
        }
        Recipe::Move {
            rules,
            unmatched_sheet,
        } => {
            let (sheets, moved, unmatched) = run.step("move_rows", || {
                Ok(move_rows(dataset, rules, unmatched_sheet))
            })?;
            run.record("rowsMoved", moved);
            run.record("rowsUnmatched", unmatched);
            run.record("sheets", sheets.len());
            Automated::Sheets(sheets)
        }
        Recipe::Rollup {
            group_by,
            sum_columns,
            filter,
        } => {
            let group_by = require_column(&dataset, group_by)?;
            let sum_columns = sum_columns
                .iter()
                .map(|column| require_column(&dataset, column))
                .collect::<Result<Vec<_>>>()?;
            let rollup = run.step("rollup_rows", || {
                Ok(rollup_rows(&dataset, &group_by, &sum_columns, filter.as_deref()))
            })?;
            run.record("groups", rollup.dataset.row_count());
            run.record("rowsFilteredOut", rollup.filtered_out);
            run.record("nonNumericSkipped", rollup.non_numeric);
            Automated::Single(rollup.dataset)
        }
    };

    let delimiter = options.csv.delimiter_byte();
    let (artifacts, rows_out) = run.step("generate_output", || {
        let (artifacts, rows_out) = match &automated {
            Automated::Single(dataset) => (
                vec![csv_artifact(OUTPUT_FILE, dataset, delimiter)?],
                dataset.row_count(),
            ),
            Automated::Sheets(sheets) => {
                let artifacts = sheets
                    .iter()
                    .map(|sheet| {
                        csv_artifact(&format!("{}.csv", sheet.slug), &sheet.dataset, delimiter)
                    })
                    .collect::<Result<Vec<Artifact>>>()?;
                let rows: usize = sheets.iter().map(|sheet| sheet.dataset.row_count()).sum();
                (artifacts, rows)
            }
        };
        let report = StepReport::new(format!(
            "Wrote {rows_out} rows to {} files",
            artifacts.len()
        ))
        .count("rows", rows_out)
        .count("files", artifacts.len());
        Ok(((artifacts, rows_out), report))
    })?;
    run.record("rowsOut", rows_out);

    run.finish(artifacts)
}

/// Parses every rule condition once; unusable conditions never match.
fn compile_rules(rules: &[Rule]) -> (Vec<(Option<Condition>, &str)>, Vec<String>) {
    let mut warnings = Vec::new();
    let compiled = rules
        .iter()
        .enumerate()
        .map(|(idx, rule)| {
            let condition = Condition::parse(&rule.condition);
            if condition.is_none() {
                warnings.push(format!(
                    "rule {}: condition '{}' cannot be evaluated and never matches",
                    idx + 1,
                    rule.condition
                ));
            }
            (condition, rule.label.as_str())
        })
        .collect();
    (compiled, warnings)
}

fn first_match<'a>(rules: &[(Option<Condition>, &'a str)], row: &Row) -> Option<&'a str> {
    rules.iter().find_map(|(condition, label)| {
        condition
            .as_ref()
            .is_some_and(|condition| condition.matches(row))
            .then_some(*label)
    })
}

fn label_rows(
    dataset: &mut Dataset,
    rules: &[Rule],
    label_column: &str,
    default_label: Option<&str>,
) -> ((usize, usize), StepReport) {
    let (compiled, warnings) = compile_rules(rules);
    let mut labeled = 0;
    let mut unlabeled = 0;
    for row in &mut dataset.rows {
        let label = match first_match(&compiled, row) {
            Some(label) => {
                labeled += 1;
                Some(label)
            }
            None => {
                unlabeled += 1;
                default_label
            }
        };
        row.set(label_column, label);
    }
    dataset.recompute_headers();

    let report = StepReport::new(format!(
        "Labeled {labeled} rows into '{label_column}' using {} rules",
        rules.len()
    ))
    .count("rows_labeled", labeled)
    .count("rows_unlabeled", unlabeled)
    .warnings_capped(warnings);
    ((labeled, unlabeled), report)
}

fn move_rows(
    dataset: Dataset,
    rules: &[Rule],
    unmatched_sheet: &str,
) -> ((Vec<Sheet>, usize, usize), StepReport) {
    let (compiled, warnings) = compile_rules(rules);
    let Dataset { headers, rows } = dataset;
    let mut sheets: Vec<Sheet> = Vec::new();
    let mut sheet_index: HashMap<String, usize> = HashMap::new();
    let mut moved = 0;
    let mut unmatched = 0;
    for row in rows {
        let target = match first_match(&compiled, &row) {
            Some(target) => {
                moved += 1;
                target
            }
            None => {
                unmatched += 1;
                unmatched_sheet
            }
        };
        let slug = sheet_slug(target);
        match sheet_index.get(&slug) {
            Some(&idx) => sheets[idx].dataset.rows.push(row),
            None => {
                sheet_index.insert(slug.clone(), sheets.len());
                sheets.push(Sheet {
                    slug,
                    dataset: Dataset::new(headers.clone(), vec![row]),
                });
            }
        }
    }

    let report = StepReport::new(format!(
        "Moved {moved} rows into {} sheets",
        sheets.len()
    ))
    .count("rows_moved", moved)
    .count("rows_unmatched", unmatched)
    .count("sheets", sheets.len())
    .warnings_capped(warnings);
    ((sheets, moved, unmatched), report)
}

/// Groups rows by `group_by` in first-seen order with a count and column sums.
fn rollup_rows(
    dataset: &Dataset,
    group_by: &str,
    sum_columns: &[String],
    filter: Option<&str>,
) -> (Rollup, StepReport) {
    let filter = filter.map(|condition| (condition, Condition::parse(condition)));
    let mut warnings = Vec::new();
    if let Some((text, None)) = &filter {
        warnings.push(format!(
            "filter '{text}' cannot be evaluated; every row is filtered out"
        ));
    }

    let mut groups: Vec<(String, usize, Vec<f64>)> = Vec::new();
    let mut group_index: HashMap<String, usize> = HashMap::new();
    let mut filtered_out = 0;
    let mut non_numeric = 0;
    for (idx, row) in dataset.rows.iter().enumerate() {
        if let Some((_, condition)) = &filter
            && !condition.as_ref().is_some_and(|condition| condition.matches(row))
        {
            filtered_out += 1;
            continue;
        }

        let key = row.get(group_by).map(Value::as_text).unwrap_or_default();
        let group_idx = *group_index.entry(key).or_insert_with_key(|key| {
            groups.push((key.clone(), 0, vec![0.0; sum_columns.len()]));
            groups.len() - 1
        });
        let (_, count, sums) = &mut groups[group_idx];
        *count += 1;
        for (column, sum) in sum_columns.iter().zip(sums.iter_mut()) {
            let Some(value) = row.get(column).filter(|value| !value.is_blank()) else {
                continue;
            };
            let number = value.as_number();
            if number.is_nan() {
                non_numeric += 1;
                warnings.push(format!(
                    "row {}: '{}' in column '{column}' is not numeric",
                    idx + 1,
                    value.as_text()
                ));
            } else {
                *sum += number;
            }
        }
    }

    let mut headers = vec![group_by.to_string(), ROLLUP_COUNT_COLUMN.to_string()];
    headers.extend(sum_columns.iter().cloned());
    let rows = groups
        .into_iter()
        .map(|(key, count, sums)| {
            let mut row = Row::new();
            row.set(group_by, key);
            row.set(ROLLUP_COUNT_COLUMN, count as f64);
            for (column, sum) in sum_columns.iter().zip(sums) {
                row.set(column.as_str(), sum);
            }
            row
        })
        .collect::<Vec<_>>();

    let report = StepReport::new(format!(
        "Rolled up {} rows into {} groups by '{group_by}'",
        dataset.row_count() - filtered_out,
        rows.len()
    ))
    .count("groups", rows.len())
    .count("rows_filtered_out", filtered_out)
    .count("non_numeric_skipped", non_numeric)
    .warnings_capped(warnings);
    let rollup = Rollup {
        dataset: Dataset::new(headers, rows),
        filtered_out,
        non_numeric,
    };
    (rollup, report)
}

/// File-safe sheet name: lowercase alphanumerics separated by `_`.
pub fn sheet_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("sheet");
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs() {
        assert_eq!(sheet_slug("High Value!"), "high_value");
        assert_eq!(sheet_slug("  Q1 / Q2  "), "q1_q2");
        assert_eq!(sheet_slug("???"), "sheet");
    }

    #[test]
    fn unparseable_rule_is_reported() {
        let rules = [Rule::new("amount", "x")];
        let (compiled, warnings) = compile_rules(&rules);
        assert!(compiled[0].0.is_none());
        assert_eq!(
            warnings,
            vec!["rule 1: condition 'amount' cannot be evaluated and never matches"]
        );
    }

    #[test]
    fn move_groups_interleaved_rows_by_slug() {
        let dataset = Dataset::new(
            vec!["amount".into()],
            vec![
                Row::from_pairs([("amount", "500")]),
                Row::from_pairs([("amount", "5")]),
                Row::from_pairs([("amount", "250")]),
                Row::from_pairs([("amount", "50")]),
                Row::from_pairs([("amount", "900")]),
            ],
        );
        let rules = [
            Rule::new("amount > 400", "High Value"),
            Rule::new("amount > 200", "high-value"),
            Rule::new("amount > 20", "Mid"),
        ];
        let ((sheets, moved, unmatched), _) = move_rows(dataset, &rules, "unmatched");

        let layout: Vec<(&str, Vec<String>)> = sheets
            .iter()
            .map(|sheet| {
                let amounts = sheet
                    .dataset
                    .rows
                    .iter()
                    .map(|row| row.get("amount").map(Value::as_text).unwrap_or_default())
                    .collect();
                (sheet.slug.as_str(), amounts)
            })
            .collect();
        assert_eq!(
            layout,
            vec![
                ("high_value", vec!["500".to_string(), "250".into(), "900".into()]),
                ("unmatched", vec!["5".to_string()]),
                ("mid", vec!["50".to_string()]),
            ]
        );
        assert_eq!((moved, unmatched), (4, 1));
    }

    #[test]
    fn rollup_sums_and_counts_in_first_seen_order() {
        let dataset = Dataset::new(
            vec!["region".into(), "amount".into()],
            vec![
                Row::from_pairs([("region", "west"), ("amount", "10")]),
                Row::from_pairs([("region", "east"), ("amount", "5")]),
                Row::from_pairs([("region", "west"), ("amount", "2.5")]),
                Row::from_pairs([("region", "east"), ("amount", "n/a")]),
            ],
        );
        let (rollup, report) = rollup_rows(&dataset, "region", &["amount".to_string()], None);
        let rolled = rollup.dataset;
        assert_eq!(rolled.headers, vec!["region", "count", "amount"]);
        assert_eq!(rolled.rows[0].get("region"), Some(&Value::text("west")));
        assert_eq!(rolled.rows[0].get("amount"), Some(&Value::Number(12.5)));
        assert_eq!(rolled.rows[1].get("count"), Some(&Value::Number(2.0)));
        assert_eq!(rolled.rows[1].get("amount"), Some(&Value::Number(5.0)));
        assert_eq!(report.counts["non_numeric_skipped"], 1);
        assert_eq!(report.warnings, vec!["row 4: 'n/a' in column 'amount' is not numeric"]);
    }

    #[test]
    fn rollup_filter_drops_rows() {
        let dataset = Dataset::new(
            vec!["team".into(), "hours".into()],
            vec![
                Row::from_pairs([("team", "a"), ("hours", "8")]),
                Row::from_pairs([("team", "a"), ("hours", "1")]),
            ],
        );
        let (rollup, report) =
            rollup_rows(&dataset, "team", &["hours".to_string()], Some("hours >= 2"));
        assert_eq!(report.counts["rows_filtered_out"], 1);
        assert_eq!(rollup.filtered_out, 1);
        assert_eq!(rollup.dataset.rows[0].get("hours"), Some(&Value::Number(8.0)));
    }
}
