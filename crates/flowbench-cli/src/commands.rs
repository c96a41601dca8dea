use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::Table;
use flowbench_cli::config::load_tool_config;
use flowbench_cli::files::{default_output_dir, parse_row, read_inputs, write_artifacts};
use flowbench_cli::logging::redact_value;
use flowbench_model::ToolId;
use flowbench_pipeline::{PipelineOutput, run_tool, step_order};
use flowbench_transform::{Condition, Operator};
use tracing::{info, info_span, trace};

use crate::cli::{CheckRuleArgs, RunArgs};
use crate::summary::apply_table_style;

/// A finished run and where its artifacts went.
#[derive(Debug)]
pub struct RunResult {
    pub output: PipelineOutput,
    pub output_dir: PathBuf,
    /// Empty for dry runs.
    pub written: Vec<PathBuf>,
    pub dry_run: bool,
}

pub fn run_pipeline(args: &RunArgs) -> Result<RunResult> {
    let config = load_tool_config(&args.config)?;
    let tool = config.tool();
    let span = info_span!("run", tool = %tool);
    let _guard = span.enter();

    let input = read_inputs(tool, &args.inputs)?;
    let output = run_tool(&input, &config).with_context(|| format!("{tool} run failed"))?;

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| default_output_dir(&args.inputs));
    let written = if args.dry_run {
        info!(artifacts = output.artifacts.len(), "dry run; nothing written");
        Vec::new()
    } else {
        write_artifacts(&output_dir, &output.artifacts)?
    };

    Ok(RunResult {
        output,
        output_dir,
        written,
        dry_run: args.dry_run,
    })
}

pub fn run_tools() {
    let mut table = Table::new();
    table.set_header(vec!["Tool", "Id", "Input", "Steps"]);
    apply_table_style(&mut table);
    for tool in ToolId::ALL {
        let input = if tool.is_batch() {
            "documents"
        } else {
            "CSV"
        };
        table.add_row(vec![
            tool.display_name().to_string(),
            tool.as_str().to_string(),
            input.to_string(),
            step_order(tool).join(" -> "),
        ]);
    }
    println!("{table}");
}

/// Evaluates the condition against the row; returns whether it matched.
pub fn run_check_rule(args: &CheckRuleArgs) -> Result<bool> {
    let row = parse_row(&args.row)?;
    for (column, value) in row.iter() {
        trace!(column, value = redact_value(&value.as_text()), "rule input");
    }

    let Some(condition) = Condition::parse(&args.condition) else {
        println!("Condition could not be parsed; it never matches.");
        let operators: Vec<&str> = Operator::ALL.iter().map(Operator::as_str).collect();
        println!("Operators: {}", operators.join(", "));
        return Ok(false);
    };
    let matched = condition.matches(&row);
    let cell = match row.get(&condition.column) {
        Some(value) => value.as_text(),
        None => "(missing)".to_string(),
    };
    println!(
        "{} {} {:?} -> {matched}",
        condition.column, condition.operator, condition.value
    );
    println!("  {} = {:?}", condition.column, cell);
    Ok(matched)
}
