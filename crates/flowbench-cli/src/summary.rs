use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};
use flowbench_pipeline::AuditStep;

use crate::commands::RunResult;

pub fn print_summary(result: &RunResult) {
    let output = &result.output;
    println!("Tool: {}", output.tool.display_name());
    if result.dry_run {
        println!("Output: (dry run, nothing written)");
    } else {
        println!("Output: {}", result.output_dir.display());
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Step"),
        header_cell("Description"),
        header_cell("Counts"),
        header_cell("Warnings"),
        header_cell("ms"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);
    for step in output.audit.steps() {
        table.add_row(vec![
            dim_cell(step.step_number()),
            Cell::new(step.step_name())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(step.description()),
            counts_cell(step),
            warning_count_cell(step.warnings().len()),
            Cell::new(step.duration_ms()),
        ]);
    }
    table.add_row(vec![
        dim_cell("-"),
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} steps", output.audit.steps().len())),
        dim_cell("-"),
        warning_count_cell(output.audit.total_warnings()).add_attribute(Attribute::Bold),
        Cell::new(output.audit.total_duration_ms()).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");

    print_counters(result);
    print_artifacts(result);
    print_warnings(result);
}

fn print_counters(result: &RunResult) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Summary"), header_cell("Value")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (key, value) in &result.output.summary {
        table.add_row(vec![Cell::new(key), Cell::new(value)]);
    }
    println!("{table}");
}

fn print_artifacts(result: &RunResult) {
    println!("Artifacts:");
    if result.dry_run {
        for artifact in &result.output.artifacts {
            println!("- {} ({} bytes, not written)", artifact.name, artifact.len());
        }
    } else {
        for path in &result.written {
            println!("- {}", path.display());
        }
    }
}

fn print_warnings(result: &RunResult) {
    let steps = result.output.audit.steps();
    if steps.iter().all(|step| step.warnings().is_empty()) {
        return;
    }
    eprintln!("Warnings:");
    for step in steps {
        for warning in step.warnings() {
            eprintln!("- [{}] {warning}", step.step_name());
        }
    }
}

/// Style for plain listing tables.
pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
    if table.column_count() >= 6 {
        table.set_constraints(vec![
            ColumnConstraint::LowerBoundary(Width::Fixed(3)),
            ColumnConstraint::UpperBoundary(Width::Fixed(24)),
            ColumnConstraint::UpperBoundary(Width::Percentage(45)),
            ColumnConstraint::UpperBoundary(Width::Percentage(30)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
            ColumnConstraint::LowerBoundary(Width::Fixed(5)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn counts_cell(step: &AuditStep) -> Cell {
    if step.counts().is_empty() {
        return dim_cell("-");
    }
    let counts: Vec<String> = step
        .counts()
        .iter()
        .map(|(name, count)| format!("{name}={count}"))
        .collect();
    Cell::new(counts.join("\n"))
}

fn warning_count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).fg(Color::Yellow)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
