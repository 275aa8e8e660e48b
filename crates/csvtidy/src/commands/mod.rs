pub mod clean;
pub mod inspect;
pub mod serve;

use comfy_table::{presets::UTF8_FULL, Table};
use csvtidy_core::preview::Preview;
use csvtidy_core::report::FormatProblem;
use csvtidy_core::{CleaningReport, FormatIssue};

/// Issues printed by `clean`; the JSON report carries the rest.
pub const PRINTED_ISSUES: usize = 20;

pub fn report_table(report: &CleaningReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Metric", "Value"]);
    for (metric, value) in report.to_pairs() {
        table.add_row(vec![metric.to_string(), value]);
    }
    table
}

fn describe(problem: FormatProblem) -> String {
    match problem {
        FormatProblem::ExtraField => "extra field".to_string(),
        FormatProblem::Invalid(format) => format!("not a valid {format}"),
    }
}

/// Returns `None` when there is nothing to show.
pub fn issues_table(issues: &[FormatIssue], header: &[String]) -> Option<Table> {
    if issues.is_empty() {
        return None;
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Row", "Column", "Value", "Problem", "Fixed to"]);
    for issue in issues.iter().take(PRINTED_ISSUES) {
        let column = header
            .get(issue.column)
            .cloned()
            .unwrap_or_else(|| format!("#{}", issue.column));
        table.add_row(vec![
            issue.row.to_string(),
            column,
            issue.value.clone(),
            describe(issue.problem),
            issue.fixed_to.clone().unwrap_or_default(),
        ]);
    }
    Some(table)
}

pub fn preview_table(preview: &Preview) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(preview.header.clone());
    for row in &preview.rows {
        table.add_row(row.clone());
    }
    table
}
