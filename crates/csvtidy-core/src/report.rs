use csvtidy_parser::{Delimiter, FieldOverflow, Table};
use serde::{Deserialize, Serialize};

use crate::error::PassError;
use crate::options::FormatKind;
use crate::passes::PassName;

/// Upper bound on issues carried in a report; counts are never truncated.
pub const MAX_REPORTED_ISSUES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormatProblem {
    /// A field past the header width, dropped at parse time.
    ExtraField,
    Invalid(FormatKind),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatIssue {
    pub row: usize,
    pub column: usize,
    pub value: String,
    pub problem: FormatProblem,
    /// Replacement written to the table, when a deterministic fix existed.
    pub fixed_to: Option<String>,
}

impl From<FieldOverflow> for FormatIssue {
    fn from(overflow: FieldOverflow) -> Self {
        Self {
            row: overflow.row,
            column: overflow.column,
            value: overflow.value,
            problem: FormatProblem::ExtraField,
            fixed_to: None,
        }
    }
}

/// Counts contributed by a single pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportDelta {
    pub duplicates_removed: usize,
    pub nulls_handled: usize,
    pub rows_dropped_for_nulls: usize,
    pub fields_standardized: usize,
    pub format_errors_found: usize,
    pub format_errors_fixed: usize,
    pub issues: Vec<FormatIssue>,
}

impl ReportDelta {
    pub fn is_zero(&self) -> bool {
        *self == ReportDelta::default()
    }

    pub fn merge(&mut self, other: ReportDelta) {
        self.duplicates_removed += other.duplicates_removed;
        self.nulls_handled += other.nulls_handled;
        self.rows_dropped_for_nulls += other.rows_dropped_for_nulls;
        self.fields_standardized += other.fields_standardized;
        self.format_errors_found += other.format_errors_found;
        self.format_errors_fixed += other.format_errors_fixed;
        self.issues.extend(other.issues);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassSummary {
    pub pass: PassName,
    pub enabled: bool,
    pub applied: bool,
    pub error: Option<String>,
}

impl PassSummary {
    pub fn skipped(pass: PassName) -> Self {
        Self {
            pass,
            enabled: false,
            applied: false,
            error: None,
        }
    }

    pub fn applied(pass: PassName) -> Self {
        Self {
            pass,
            enabled: true,
            applied: true,
            error: None,
        }
    }

    pub fn failed(err: &PassError) -> Self {
        Self {
            pass: err.pass,
            enabled: true,
            applied: false,
            error: Some(err.source.to_string()),
        }
    }
}

/// What the parser observed before any pass ran.
#[derive(Debug, Clone)]
pub struct ParseSummary {
    pub total_rows: usize,
    pub delimiter: Delimiter,
    pub encoding: &'static str,
    pub padded_rows: usize,
    pub overflow: Vec<FieldOverflow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningReport {
    pub total_rows: usize,
    pub duplicates_removed: usize,
    pub nulls_handled: usize,
    pub rows_dropped_for_nulls: usize,
    pub fields_standardized: usize,
    pub format_errors_found: usize,
    pub format_errors_fixed: usize,
    pub final_rows: usize,
    pub padded_rows: usize,
    pub delimiter: Delimiter,
    pub encoding: String,
    pub passes: Vec<PassSummary>,
    pub format_issues: Vec<FormatIssue>,
    pub issues_truncated: bool,
}

impl CleaningReport {
    /// Merges per-pass deltas on top of the parse summary. Overflowing fields
    /// count as format errors that were found but not fixed.
    pub fn assemble(
        source: ParseSummary,
        passes: Vec<PassSummary>,
        deltas: impl IntoIterator<Item = ReportDelta>,
    ) -> Self {
        let mut total = ReportDelta {
            format_errors_found: source.overflow.len(),
            issues: source.overflow.into_iter().map(FormatIssue::from).collect(),
            ..ReportDelta::default()
        };
        for delta in deltas {
            total.merge(delta);
        }

        let issues_truncated = total.issues.len() > MAX_REPORTED_ISSUES;
        total.issues.truncate(MAX_REPORTED_ISSUES);

        let final_rows = source
            .total_rows
            .saturating_sub(total.duplicates_removed)
            .saturating_sub(total.rows_dropped_for_nulls);

        Self {
            total_rows: source.total_rows,
            duplicates_removed: total.duplicates_removed,
            nulls_handled: total.nulls_handled,
            rows_dropped_for_nulls: total.rows_dropped_for_nulls,
            fields_standardized: total.fields_standardized,
            format_errors_found: total.format_errors_found,
            format_errors_fixed: total.format_errors_fixed,
            final_rows,
            padded_rows: source.padded_rows,
            delimiter: source.delimiter,
            encoding: source.encoding.to_string(),
            passes,
            format_issues: total.issues,
            issues_truncated,
        }
    }

    /// Row count matches the table and every row is as wide as the header.
    pub fn is_consistent_with(&self, table: &Table) -> bool {
        let expected = self
            .total_rows
            .checked_sub(self.duplicates_removed)
            .and_then(|rows| rows.checked_sub(self.rows_dropped_for_nulls));
        expected == Some(self.final_rows)
            && self.final_rows == table.row_count()
            && table.rows().iter().all(|row| row.len() == table.width())
    }

    pub fn pass(&self, name: PassName) -> Option<&PassSummary> {
        self.passes.iter().find(|summary| summary.pass == name)
    }

    /// Ordered key/value view for plain-text display.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("totalRows", self.total_rows.to_string()),
            ("duplicatesRemoved", self.duplicates_removed.to_string()),
            ("nullsHandled", self.nulls_handled.to_string()),
            ("rowsDroppedForNulls", self.rows_dropped_for_nulls.to_string()),
            ("fieldsStandardized", self.fields_standardized.to_string()),
            ("formatErrorsFound", self.format_errors_found.to_string()),
            ("formatErrorsFixed", self.format_errors_fixed.to_string()),
            ("finalRows", self.final_rows.to_string()),
            ("paddedRows", self.padded_rows.to_string()),
            ("delimiter", self.delimiter.to_string()),
            ("encoding", self.encoding.clone()),
        ]
    }
}
