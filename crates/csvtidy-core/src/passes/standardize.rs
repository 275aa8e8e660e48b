use csvtidy_parser::Table;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{CleaningPass, PassName, PassOutput};
use crate::error::PassError;
use crate::options::{CaseRule, CleaningOptions};
use crate::report::ReportDelta;

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("failed to compile whitespace regex"));

/// Trims, collapses internal whitespace runs to one space, then applies `rule`.
pub fn standardize_value(value: &str, rule: CaseRule) -> String {
    let collapsed = WHITESPACE.replace_all(value.trim(), " ");
    rule.apply(&collapsed)
}

pub struct StandardizeText;

impl StandardizeText {
    fn case_mask(table: &Table, options: &CleaningOptions) -> Result<Vec<bool>, PassError> {
        if options.case_rule == CaseRule::Preserve {
            return Ok(vec![false; table.width()]);
        }
        if options.case_columns.is_empty() {
            return Ok(vec![true; table.width()]);
        }

        let mut mask = vec![false; table.width()];
        for column in &options.case_columns {
            let idx = column
                .resolve(table)
                .map_err(|err| PassError::new(PassName::StandardizeText, err))?;
            mask[idx] = true;
        }
        Ok(mask)
    }
}

impl CleaningPass for StandardizeText {
    fn name(&self) -> PassName {
        PassName::StandardizeText
    }

    fn enabled(&self, options: &CleaningOptions) -> bool {
        options.standardize_text
    }

    fn apply(&self, table: &Table, options: &CleaningOptions) -> Result<PassOutput, PassError> {
        let mask = Self::case_mask(table, options)?;
        let mut changed = 0;

        let rows = table
            .rows()
            .iter()
            .map(|row| {
                let fields = row
                    .fields
                    .iter()
                    .zip(&mask)
                    .map(|(value, &apply_case)| {
                        let rule = if apply_case {
                            options.case_rule
                        } else {
                            CaseRule::Preserve
                        };
                        let standardized = standardize_value(value, rule);
                        if standardized != *value {
                            changed += 1;
                        }
                        standardized
                    })
                    .collect();
                row.with_fields(fields)
            })
            .collect();

        Ok(PassOutput {
            table: table.with_rows(rows),
            delta: ReportDelta {
                fields_standardized: changed,
                ..ReportDelta::default()
            },
        })
    }
}
