//! Cleaning passes. Each one is a pure `Table -> (Table, ReportDelta)`
//! transformation; the pipeline runs them in [`default_passes`] order.

mod dedup;
mod formats;
mod nulls;
mod standardize;

use std::fmt;

use csvtidy_parser::Table;
use serde::{Deserialize, Serialize};

use crate::error::PassError;
use crate::options::CleaningOptions;
use crate::report::ReportDelta;

pub use dedup::{row_digest, RemoveDuplicates};
pub use formats::{check_value, ValidateFormats, Verdict};
pub use nulls::HandleNulls;
pub use standardize::{standardize_value, StandardizeText};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PassName {
    StandardizeText,
    HandleNulls,
    RemoveDuplicates,
    ValidateFormats,
}

impl PassName {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassName::StandardizeText => "standardizeText",
            PassName::HandleNulls => "handleNulls",
            PassName::RemoveDuplicates => "removeDuplicates",
            PassName::ValidateFormats => "validateFormats",
        }
    }
}

impl fmt::Display for PassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct PassOutput {
    pub table: Table,
    pub delta: ReportDelta,
}

impl PassOutput {
    pub fn unchanged(table: &Table) -> Self {
        Self {
            table: table.clone(),
            delta: ReportDelta::default(),
        }
    }
}

pub trait CleaningPass: Send + Sync {
    fn name(&self) -> PassName;
    fn enabled(&self, options: &CleaningOptions) -> bool;
    /// Either returns a complete new table or an error; never a partial result.
    fn apply(&self, table: &Table, options: &CleaningOptions) -> Result<PassOutput, PassError>;

    /// Disabled passes contribute an untouched table and a zero delta.
    fn run(&self, table: &Table, options: &CleaningOptions) -> Result<PassOutput, PassError> {
        if self.enabled(options) {
            self.apply(table, options)
        } else {
            Ok(PassOutput::unchanged(table))
        }
    }
}

/// Dedup must see standardized and null-substituted values, and validation
/// must see the final content.
pub fn default_passes() -> [&'static dyn CleaningPass; 4] {
    [
        &StandardizeText,
        &HandleNulls,
        &RemoveDuplicates,
        &ValidateFormats,
    ]
}
