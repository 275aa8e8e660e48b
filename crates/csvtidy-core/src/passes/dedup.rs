use std::collections::HashSet;

use csvtidy_parser::Table;

use super::{CleaningPass, PassName, PassOutput};
use crate::error::PassError;
use crate::options::CleaningOptions;
use crate::report::ReportDelta;

/// Digest of a row's field values. Fields are length-prefixed so that
/// `["ab", "c"]` and `["a", "bc"]` differ.
pub fn row_digest(fields: &[String]) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    for field in fields {
        hasher.update(&(field.len() as u64).to_le_bytes());
        hasher.update(field.as_bytes());
    }
    hasher.finalize()
}

/// Exact-match dedup. First occurrence wins and survivors keep their order.
pub struct RemoveDuplicates;

impl CleaningPass for RemoveDuplicates {
    fn name(&self) -> PassName {
        PassName::RemoveDuplicates
    }

    fn enabled(&self, options: &CleaningOptions) -> bool {
        options.remove_duplicates
    }

    fn apply(&self, table: &Table, _options: &CleaningOptions) -> Result<PassOutput, PassError> {
        let mut seen = HashSet::with_capacity(table.row_count());
        let mut duplicates = 0;

        let rows = table
            .rows()
            .iter()
            .filter(|row| {
                let unique = seen.insert(row_digest(&row.fields));
                if !unique {
                    duplicates += 1;
                }
                unique
            })
            .cloned()
            .collect();

        Ok(PassOutput {
            table: table.with_rows(rows),
            delta: ReportDelta {
                duplicates_removed: duplicates,
                ..ReportDelta::default()
            },
        })
    }
}
