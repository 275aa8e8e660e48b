use csvtidy_parser::Table;

use super::{CleaningPass, PassName, PassOutput};
use crate::error::{ConfigError, PassError};
use crate::options::{CleaningOptions, NullPolicy};
use crate::report::ReportDelta;

pub struct HandleNulls;

impl CleaningPass for HandleNulls {
    fn name(&self) -> PassName {
        PassName::HandleNulls
    }

    fn enabled(&self, options: &CleaningOptions) -> bool {
        options.handle_nulls
    }

    fn apply(&self, table: &Table, options: &CleaningOptions) -> Result<PassOutput, PassError> {
        if options.null_markers.iter().any(|m| m.trim().is_empty()) {
            return Err(PassError::new(
                PassName::HandleNulls,
                ConfigError::EmptyNullMarker,
            ));
        }

        let mut delta = ReportDelta::default();
        let mut rows = Vec::with_capacity(table.row_count());

        match options.null_policy {
            NullPolicy::Substitute => {
                for row in table.rows() {
                    let fields = row
                        .fields
                        .iter()
                        .map(|value| {
                            if options.is_null(value) {
                                delta.nulls_handled += 1;
                                options.null_sentinel.clone()
                            } else {
                                value.clone()
                            }
                        })
                        .collect();
                    rows.push(row.with_fields(fields));
                }
            }
            NullPolicy::DropRow => {
                for row in table.rows() {
                    let nulls = row.fields.iter().filter(|v| options.is_null(v)).count();
                    if nulls == 0 {
                        rows.push(row.clone());
                    } else {
                        delta.nulls_handled += nulls;
                        delta.rows_dropped_for_nulls += 1;
                    }
                }
            }
        }

        Ok(PassOutput {
            table: table.with_rows(rows),
            delta,
        })
    }
}
