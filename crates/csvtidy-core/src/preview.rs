use std::path::Path;

use csvtidy_parser::{write_table, Delimiter, ParserError, Row, Table};
use serde::{Deserialize, Serialize};

use crate::error::UploadError;

/// Data rows shown in a preview, header excluded.
pub const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub has_more: bool,
}

impl Preview {
    pub fn of(table: &Table) -> Self {
        Self::with_limit(table, PREVIEW_ROWS)
    }

    pub fn with_limit(table: &Table, limit: usize) -> Self {
        Self {
            header: table.header().to_vec(),
            rows: table
                .rows()
                .iter()
                .take(limit)
                .map(|row| row.fields.clone())
                .collect(),
            has_more: table.row_count() > limit,
        }
    }

    /// CSV text of the previewed rows.
    pub fn render(&self, delimiter: Delimiter) -> Result<String, ParserError> {
        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(index, fields)| Row::new(index, fields.clone()))
            .collect();
        let table = Table::new(self.header.clone(), rows);
        let bytes = write_table(&table, delimiter)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Human-readable size in Bytes/KB/MB/GB with at most two decimals.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

fn has_csv_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

pub fn ensure_csv_file_name(name: &str) -> Result<(), UploadError> {
    if has_csv_extension(name) {
        Ok(())
    } else {
        Err(UploadError::NotCsv {
            name: name.to_string(),
        })
    }
}

/// `sales.csv` -> `sales_clean.csv`. Directory components are dropped.
pub fn cleaned_file_name(name: &str) -> String {
    let path = Path::new(name);
    let stem = if has_csv_extension(name) {
        path.file_stem()
    } else {
        path.file_name()
    };
    let stem = stem
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("data");
    format!("{stem}_clean.csv")
}
