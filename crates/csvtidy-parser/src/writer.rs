use csv::{QuoteStyle, WriterBuilder};

use crate::errors::ParserError;
use crate::model::{Delimiter, Table};

/// Serializes the header and rows with `delimiter`, quoting only the fields
/// that need it.
pub fn write_table(table: &Table, delimiter: Delimiter) -> Result<Vec<u8>, ParserError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter.as_byte())
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer
        .write_record(table.header())
        .map_err(|err| ParserError::Write {
            message: err.to_string(),
        })?;
    for row in table.rows() {
        writer
            .write_record(&row.fields)
            .map_err(|err| ParserError::Write {
                message: format!("row {}: {err}", row.index),
            })?;
    }

    writer.into_inner().map_err(|err| ParserError::Write {
        message: err.to_string(),
    })
}
