use csv::ReaderBuilder;
use tracing::debug;

use crate::decode::decode;
use crate::dialect::{check_quotes, detect_delimiter};
use crate::errors::ParserError;
use crate::model::{FieldOverflow, ParseOptions, ParsedTable, Row, Table};

/// Parses raw CSV bytes into a [`Table`]. The first record is the header.
///
/// Short rows are padded to the header width. Long rows are cut to the
/// header width and every dropped field is reported in
/// [`ParsedTable::overflow`]; `max_extra_fields` turns that into a hard
/// failure once a single row goes past it.
pub fn parse_table(bytes: &[u8], options: &ParseOptions) -> Result<ParsedTable, ParserError> {
    if bytes.is_empty() {
        return Err(ParserError::EmptyInput);
    }

    let decoded = decode(bytes, options.encoding.as_deref())?;
    let text = decoded.text.as_ref();
    if text.trim().is_empty() {
        return Err(ParserError::EmptyInput);
    }

    let delimiter = match options.delimiter {
        Some(delimiter) => delimiter,
        None => detect_delimiter(text),
    };
    check_quotes(text, delimiter)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter.as_byte())
        .from_reader(text.as_bytes());
    let mut records = reader.records();

    let header: Vec<String> = match records.next() {
        Some(record) => record
            .map_err(|source| ParserError::Csv { source })?
            .iter()
            .map(str::to_string)
            .collect(),
        None => return Err(ParserError::EmptyInput),
    };
    let width = header.len();

    let mut rows = Vec::new();
    let mut padded_rows = 0;
    let mut overflow = Vec::new();

    for (index, record) in records.enumerate() {
        let record = record.map_err(|source| ParserError::Csv { source })?;
        let mut fields: Vec<String> = record.iter().map(str::to_string).collect();

        if fields.len() < width {
            padded_rows += 1;
        } else if fields.len() > width {
            let extra = fields.len() - width;
            if let Some(tolerance) = options.max_extra_fields {
                if extra > tolerance {
                    return Err(ParserError::InconsistentColumns {
                        row: index,
                        expected: width,
                        found: fields.len(),
                        tolerance,
                    });
                }
            }
            overflow.extend(
                fields
                    .drain(width..)
                    .enumerate()
                    .map(|(offset, value)| FieldOverflow {
                        row: index,
                        column: width + offset,
                        value,
                    }),
            );
        }

        rows.push(Row::new(index, fields));
    }

    debug!(
        delimiter = %delimiter,
        encoding = decoded.encoding.name(),
        columns = width,
        rows = rows.len(),
        padded_rows,
        overflow = overflow.len(),
        "parsed CSV input"
    );

    Ok(ParsedTable {
        table: Table::new(header, rows),
        delimiter,
        encoding: decoded.encoding.name(),
        padded_rows,
        overflow,
    })
}
