use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ParserError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct Delimiter(u8);

impl Delimiter {
    pub const COMMA: Delimiter = Delimiter(b',');
    pub const SEMICOLON: Delimiter = Delimiter(b';');
    pub const TAB: Delimiter = Delimiter(b'\t');
    pub const PIPE: Delimiter = Delimiter(b'|');

    /// Candidates tried by detection, in tie-break order.
    pub const CANDIDATES: [Delimiter; 4] = [
        Delimiter::COMMA,
        Delimiter::SEMICOLON,
        Delimiter::TAB,
        Delimiter::PIPE,
    ];

    pub fn new(byte: u8) -> Result<Self, ParserError> {
        match byte {
            b'"' | b'\r' | b'\n' => Err(ParserError::InvalidDelimiter {
                delimiter: byte as char,
            }),
            b if b.is_ascii() => Ok(Self(b)),
            b => Err(ParserError::InvalidDelimiter {
                delimiter: b as char,
            }),
        }
    }

    pub fn as_byte(&self) -> u8 {
        self.0
    }

    pub fn as_char(&self) -> char {
        self.0 as char
    }
}

impl Default for Delimiter {
    fn default() -> Self {
        Delimiter::COMMA
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            b'\t' => f.write_str("\\t"),
            other => write!(f, "{}", other as char),
        }
    }
}

impl TryFrom<char> for Delimiter {
    type Error = ParserError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        if !value.is_ascii() {
            return Err(ParserError::InvalidDelimiter { delimiter: value });
        }
        Delimiter::new(value as u8)
    }
}

impl From<Delimiter> for char {
    fn from(value: Delimiter) -> Self {
        value.as_char()
    }
}

/// One data record. `index` is the 0-based position in the source file,
/// header excluded, and survives every transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub index: usize,
    pub fields: Vec<String>,
}

impl Row {
    pub fn new(index: usize, fields: Vec<String>) -> Self {
        Self { index, fields }
    }

    pub fn get(&self, column: usize) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn with_fields(&self, fields: Vec<String>) -> Row {
        Row {
            index: self.index,
            fields,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Builds a table, padding short rows with empty fields and cutting long
    /// rows down to the header width.
    pub fn new(header: Vec<String>, rows: Vec<Row>) -> Self {
        let width = header.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.fields.resize(width, String::new());
                row
            })
            .collect();
        Self { header, rows }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.header.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Resolves a header name. Exact matches win; otherwise the first column
    /// whose trimmed name matches case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        if let Some(idx) = self.header.iter().position(|h| h == name) {
            return Some(idx);
        }
        let wanted = name.trim();
        self.header
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(wanted))
    }

    /// Same header, new rows.
    pub fn with_rows(&self, rows: Vec<Row>) -> Table {
        Table::new(self.header.clone(), rows)
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Row>) {
        (self.header, self.rows)
    }
}

/// A field found beyond the header width of its row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOverflow {
    pub row: usize,
    pub column: usize,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ParseOptions {
    /// `None` detects the delimiter from the first records.
    pub delimiter: Option<Delimiter>,
    /// WHATWG encoding label; `None` means UTF-8.
    pub encoding: Option<String>,
    /// Upper bound on extra fields in a single row before parsing fails.
    pub max_extra_fields: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ParsedTable {
    pub table: Table,
    pub delimiter: Delimiter,
    pub encoding: &'static str,
    pub padded_rows: usize,
    pub overflow: Vec<FieldOverflow>,
}
