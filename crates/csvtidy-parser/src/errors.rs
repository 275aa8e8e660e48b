use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("unknown encoding label '{label}'")]
    UnknownLabel { label: String },

    #[error("input is not valid {encoding}{}", offset_suffix(.offset))]
    Undecodable {
        encoding: &'static str,
        offset: Option<usize>,
    },
}

fn offset_suffix(offset: &Option<usize>) -> String {
    match offset {
        Some(offset) => format!(" (first bad byte at offset {offset})"),
        None => String::new(),
    }
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("input did not contain any CSV data")]
    EmptyInput,

    #[error("byte-order mark indicates {detected} but {declared} was declared")]
    InconsistentEncoding {
        declared: &'static str,
        detected: &'static str,
    },

    #[error("quoted field opened on line {line} is never closed")]
    UnterminatedQuote { line: usize },

    #[error(
        "data row {row} has {found} fields but the header has {expected} (at most {tolerance} extra allowed)"
    )]
    InconsistentColumns {
        row: usize,
        expected: usize,
        found: usize,
        tolerance: usize,
    },

    #[error("{delimiter:?} cannot be used as a delimiter")]
    InvalidDelimiter { delimiter: char },

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error("CSV error: {source}")]
    Csv {
        #[source]
        source: csv::Error,
    },

    #[error("failed to write CSV: {message}")]
    Write { message: String },
}

impl ParserError {
    /// Short machine-readable name used in reports and API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            ParserError::EmptyInput => "empty_input",
            ParserError::InconsistentEncoding { .. } => "inconsistent_encoding",
            ParserError::UnterminatedQuote { .. } => "unterminated_quote",
            ParserError::InconsistentColumns { .. } => "inconsistent_columns",
            ParserError::InvalidDelimiter { .. } => "invalid_delimiter",
            ParserError::Encoding(_) => "encoding",
            ParserError::Csv { .. } => "csv",
            ParserError::Write { .. } => "write",
        }
    }
}
