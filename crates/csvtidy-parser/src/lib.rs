pub mod errors;
pub mod model;
mod decode;
mod dialect;
mod reader;
mod writer;

pub use errors::{EncodingError, ParserError};
pub use model::{Delimiter, FieldOverflow, ParseOptions, ParsedTable, Row, Table};
pub use reader::parse_table;
pub use writer::write_table;

#[cfg(test)]
mod tests;
