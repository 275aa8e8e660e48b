// crates/csvtidy-core/src/error.rs

use csvtidy_parser::ParserError;
use thiserror::Error;

use crate::options::FormatKind;
use crate::passes::PassName;

/// Options that cannot be applied to the table at hand. Raised inside a pass,
/// it only affects that pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("column {column} does not exist in the header")]
    UnknownColumn { column: String },

    #[error("column position {position} is out of range (table has {width} columns)")]
    ColumnOutOfRange { position: usize, width: usize },

    #[error("column '{column}' is declared as both {first} and {second}")]
    ConflictingFormats {
        column: String,
        first: FormatKind,
        second: FormatKind,
    },

    #[error("null markers must not be blank")]
    EmptyNullMarker,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{pass} pass skipped: {source}")]
pub struct PassError {
    pub pass: PassName,
    #[source]
    pub source: ConfigError,
}

impl PassError {
    pub fn new(pass: PassName, source: ConfigError) -> Self {
        Self { pass, source }
    }
}

/// Errors that end a run in the `Failed` state.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failed to parse input: {0}")]
    Parse(#[source] ParserError),

    #[error("failed to write cleaned output: {0}")]
    Output(#[source] ParserError),

    #[error("run was cancelled")]
    Cancelled,

    #[error("run stopped before reaching a terminal state ({stage})")]
    Incomplete { stage: &'static str },
}

impl PipelineError {
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Parse(err) => err.kind(),
            PipelineError::Output(_) => "output",
            PipelineError::Cancelled => "cancelled",
            PipelineError::Incomplete { .. } => "incomplete",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("'{name}' is not a .csv file")]
    NotCsv { name: String },
}
