//! Cleaning pipeline for CSV uploads: options, the four cleaning passes,
//! report assembly, and the run state machine that ties them together.

pub mod error;
pub mod options;
pub mod passes;
pub mod pipeline;
pub mod preview;
pub mod report;
pub mod session;

pub use csvtidy_parser::{Delimiter, ParseOptions, Row, Table};
pub use error::{ConfigError, PassError, PipelineError, UploadError};
pub use options::{
    CaseRule, CleanRequest, CleaningOptions, ColumnFormat, ColumnRef, DateOrder, FormatKind,
    NullPolicy,
};
pub use pipeline::{clean, CleanOutput, CleaningPipeline, PipelineState, Stage};
pub use report::{CleaningReport, FormatIssue, PassSummary, ReportDelta};
pub use session::{PendingRun, Session, SessionError};
pub use tokio_util::sync::CancellationToken;
