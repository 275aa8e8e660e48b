//! Run state machine: parse -> standardizeText -> handleNulls ->
//! removeDuplicates -> validateFormats -> report.

use std::fmt;

use csvtidy_parser::{parse_table, write_table, ParsedTable, Table};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::options::CleanRequest;
use crate::passes::{default_passes, PassName};
use crate::report::{CleaningReport, ParseSummary, PassSummary, ReportDelta};

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct CleanOutput {
    pub table: Table,
    pub report: CleaningReport,
    /// Cleaned CSV with the input's delimiter.
    pub csv: Vec<u8>,
}

/// Payload-free view of [`PipelineState`] handed to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Parsing,
    Cleaning(PassName),
    Reporting,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Idle => f.write_str("idle"),
            Stage::Parsing => f.write_str("parsing"),
            Stage::Cleaning(pass) => write!(f, "cleaning:{pass}"),
            Stage::Reporting => f.write_str("reporting"),
            Stage::Done => f.write_str("done"),
            Stage::Failed => f.write_str("failed"),
        }
    }
}

#[derive(Debug)]
pub enum PipelineState {
    Idle,
    Parsing,
    Cleaning { pass: PassName },
    Reporting,
    Done(Box<CleanOutput>),
    Failed(PipelineError),
}

impl PipelineState {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineState::Idle => Stage::Idle,
            PipelineState::Parsing => Stage::Parsing,
            PipelineState::Cleaning { pass } => Stage::Cleaning(*pass),
            PipelineState::Reporting => Stage::Reporting,
            PipelineState::Done(_) => Stage::Done,
            PipelineState::Failed(_) => Stage::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done(_) | PipelineState::Failed(_))
    }

    pub fn into_result(self) -> Result<CleanOutput, PipelineError> {
        match self {
            PipelineState::Done(output) => Ok(*output),
            PipelineState::Failed(err) => Err(err),
            PipelineState::Idle => Err(PipelineError::Incomplete { stage: "idle" }),
            PipelineState::Parsing => Err(PipelineError::Incomplete { stage: "parsing" }),
            PipelineState::Cleaning { .. } => Err(PipelineError::Incomplete { stage: "cleaning" }),
            PipelineState::Reporting => Err(PipelineError::Incomplete { stage: "reporting" }),
        }
    }
}

/// One configured cleaning run. The cancellation token is checked before
/// parsing, between passes, before reporting and before `Done` is published.
#[derive(Debug, Clone)]
pub struct CleaningPipeline {
    request: CleanRequest,
    cancel: CancellationToken,
}

impl CleaningPipeline {
    pub fn new(request: CleanRequest) -> Self {
        Self {
            request,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn request(&self) -> &CleanRequest {
        &self.request
    }

    /// Runs to a terminal state: `Done` or `Failed`.
    pub fn run(&self, bytes: &[u8]) -> PipelineState {
        self.run_observed(bytes, |_| {})
    }

    /// Like [`run`](Self::run), reporting every stage transition to `observer`.
    pub fn run_observed(&self, bytes: &[u8], mut observer: impl FnMut(Stage)) -> PipelineState {
        observer(Stage::Idle);
        let state = match self.execute(bytes, &mut observer) {
            Ok(output) => PipelineState::Done(Box::new(output)),
            Err(err) => {
                warn!(error = %err, kind = err.kind(), "cleaning run failed");
                PipelineState::Failed(err)
            }
        };
        observer(state.stage());
        state
    }

    fn checkpoint(&self) -> Result<(), PipelineError> {
        if self.cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        Ok(())
    }

    fn execute(
        &self,
        bytes: &[u8],
        observer: &mut dyn FnMut(Stage),
    ) -> Result<CleanOutput, PipelineError> {
        self.checkpoint()?;
        observer(Stage::Parsing);

        let ParsedTable {
            table,
            delimiter,
            encoding,
            padded_rows,
            overflow,
        } = parse_table(bytes, &self.request.parse).map_err(PipelineError::Parse)?;

        info!(
            bytes = bytes.len(),
            rows = table.row_count(),
            columns = table.width(),
            delimiter = %delimiter,
            encoding,
            "parsed input"
        );

        let source = ParseSummary {
            total_rows: table.row_count(),
            delimiter,
            encoding,
            padded_rows,
            overflow,
        };

        let options = &self.request.options;
        let mut table = table;
        let mut summaries = Vec::with_capacity(4);
        let mut deltas = Vec::with_capacity(4);

        for pass in default_passes() {
            self.checkpoint()?;
            let name = pass.name();
            observer(Stage::Cleaning(name));

            if !pass.enabled(options) {
                debug!(pass = %name, "pass disabled");
                summaries.push(PassSummary::skipped(name));
                deltas.push(ReportDelta::default());
                continue;
            }

            match pass.run(&table, options) {
                Ok(output) => {
                    info!(
                        pass = %name,
                        rows = output.table.row_count(),
                        duplicates_removed = output.delta.duplicates_removed,
                        nulls_handled = output.delta.nulls_handled,
                        fields_standardized = output.delta.fields_standardized,
                        format_errors_found = output.delta.format_errors_found,
                        "pass applied"
                    );
                    table = output.table;
                    summaries.push(PassSummary::applied(name));
                    deltas.push(output.delta);
                }
                Err(err) => {
                    warn!(pass = %name, error = %err, "pass left the table unchanged");
                    summaries.push(PassSummary::failed(&err));
                    deltas.push(ReportDelta::default());
                }
            }
        }

        self.checkpoint()?;
        observer(Stage::Reporting);

        let report = CleaningReport::assemble(source, summaries, deltas);
        let csv = write_table(&table, delimiter).map_err(PipelineError::Output)?;
        debug_assert!(report.is_consistent_with(&table));

        self.checkpoint()?;
        info!(
            total_rows = report.total_rows,
            final_rows = report.final_rows,
            "cleaning run finished"
        );

        Ok(CleanOutput { table, report, csv })
    }
}

/// `clean(bytes, options) -> (bytes, report) | error` for callers that need
/// neither cancellation nor progress.
pub fn clean(bytes: &[u8], request: &CleanRequest) -> Result<CleanOutput, PipelineError> {
    CleaningPipeline::new(request.clone()).run(bytes).into_result()
}
