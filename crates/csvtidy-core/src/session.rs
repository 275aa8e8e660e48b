use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{PipelineError, UploadError};
use crate::options::CleanRequest;
use crate::pipeline::{CleanOutput, CleaningPipeline, PipelineState};
use crate::preview::{cleaned_file_name, ensure_csv_file_name};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("no file has been selected")]
    NoFileSelected,

    #[error("run was superseded by a newer file or run")]
    Superseded,

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

/// A run handed out by [`Session::begin_run`]. It owns everything it needs,
/// so it can be moved to a worker thread.
#[derive(Debug)]
pub struct PendingRun {
    generation: u64,
    pipeline: CleaningPipeline,
    bytes: Arc<[u8]>,
}

impl PendingRun {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.pipeline.cancellation_token()
    }

    pub fn execute(&self) -> PipelineState {
        self.pipeline.run(&self.bytes)
    }
}

/// Caller-owned context for one user: the selected file, the in-flight run
/// and the latest result. Selecting a new file or starting a new run cancels
/// whatever was in flight, and its result is never stored.
#[derive(Debug, Default)]
pub struct Session {
    file: Option<SelectedFile>,
    generation: u64,
    active: Option<CancellationToken>,
    result: Option<CleanOutput>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_file(
        &mut self,
        name: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<&SelectedFile, SessionError> {
        let name = name.into();
        ensure_csv_file_name(&name)?;

        self.supersede();
        self.result = None;
        let bytes = bytes.into();
        info!(file = %name, bytes = bytes.len(), "file selected");
        Ok(&*self.file.insert(SelectedFile { name, bytes }))
    }

    pub fn current_file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn begin_run(&mut self, request: CleanRequest) -> Result<PendingRun, SessionError> {
        let bytes = match &self.file {
            Some(file) => Arc::clone(&file.bytes),
            None => return Err(SessionError::NoFileSelected),
        };

        self.supersede();
        let token = CancellationToken::new();
        self.active = Some(token.clone());
        debug!(generation = self.generation, "run started");

        Ok(PendingRun {
            generation: self.generation,
            pipeline: CleaningPipeline::new(request).with_cancellation(token),
            bytes,
        })
    }

    /// Stores the outcome of `generation` if it is still the current run.
    pub fn complete_run(
        &mut self,
        generation: u64,
        state: PipelineState,
    ) -> Result<&CleanOutput, SessionError> {
        if generation != self.generation {
            debug!(generation, current = self.generation, "discarding superseded run");
            return Err(SessionError::Superseded);
        }
        self.active = None;

        match state.into_result() {
            Ok(output) => Ok(&*self.result.insert(output)),
            Err(err) => Err(err.into()),
        }
    }

    /// Runs synchronously on the current thread.
    pub fn process(&mut self, request: CleanRequest) -> Result<&CleanOutput, SessionError> {
        let run = self.begin_run(request)?;
        let state = run.execute();
        self.complete_run(run.generation(), state)
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.active.take() {
            token.cancel();
        }
    }

    pub fn result(&self) -> Option<&CleanOutput> {
        self.result.as_ref()
    }

    /// File name and bytes of the latest cleaned output.
    pub fn download(&self) -> Option<(String, &[u8])> {
        let file = self.file.as_ref()?;
        let result = self.result.as_ref()?;
        Some((cleaned_file_name(&file.name), result.csv.as_slice()))
    }

    fn supersede(&mut self) {
        self.cancel();
        self.generation += 1;
    }
}
