// crates/csvtidy/src/commands/clean.rs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use csvtidy_core::preview::cleaned_file_name;
use csvtidy_core::CleaningPipeline;
use tracing::{debug, info, warn};

use super::{issues_table, report_table, PRINTED_ISSUES};
use crate::config::OptionArgs;

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// CSV file to clean
    pub input: PathBuf,

    /// Where to write the cleaned CSV [default: <stem>_clean.csv next to the input]
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Also write the full report as JSON
    #[arg(long, value_name = "FILE")]
    pub report_json: Option<PathBuf>,

    #[command(flatten)]
    pub options: OptionArgs,
}

pub fn default_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(cleaned_file_name(&name))
}

/// The main handler for `csvtidy clean`. Ctrl-C cancels the run; nothing is
/// written for a cancelled or failed run.
pub async fn handle_clean_command(args: CleanArgs) -> Result<()> {
    let request = args.options.resolve()?;
    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read input file at '{}'", args.input.display()))?;
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));

    let pipeline = CleaningPipeline::new(request);
    let token = pipeline.cancellation_token();
    let mut worker = tokio::task::spawn_blocking(move || {
        pipeline.run_observed(&bytes, |stage| debug!(%stage, "stage entered"))
    });

    let state = tokio::select! {
        joined = &mut worker => joined.context("Cleaning worker panicked")?,
        Ok(()) = tokio::signal::ctrl_c() => {
            warn!("interrupt received, cancelling run");
            token.cancel();
            worker.await.context("Cleaning worker panicked")?
        }
    };
    let output = state
        .into_result()
        .with_context(|| format!("Failed to clean '{}'", args.input.display()))?;

    std::fs::write(&output_path, &output.csv).with_context(|| {
        format!("Failed to write cleaned data to '{}'", output_path.display())
    })?;
    if let Some(path) = &args.report_json {
        let json = serde_json::to_vec_pretty(&output.report)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to '{}'", path.display()))?;
    }
    info!(
        input = %args.input.display(),
        output = %output_path.display(),
        final_rows = output.report.final_rows,
        "cleaned file written"
    );

    println!("{}", report_table(&output.report));
    for pass in &output.report.passes {
        if let Some(error) = &pass.error {
            eprintln!("WARNING: {} pass skipped: {}", pass.pass, error);
        }
    }
    if let Some(table) = issues_table(&output.report.format_issues, output.table.header()) {
        println!("{table}");
        let shown = output.report.format_issues.len().min(PRINTED_ISSUES);
        let hidden = output.report.format_errors_found.saturating_sub(shown);
        if hidden > 0 {
            println!("... {hidden} more issues (see --report-json)");
        }
    }
    println!("Cleaned data written to {}", output_path.display());
    Ok(())
}
