mod commands;
mod config;
mod error;
mod routes;
mod state;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::clean::{handle_clean_command, CleanArgs};
use commands::inspect::{handle_inspect_command, InspectArgs};
use commands::serve::{handle_serve_command, ServeArgs};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Validate and clean CSV files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the cleaning passes over a CSV file and write the cleaned copy
    Clean(CleanArgs),
    /// Show size, dialect and the first rows of a CSV file
    Inspect(InspectArgs),
    /// Start the HTTP API
    Serve(ServeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Clean(args) => handle_clean_command(args).await,
        Command::Inspect(args) => handle_inspect_command(args),
        Command::Serve(args) => handle_serve_command(args).await,
    }
}
