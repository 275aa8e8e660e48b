use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use csvtidy_core::preview::{format_file_size, Preview, PREVIEW_ROWS};
use csvtidy_core::{Delimiter, ParseOptions};
use csvtidy_parser::parse_table;

use super::preview_table;
use crate::config::parse_delimiter;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// CSV file to inspect
    pub input: PathBuf,

    /// Field delimiter; detected from the data when omitted
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<Delimiter>,

    /// Input encoding label
    #[arg(long, value_name = "LABEL")]
    pub encoding: Option<String>,

    /// Number of data rows to preview
    #[arg(long, default_value_t = PREVIEW_ROWS)]
    pub rows: usize,
}

pub fn handle_inspect_command(args: InspectArgs) -> Result<()> {
    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read input file at '{}'", args.input.display()))?;
    let options = ParseOptions {
        delimiter: args.delimiter,
        encoding: args.encoding.clone(),
        max_extra_fields: None,
    };
    let parsed = parse_table(&bytes, &options)
        .with_context(|| format!("Failed to parse '{}'", args.input.display()))?;
    let table = &parsed.table;

    println!("File:      {}", args.input.display());
    println!("Size:      {}", format_file_size(bytes.len() as u64));
    println!("Encoding:  {}", parsed.encoding);
    println!("Delimiter: {}", parsed.delimiter);
    println!("Columns:   {}", table.width());
    println!("Rows:      {}", table.row_count());
    if parsed.padded_rows > 0 {
        println!("Short rows padded: {}", parsed.padded_rows);
    }
    if !parsed.overflow.is_empty() {
        println!("Extra fields dropped: {}", parsed.overflow.len());
    }

    let preview = Preview::with_limit(table, args.rows);
    println!("{}", preview_table(&preview));
    if preview.has_more {
        println!(
            "... {} more rows",
            table.row_count().saturating_sub(preview.rows.len())
        );
    }
    Ok(())
}
