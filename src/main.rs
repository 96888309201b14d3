use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use xlsx_merge::{merge_workbooks, summary, writer};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Excel files to merge, in order
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Path of the merged workbook
    #[arg(long, short = 'o', default_value = "merged_workbook.xlsx")]
    output: PathBuf,

    /// Print a JSON summary of the merged sheets to stdout
    #[arg(long, short = 'j')]
    json_summary: bool,

    /// Log more detail to stderr (-v for debug, -vv for trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Read every input up front so a missing file fails before any merging
    let mut inputs = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
        inputs.push((path.display().to_string(), bytes));
    }

    let document = merge_workbooks(
        inputs
            .iter()
            .map(|(name, bytes)| (name.as_str(), bytes.as_slice())),
    )?;

    writer::save(&document, &cli.output)
        .with_context(|| format!("Failed to write merged workbook: {}", cli.output.display()))?;
    tracing::info!(
        output = %cli.output.display(),
        sheets = document.len(),
        "merged workbook written"
    );

    if cli.json_summary {
        let json_string = summary::serialize_to_json(&summary::summarize(&document))?;
        println!("{}", json_string);
    }

    Ok(())
}
