//! Writes a sample customer CSV file for import testing

use anyhow::Result;
use clap::Parser;
use fleamarket_common::logging::{init_logging, LogConfig};
use fleamarket_server::import::write_sample_csv;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fleamarket-generate-csv")]
#[command(author, version, about = "Generate a sample customer CSV file")]
struct Cli {
    /// Number of customer rows to write
    #[arg(short = 'n', long, default_value_t = 10_000)]
    records: usize,

    /// Output file (defaults to ./data/sample_data_<records>.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_logging(&LogConfig::from_env()?)?;

    let output = cli
        .output
        .unwrap_or_else(|| PathBuf::from(format!("./data/sample_data_{}.csv", cli.records)));

    write_sample_csv(&output, cli.records)?;

    Ok(())
}
