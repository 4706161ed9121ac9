//! rustpubmed - PubMed papers with company-affiliated authors
//!
//! ## Usage
//!
//! ```bash
//! rustpubmed "cancer immunotherapy" --file results.xlsx
//! PUBMED_EMAIL=me@example.com rustpubmed "crispr" -d -f crispr.csv --open
//! ```

use anyhow::Result;
use clap::Parser;
use rustpubmed::{
    config::Config,
    pipeline,
    pubmed::PubmedClient,
    retry::RetryPolicy,
    sink::{SaveOutcome, SinkOptions, DEFAULT_OUTPUT},
    PubmedError,
};
use std::path::PathBuf;
use tracing::{error, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Fetch research papers from PubMed with company affiliations
#[derive(Parser)]
#[command(name = "rustpubmed")]
#[command(version, about, long_about = None)]
struct Cli {
    /// PubMed search query
    query: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Output file (.xlsx, or .csv for CSV)
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    file: PathBuf,

    /// Open the output file with the system's default application
    #[arg(long)]
    open: bool,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    let config = Config::from_env();
    let client = match PubmedClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to create PubMed client");
            return Ok(());
        }
    };
    let sink = SinkOptions {
        path: cli.file,
        open_after_save: cli.open,
    };

    match pipeline::run(&client, &cli.query, &RetryPolicy::default(), &sink).await {
        Ok(report) => {
            println!(
                "Found {} papers, {} with non-academic authors ({} skipped).",
                report.ids_found,
                report.rows.len(),
                report.skipped.len()
            );
            match report.outcome {
                SaveOutcome::Written { path, rows } => {
                    println!("Saved {} rows to {}", rows, path.display());
                }
                SaveOutcome::NothingToSave => println!("Nothing to save."),
            }
        }
        Err(e @ PubmedError::RetryExhausted { .. }) => {
            error!(error = %e, "Failed to fetch paper details after multiple attempts");
        }
        Err(e) => {
            error!(error = %e, "Run failed");
        }
    }

    Ok(())
}
