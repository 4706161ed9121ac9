//! # rustpubmed
//!
//! Find PubMed papers with at least one author from a non-academic (company)
//! affiliation and save them to a spreadsheet.
//!
//! ## Modules
//!
//! - [`pubmed`] - E-utilities esearch/efetch client and efetch XML parser
//! - [`affiliation`] - academic keyword heuristic
//! - [`projector`] - record to output row, with skip reasons
//! - [`retry`] - fixed-delay retry around the detail fetch
//! - [`sink`] - `.xlsx` / `.csv` output
//! - [`pipeline`] - the whole run wired together
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rustpubmed::{config::Config, pipeline, pubmed::PubmedClient, retry::RetryPolicy, sink::SinkOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = PubmedClient::new(&Config::from_env())?;
//!     let report = pipeline::run(&client, "antibody", &RetryPolicy::default(), &SinkOptions::default()).await?;
//!     println!("Kept {} papers", report.rows.len());
//!     Ok(())
//! }
//! ```

pub mod affiliation;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod projector;
pub mod pubmed;
pub mod record;
pub mod retry;
pub mod sink;

pub use error::{PubmedError, Result};
