//! Search → fetch (with retry) → project → save.

use crate::error::Result;
use crate::projector::{project_all, ResultRow, SkippedRecord};
use crate::pubmed::LiteratureSource;
use crate::record::RecordId;
use crate::retry::{with_retry, RetryPolicy};
use crate::sink::{save_rows, SaveOutcome, SinkOptions};
use tracing::{debug, info};

/// Summary of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// Ids returned by the search
    pub ids_found: usize,
    /// Records parsed from the detail fetch
    pub records_fetched: usize,
    pub rows: Vec<ResultRow>,
    pub skipped: Vec<SkippedRecord>,
    pub outcome: SaveOutcome,
}

/// Run the whole pipeline for `query`.
///
/// A failed search degrades to zero ids. Only retry exhaustion on the detail
/// fetch (or an error writing the output file) is returned as `Err`, in which
/// case nothing has been written.
pub async fn run<S: LiteratureSource>(
    source: &S,
    query: &str,
    retry: &RetryPolicy,
    sink: &SinkOptions,
) -> Result<PipelineReport> {
    info!(query, "Searching PubMed");
    let ids = source.search(query).await;
    info!(count = ids.len(), "Search complete");

    let records = if ids.is_empty() {
        Vec::new()
    } else {
        let batch: &[RecordId] = &ids;
        with_retry(retry, |attempt| {
            debug!(attempt, "Fetching paper details");
            source.fetch_details(batch)
        })
        .await?
    };

    let projection = project_all(&records);
    info!(
        records = records.len(),
        kept = projection.rows.len(),
        skipped = projection.skipped.len(),
        "Filtered for non-academic authors"
    );

    let outcome = save_rows(&projection.rows, sink)?;

    Ok(PipelineReport {
        ids_found: ids.len(),
        records_fetched: records.len(),
        rows: projection.rows,
        skipped: projection.skipped,
        outcome,
    })
}
