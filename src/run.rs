// src/run.rs

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::{
    aggregate::AggregatedDataset,
    error::ScrapeError,
    export::export,
    fetch::PageSource,
    progress::Progress,
    table::PageResult,
};

/// Where and how a run writes its result.
#[derive(Debug, Clone)]
pub struct RunOptions<'a> {
    pub pages: u32,
    pub output_dir: &'a Path,
    pub dataset_name: &'a str,
    pub date: NaiveDate,
}

async fn fetch_all<S: PageSource>(
    source: &mut S,
    pages: u32,
    progress: &mut dyn Progress,
) -> Result<Vec<PageResult>, ScrapeError> {
    let mut results = Vec::new();
    for page in 1..=pages {
        let result = source.fetch(page).await?;
        debug!(page, rows = result.rows.len(), "page fetched");
        progress.page_done(page, result.rows.len());
        results.push(result);
    }
    Ok(results)
}

/// Fetch pages `1..=pages` one after another, then aggregate and export.
///
/// The first failing page aborts the run before anything is written. The
/// source is closed in every case.
#[instrument(level = "info", skip_all, fields(pages = opts.pages))]
pub async fn run<S: PageSource>(
    mut source: S,
    opts: &RunOptions<'_>,
    progress: &mut dyn Progress,
) -> Result<PathBuf, ScrapeError> {
    progress.begin(opts.pages);
    let fetched = fetch_all(&mut source, opts.pages, progress).await;
    progress.finish();

    let closed = source.close().await;
    let pages = match (fetched, closed) {
        (Ok(pages), Ok(())) => pages,
        (Ok(_), Err(e)) => return Err(e),
        (Err(e), closed) => {
            if let Err(close_err) = closed {
                warn!(error = %close_err, "closing page source after failed fetch");
            }
            return Err(e);
        }
    };

    let dataset = AggregatedDataset::from_pages(pages)?;
    info!(
        rows = dataset.data_rows().len(),
        columns = dataset.header().len(),
        "aggregated"
    );
    export(&dataset, opts.output_dir, opts.dataset_name, opts.date)
}
