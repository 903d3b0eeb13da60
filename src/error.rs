// src/error.rs

use std::{io, path::PathBuf, time::Duration};
use thiserror::Error;

/// Every way a scrape run can fail. None of these are retried; the first one
/// aborts the run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("`{selector}` did not appear on {url} within {waited:?}")]
    Timeout {
        url: String,
        selector: String,
        waited: Duration,
    },

    #[error("unexpected table structure on {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("filesystem error at {}: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("no rows were scraped; nothing to export")]
    EmptyDataset,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("browser error: {0}")]
    Browser(String),
}

impl ScrapeError {
    pub(crate) fn fs(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ScrapeError::FileSystem {
            path: path.into(),
            source,
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for ScrapeError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        ScrapeError::Spreadsheet(e.to_string())
    }
}

impl From<calamine::XlsxError> for ScrapeError {
    fn from(e: calamine::XlsxError) -> Self {
        ScrapeError::Spreadsheet(e.to_string())
    }
}
