// src/fetch/mod.rs

use async_trait::async_trait;

use crate::{error::ScrapeError, table::PageResult};

pub mod browser;
pub mod http;

pub use browser::BrowserSource;
pub use http::HttpSource;

/// Something that can produce the results table for a page number.
///
/// Implementations own whatever session they need (a browser, an HTTP
/// client) and release it in `close`.
#[async_trait]
pub trait PageSource: Send + Sized {
    /// Fetch and parse page `page` (1-based).
    async fn fetch(&mut self, page: u32) -> Result<PageResult, ScrapeError>;

    /// Release the underlying session. Called once, after the last fetch,
    /// whether or not the fetches succeeded.
    async fn close(self) -> Result<(), ScrapeError>;
}
