// src/fetch/http.rs

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::PageSource;
use crate::{
    config::SiteConfig,
    error::ScrapeError,
    table::{parse_table, PageResult},
};

/// Fetches pages with a plain GET. Only useful when the results table is
/// present in the served HTML.
pub struct HttpSource {
    client: Client,
    config: SiteConfig,
}

impl HttpSource {
    pub fn new(config: &SiteConfig) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(config.wait_timeout())
            .cookie_store(true)
            .build()
            .map_err(|e| ScrapeError::Config(format!("building HTTP client: {}", e)))?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, ScrapeError> {
        let classify = |e: reqwest::Error| {
            if e.is_timeout() {
                ScrapeError::Timeout {
                    url: url.to_string(),
                    selector: self.config.table_selector.clone(),
                    waited: self.config.wait_timeout(),
                }
            } else {
                ScrapeError::Navigation {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        };

        self.client
            .get(url)
            .send()
            .await
            .map_err(classify)?
            .error_for_status()
            .map_err(classify)?
            .text()
            .await
            .map_err(classify)
    }
}

#[async_trait]
impl PageSource for HttpSource {
    async fn fetch(&mut self, page: u32) -> Result<PageResult, ScrapeError> {
        let url = self.config.page_url(page)?;
        debug!(%url, page, "GET");
        let html = self.get_text(url.as_str()).await?;
        parse_table(&html, &self.config.table_selector, url.as_str())
    }

    async fn close(self) -> Result<(), ScrapeError> {
        Ok(())
    }
}
