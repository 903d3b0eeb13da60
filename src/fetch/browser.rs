// src/fetch/browser.rs

use async_trait::async_trait;
use chromiumoxide::{error::CdpError, Browser, BrowserConfig, Page};
use futures::StreamExt;
use scraper::Selector;
use tokio::{task::JoinHandle, time::Instant};
use tracing::{debug, info, warn};

use super::PageSource;
use crate::{
    config::SiteConfig,
    error::ScrapeError,
    table::{parse_table, PageResult},
};

/// Renders pages in a headless Chromium.
///
/// One browser process lives for the whole run; each page is loaded in a
/// fresh tab that is closed again before `fetch` returns, so no navigation
/// state leaks from one page to the next.
pub struct BrowserSource {
    browser: Browser,
    handler: JoinHandle<()>,
    config: SiteConfig,
}

impl BrowserSource {
    /// Launch Chromium and start driving its CDP event stream.
    pub async fn launch(config: &SiteConfig) -> Result<Self, ScrapeError> {
        // a selector Chromium can never match would otherwise only surface
        // as a timeout on the first page
        Selector::parse(&config.table_selector).map_err(|e| {
            ScrapeError::Config(format!(
                "table selector {:?}: {:?}",
                config.table_selector, e
            ))
        })?;

        let browser_config = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(config.wait_timeout())
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .build()
            .map_err(ScrapeError::Browser)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScrapeError::Browser(format!("launching chromium: {}", e)))?;

        // the browser does nothing unless its event stream is polled
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "CDP handler stopped");
                    break;
                }
            }
        });

        info!("headless browser launched");
        Ok(Self {
            browser,
            handler,
            config: config.clone(),
        })
    }

    async fn render(&self, tab: &Page, url: &str) -> Result<String, ScrapeError> {
        tab.goto(url).await.map_err(|e| ScrapeError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        self.wait_for_table(tab, url).await?;
        tab.content().await.map_err(|e| ScrapeError::Navigation {
            url: url.to_string(),
            reason: format!("reading page content: {}", e),
        })
    }

    /// Poll for the table selector until it matches or the wait budget runs
    /// out. Only "no such node" answers are retried; a broken CDP session
    /// fails straight away.
    async fn wait_for_table(&self, tab: &Page, url: &str) -> Result<(), ScrapeError> {
        let selector = self.config.table_selector.as_str();
        let start = Instant::now();
        let poll = async {
            loop {
                match tab.find_element(selector).await {
                    Ok(_) => return Ok::<(), ScrapeError>(()),
                    Err(e) if not_rendered_yet(&e) => {
                        tokio::time::sleep(self.config.poll_interval()).await;
                    }
                    Err(e) => {
                        return Err(ScrapeError::Browser(format!(
                            "querying {:?} on {}: {}",
                            selector, url, e
                        )));
                    }
                }
            }
        };

        match tokio::time::timeout(self.config.wait_timeout(), poll).await {
            Ok(found) => found?,
            Err(_) => {
                return Err(ScrapeError::Timeout {
                    url: url.to_string(),
                    selector: selector.to_string(),
                    waited: self.config.wait_timeout(),
                })
            }
        }
        debug!(url, selector, elapsed = ?start.elapsed(), "table rendered");
        Ok(())
    }
}

/// Whether a `find_element` failure only means the node is not in the DOM yet.
fn not_rendered_yet(err: &CdpError) -> bool {
    matches!(err, CdpError::NotFound | CdpError::Chrome(_))
}

#[async_trait]
impl PageSource for BrowserSource {
    async fn fetch(&mut self, page: u32) -> Result<PageResult, ScrapeError> {
        let url = self.config.page_url(page)?;
        debug!(%url, page, "opening tab");

        let tab = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScrapeError::Browser(format!("opening tab: {}", e)))?;

        let rendered = self.render(&tab, url.as_str()).await;
        if let Err(e) = tab.close().await {
            warn!(%url, error = %e, "failed to close tab");
        }

        parse_table(&rendered?, &self.config.table_selector, url.as_str())
    }

    async fn close(mut self) -> Result<(), ScrapeError> {
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            warn!(error = %e, "waiting for chromium to exit");
        }
        if let Err(e) = self.handler.await {
            warn!(error = %e, "CDP handler task failed");
        }
        closed.map_err(|e| ScrapeError::Browser(format!("closing chromium: {}", e)))?;
        info!("headless browser closed");
        Ok(())
    }
}
