// src/config.rs

use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};
use url::Url;

use crate::error::ScrapeError;

static DEFAULT_BASE_URL: &str = "https://www.borsaitaliana.it/";
static DEFAULT_RELATIVE_PATH: &str = "borsa/obbligazioni/ricerca-avanzata.html#formAndResults";
static DEFAULT_DATASET_NAME: &str = "borsa-italiana";

/// How a page is turned into HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// Render in headless Chromium and wait for the table to appear.
    Browser,
    /// Plain GET; only works when the table is server-rendered.
    Http,
}

/// Everything the fetcher and exporter need to know about the target site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    pub relative_path: String,
    pub page_param: String,
    pub dataset_name: String,
    pub table_selector: String,
    pub wait_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub engine: Engine,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            relative_path: DEFAULT_RELATIVE_PATH.to_string(),
            page_param: "page".to_string(),
            dataset_name: DEFAULT_DATASET_NAME.to_string(),
            table_selector: "table".to_string(),
            wait_timeout_secs: 30,
            poll_interval_ms: 250,
            engine: Engine::Browser,
        }
    }
}

impl SiteConfig {
    /// Read a YAML file; keys that are absent keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScrapeError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ScrapeError::fs(path, e))?;
        serde_yaml::from_str(&text)
            .map_err(|e| ScrapeError::Config(format!("parsing {}: {}", path.display(), e)))
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// URL of page `page`.
    ///
    /// The site routes results client-side, so when the relative path ends in
    /// a fragment the page parameter is appended to the fragment rather than
    /// the real query string.
    pub fn page_url(&self, page: u32) -> Result<Url, ScrapeError> {
        let mut base_str = self.base_url.clone();
        if !base_str.ends_with('/') {
            base_str.push('/');
        }
        let base = Url::parse(&base_str)
            .map_err(|e| ScrapeError::Config(format!("base url {:?}: {}", self.base_url, e)))?;
        let mut url = base.join(&self.relative_path).map_err(|e| {
            ScrapeError::Config(format!("relative path {:?}: {}", self.relative_path, e))
        })?;

        match url.fragment().map(str::to_owned) {
            Some(fragment) => {
                url.set_fragment(Some(&format!("{}?{}={}", fragment, self.page_param, page)));
            }
            None => {
                url.query_pairs_mut()
                    .append_pair(&self.page_param, &page.to_string());
            }
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_page_url_puts_page_after_fragment() {
        let cfg = SiteConfig::default();
        assert_eq!(
            cfg.page_url(3).unwrap().as_str(),
            "https://www.borsaitaliana.it/borsa/obbligazioni/ricerca-avanzata.html#formAndResults?page=3"
        );
    }

    #[test]
    fn page_url_without_fragment_uses_query() {
        let cfg = SiteConfig {
            base_url: "http://localhost:8080".to_string(),
            relative_path: "bonds/list.html?lang=it".to_string(),
            ..SiteConfig::default()
        };
        assert_eq!(
            cfg.page_url(12).unwrap().as_str(),
            "http://localhost:8080/bonds/list.html?lang=it&page=12"
        );
    }

    #[test]
    fn bad_base_url_is_config_error() {
        let cfg = SiteConfig {
            base_url: "not a url".to_string(),
            ..SiteConfig::default()
        };
        assert!(matches!(cfg.page_url(1), Err(ScrapeError::Config(_))));
    }

    #[test]
    fn load_merges_with_defaults() -> anyhow::Result<()> {
        let mut f = NamedTempFile::new()?;
        writeln!(f, "dataset_name: test-bonds")?;
        writeln!(f, "engine: http")?;
        writeln!(f, "wait_timeout_secs: 5")?;

        let cfg = SiteConfig::load(f.path())?;
        assert_eq!(cfg.dataset_name, "test-bonds");
        assert_eq!(cfg.engine, Engine::Http);
        assert_eq!(cfg.wait_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.table_selector, "table");
        Ok(())
    }

    #[test]
    fn load_missing_file_is_fs_error() {
        let err = SiteConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ScrapeError::FileSystem { .. }));
    }
}
