pub mod aggregate;
pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod progress;
pub mod run;
pub mod table;

pub use aggregate::AggregatedDataset;
pub use config::{Engine, SiteConfig};
pub use error::ScrapeError;
pub use fetch::{BrowserSource, HttpSource, PageSource};
pub use run::{run, RunOptions};
pub use table::{PageResult, TableRow};
