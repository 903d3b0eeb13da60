// src/progress.rs

use indicatif::{ProgressBar, ProgressStyle};

/// Receives progress of a run. Every method defaults to a no-op.
pub trait Progress {
    /// Called once before the first page with the number of pages to fetch.
    fn begin(&mut self, _total: u32) {}

    /// Called after each page has been fetched and parsed.
    fn page_done(&mut self, _page: u32, _rows: usize) {}

    /// Called at the end, whether or not the run succeeded.
    fn finish(&mut self) {}
}

pub struct NullProgress;
impl Progress for NullProgress {}

/// Terminal progress bar. Cleared when the run finishes.
#[derive(Default)]
pub struct BarProgress {
    bar: Option<ProgressBar>,
}

impl BarProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Progress for BarProgress {
    fn begin(&mut self, total: u32) {
        let bar = ProgressBar::new(u64::from(total));
        let style = ProgressStyle::with_template(
            "{msg} [{bar:40.green/dim}] {pos}/{len} pages ({elapsed})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░");
        bar.set_style(style);
        bar.set_message("Scraping pages...");
        self.bar = Some(bar);
    }

    fn page_done(&mut self, _page: u32, _rows: usize) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
