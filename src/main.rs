use anyhow::{Context, Result};
use borsascraper::{
    progress::BarProgress, run, BrowserSource, Engine, HttpSource, RunOptions, SiteConfig,
};
use chrono::Local;
use clap::Parser;
use std::{path::PathBuf, time::Instant};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Scrape a paginated results table into a dated .xlsx file.
#[derive(Parser, Debug)]
struct Args {
    /// Number of pages to scrape, starting at page 1
    #[arg(long)]
    pages: u32,

    /// Directory to save the output file in (created if missing)
    #[arg(long)]
    output: PathBuf,

    /// YAML file with site settings
    #[arg(long, env = "BORSASCRAPER_CONFIG")]
    config: Option<PathBuf>,

    /// Override the site's base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Override the dataset name used in the output file name
    #[arg(long)]
    dataset_name: Option<String>,

    /// How pages are fetched
    #[arg(long, value_enum)]
    engine: Option<Engine>,

    /// Seconds to wait for the results table on each page
    #[arg(long)]
    wait_timeout_secs: Option<u64>,
}

impl Args {
    fn site_config(&self) -> Result<SiteConfig> {
        let mut cfg = match &self.config {
            Some(path) => SiteConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => SiteConfig::default(),
        };
        if let Some(url) = &self.base_url {
            cfg.base_url = url.clone();
        }
        if let Some(name) = &self.dataset_name {
            cfg.dataset_name = name.clone();
        }
        if let Some(engine) = self.engine {
            cfg.engine = engine;
        }
        if let Some(secs) = self.wait_timeout_secs {
            cfg.wait_timeout_secs = secs;
        }
        Ok(cfg)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let cfg = args.site_config()?;
    info!(pages = args.pages, output = %args.output.display(), engine = ?cfg.engine, "startup");

    let start = Instant::now();
    let opts = RunOptions {
        pages: args.pages,
        output_dir: &args.output,
        dataset_name: &cfg.dataset_name,
        date: Local::now().date_naive(),
    };
    let mut progress = BarProgress::new();

    let path = match cfg.engine {
        Engine::Browser => {
            let source = BrowserSource::launch(&cfg)
                .await
                .context("starting headless browser")?;
            run(source, &opts, &mut progress).await
        }
        Engine::Http => run(HttpSource::new(&cfg)?, &opts, &mut progress).await,
    }
    .context("scrape run failed")?;

    println!("Scraping completed. Data saved to {}", path.display());
    println!(
        "Scraping completed in {:.2} seconds.",
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
