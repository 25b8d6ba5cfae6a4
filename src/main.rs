use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use listing_scrap::{
    config::{RetryPolicy, ScrapeConfig},
    info_time,
    process::run,
    request::HttpSource,
    Result, DEFAULT_ORIGIN, DEFAULT_PAGES, DEFAULT_TOP_K, PAGE_DELAY_MS,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "listing-scrap", about = "Scrape, clean and summarize sponsored search listings")]
struct Cli {
    /// Search query, e.g. "gaming laptop"
    keyword: String,
    /// Number of result pages to scrape
    #[arg(short, long, default_value_t = DEFAULT_PAGES)]
    pages: usize,
    /// Pause between two page requests, in milliseconds
    #[arg(long, default_value_t = PAGE_DELAY_MS)]
    delay_ms: u64,
    /// Retries for a page whose request fails
    #[arg(long, default_value_t = 0)]
    retries: u32,
    /// Site to scrape
    #[arg(long, default_value = DEFAULT_ORIGIN)]
    origin: String,
    /// Request timeout in seconds (no timeout when omitted)
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Size of the ranked views
    #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,
    /// Directory the cleaned CSV is written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
}

impl Cli {
    fn config(&self) -> ScrapeConfig {
        ScrapeConfig {
            origin: self.origin.clone(),
            page_delay: Duration::from_millis(self.delay_ms),
            retry: RetryPolicy {
                max_retries: self.retries,
                ..Default::default()
            },
            timeout: self.timeout_secs.map(Duration::from_secs),
            top_k: self.top_k,
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let start_time = Local::now();
    let cli = Cli::parse();
    let config = cli.config();
    let source = HttpSource::new(&config)?;

    let summary = run(&source, &config, &cli.keyword, cli.pages, &cli.output_dir).await?;
    println!(
        "Scraping and cleaning completed! Data saved to {}.",
        summary.output_file.display()
    );
    println!("\n{}", summary.analysis);
    info_time!(start_time, "Full program time:");

    Ok(())
}
