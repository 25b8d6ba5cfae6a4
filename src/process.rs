use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use tokio::task::spawn_blocking;

use crate::aggregate::Analysis;
use crate::clean::{clean, CleanReport};
use crate::config::ScrapeConfig;
use crate::export::{output_path, write_csv};
use crate::parse::{Extractor, RawRecord};
use crate::request::{request_page_html, PageSource};
use crate::{info_time, Error, Result};

/// What a full run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub raw_records: usize,
    pub report: CleanReport,
    pub output_file: PathBuf,
    pub analysis: Analysis,
}

/// Scrapes pages `1..=pages` for `keyword`, cleans the records, writes the table
/// into `output_dir` and analyzes it.
pub async fn run<S>(
    source: &S,
    config: &ScrapeConfig,
    keyword: &str,
    pages: usize,
    output_dir: &Path,
) -> Result<RunSummary>
where
    S: PageSource + ?Sized + Sync,
{
    let start_time = Local::now();
    info_time!("Started scraping \"{}\" ({} pages)", keyword, pages);

    let records = collect_pages(source, config, keyword, pages).await?;
    info_time!(start_time, "Collected {} sponsored records", records.len());

    let report = clean(&records);
    info_time!(
        "Cleaned: {} rows kept, {} duplicates and {} invalid rows dropped",
        report.table.len(),
        report.duplicates_removed,
        report.invalid_removed
    );

    let output_file = output_path(output_dir, keyword);
    write_csv(&output_file, &report.table).await?;

    let analysis = Analysis::compute(&report.table, config.top_k);
    info_time!(start_time, "Finished run for \"{}\"", keyword);

    Ok(RunSummary {
        raw_records: records.len(),
        report,
        output_file,
        analysis,
    })
}

/// Requests the search pages one at a time and concatenates their records,
/// keeping page order and in-page order.
///
/// Consecutive requests are separated by `config.page_delay`. Nothing else happens
/// during the pause. A page that can't be fetched aborts the collection.
pub async fn collect_pages<S>(
    source: &S,
    config: &ScrapeConfig,
    keyword: &str,
    pages: usize,
) -> Result<Vec<RawRecord>>
where
    S: PageSource + ?Sized + Sync,
{
    if pages == 0 {
        return Err(Error::InvalidPageCount(pages));
    }
    let extractor = Arc::new(Extractor::new(&config.origin)?);

    let mut records = Vec::new();
    for page_num in 1..=pages {
        if page_num > 1 {
            tokio::time::sleep(config.page_delay).await;
        }
        info_time!("Scraping page {}...", page_num);
        let html = request_page_html(source, config, keyword, page_num).await?;
        let page_records = parse_page(extractor.clone(), html).await?;
        info_time!("Page {}: {} sponsored records", page_num, page_records.len());
        records.extend(page_records);
    }
    Ok(records)
}

/// Parses a page off the async runtime. The task is awaited right away, so pages
/// are still handled strictly one after another.
async fn parse_page(extractor: Arc<Extractor>, html: String) -> Result<Vec<RawRecord>> {
    let records = spawn_blocking(move || extractor.extract(&html)).await?;
    Ok(records)
}
