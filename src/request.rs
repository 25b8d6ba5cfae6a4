use async_trait::async_trait;
use chrono::Local;
use reqwest::Client;
use tracing::warn;
use url::Url;

use crate::config::{RetryPolicy, ScrapeConfig};
use crate::{info_time, Error, Result};

/// Anything that can hand back the raw markup of a page.
#[async_trait]
pub trait PageSource {
    async fn fetch(&self, url: &Url) -> Result<String>;
}

/// Fetches pages over HTTP with the configured headers.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let mut builder = Client::builder().default_headers(config.header_map()?);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl PageSource for HttpSource {
    /// Requests a page and returns the HTML.
    /// A non-success status is only logged, the body is still returned for extraction.
    async fn fetch(&self, url: &Url) -> Result<String> {
        let res = self.client.get(url.clone()).send().await?;
        if !res.status().is_success() {
            warn!(status = %res.status(), %url, "non-success status");
        }
        let html = res.text().await?;
        Ok(html)
    }
}

/// Builds the address of one search results page: `{origin}/s?k={keyword}&page={page}`.
/// Spaces in the keyword are encoded as `+`.
pub fn search_url(origin: &str, keyword: &str, page: usize) -> Result<Url> {
    let base = format!("{}/s", origin.trim_end_matches('/'));
    let page = page.to_string();
    let url = Url::parse_with_params(&base, &[("k", keyword), ("page", page.as_str())])?;
    Ok(url)
}

/// Fetches `url`, retrying transport errors according to `policy`.
pub async fn fetch_with_retry<S>(source: &S, url: &Url, policy: RetryPolicy) -> Result<String>
where
    S: PageSource + ?Sized + Sync,
{
    let mut attempt = 0;
    loop {
        match source.fetch(url).await {
            Ok(html) => return Ok(html),
            Err(err) if policy.max_retries == 0 => return Err(err),
            Err(err) if attempt >= policy.max_retries => {
                return Err(Error::RetriesExhausted {
                    url: url.to_string(),
                    attempts: attempt + 1,
                    source: Box::new(err),
                })
            }
            Err(err) => {
                let backoff = policy.backoff_for(attempt);
                warn!(
                    %url,
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    error = %err,
                    "fetch failed, backing off {:.1}s",
                    backoff.as_secs_f64()
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
        }
    }
}

/// Requests one search page, timing the request.
pub(crate) async fn request_page_html<S>(
    source: &S,
    config: &ScrapeConfig,
    keyword: &str,
    page_num: usize,
) -> Result<String>
where
    S: PageSource + ?Sized + Sync,
{
    let start_time = Local::now();
    let url = search_url(&config.origin, keyword, page_num)?;
    let html = fetch_with_retry(source, &url, config.retry).await?;
    info_time!(start_time, "Requested page {} ({} bytes)", page_num, html.len());
    Ok(html)
}
