use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::{Error, Result, DEFAULT_ORIGIN, DEFAULT_TOP_K, PAGE_DELAY_MS};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/89.0.4389.82 Safari/537.36";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Everything a run needs to know, passed explicitly into the transport and the collector.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Scheme + host, without a trailing slash.
    pub origin: String,
    /// Sent with every page request, in order.
    pub headers: Vec<(String, String)>,
    pub page_delay: Duration,
    pub retry: RetryPolicy,
    /// `None` waits for as long as the server takes.
    pub timeout: Option<Duration>,
    pub top_k: usize,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            headers: default_headers(),
            page_delay: Duration::from_millis(PAGE_DELAY_MS),
            retry: RetryPolicy::default(),
            timeout: None,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl ScrapeConfig {
    /// Converts the configured header pairs into a `HeaderMap` for reqwest.
    pub fn header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| Error::Header(name.clone()))?;
            let value =
                HeaderValue::from_str(value).map_err(|_| Error::Header(format!("{name}: {value}")))?;
            map.insert(name, value);
        }
        Ok(map)
    }
}

/// How often a failed page fetch is retried.
/// The default never retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Wait before the first retry, doubled for every following one.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Browser-like header set, so the search pages are served the same way a desktop browser gets them.
pub fn default_headers() -> Vec<(String, String)> {
    vec![
        ("User-Agent".to_string(), USER_AGENT.to_string()),
        ("Accept-Language".to_string(), ACCEPT_LANGUAGE.to_string()),
    ]
}
