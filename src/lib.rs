//! SPONSORED LISTING SCRAPER
//! Pulls the sponsored product cards out of paginated search results,
//! cleans them into a typed table and summarizes that table.
//!
//! Pipeline: `request` fetches -> `parse` extracts -> `process` collects ->
//! `clean` validates -> `export` / `aggregate` consume the table.

mod error;
mod macros;

pub mod aggregate;
pub mod clean;
pub mod config;
pub mod export;
pub mod parse;
pub mod process;
pub mod request;

pub use error::{Error, Result};

/// Site the search pages are requested from; relative product links are resolved against it.
pub const DEFAULT_ORIGIN: &str = "https://www.amazon.in";
/// Pause between two consecutive page requests.
pub const PAGE_DELAY_MS: u64 = 2000;
pub const DEFAULT_PAGES: usize = 5;
/// Size of every ranked view.
pub const DEFAULT_TOP_K: usize = 5;
/// Amazon doesn't show more than ~60 cards on a search page.
const EXPECTED_CARDS_PER_PAGE: usize = 60;
