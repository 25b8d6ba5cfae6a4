#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use listing_scrap::{request::PageSource, Error, Result};
use tokio::time::Instant;
use url::Url;

/// A product card as it shows up on a search page. `None` leaves the element out.
pub struct Card<'a> {
    pub sponsored: bool,
    pub title: &'a str,
    pub brand: Option<&'a str>,
    pub rating: Option<&'a str>,
    pub reviews: Option<&'a str>,
    pub price: Option<&'a str>,
}

impl<'a> Card<'a> {
    pub fn sponsored(title: &'a str) -> Self {
        Self {
            sponsored: true,
            title,
            brand: Some("Acme"),
            rating: Some("4.0 out of 5 stars"),
            reviews: Some("1,000"),
            price: Some("999"),
        }
    }

    pub fn html(&self) -> String {
        let mut html = String::from(r#"<div data-component-type="s-search-result">"#);
        if self.sponsored {
            html.push_str(r#"<span class="puis-label-popover-default"><span>Sponsored</span></span>"#);
        }
        html.push_str(&format!(
            r#"<img class="s-image" src="https://img/{t}.jpg"><h2><a class="a-link-normal s-no-outline" href="/dp/{t}"><span>{t}</span></a></h2>"#,
            t = self.title
        ));
        if let Some(brand) = self.brand {
            html.push_str(&format!(r#"<span class="a-size-base-plus">{brand}</span>"#));
        }
        if let Some(rating) = self.rating {
            html.push_str(&format!(r#"<span class="a-icon-alt">{rating}</span>"#));
        }
        if let Some(reviews) = self.reviews {
            html.push_str(&format!(r#"<span class="a-size-base s-underline-text">{reviews}</span>"#));
        }
        if let Some(price) = self.price {
            html.push_str(&format!(r#"<span class="a-price"><span class="a-price-whole">{price}</span></span>"#));
        }
        html.push_str("</div>");
        html
    }
}

pub fn page(cards: &[Card]) -> String {
    let body: String = cards.iter().map(Card::html).collect();
    format!("<html><body><div class=\"s-main-slot\">{body}</div></body></html>")
}

/// Serves canned markup keyed by page number and records when each page was asked for.
#[derive(Default)]
pub struct ScriptedSource {
    pages: HashMap<usize, String>,
    failing: Vec<usize>,
    pub requests: Mutex<Vec<(Url, Instant)>>,
}

impl ScriptedSource {
    pub fn new(pages: Vec<String>) -> Self {
        Self {
            pages: pages.into_iter().enumerate().map(|(i, p)| (i + 1, p)).collect(),
            ..Default::default()
        }
    }

    pub fn failing_on(mut self, page: usize) -> Self {
        self.failing.push(page);
        self
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.to_string())
            .collect()
    }

    pub fn request_times(&self) -> Vec<Instant> {
        self.requests.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }
}

#[async_trait]
impl PageSource for ScriptedSource {
    async fn fetch(&self, url: &Url) -> Result<String> {
        self.requests.lock().unwrap().push((url.clone(), Instant::now()));
        let page: usize = url
            .query_pairs()
            .find(|(k, _)| k == "page")
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(0);
        if self.failing.contains(&page) {
            return Err(Error::Io(std::io::Error::other("connection refused")));
        }
        Ok(self.pages.get(&page).cloned().unwrap_or_default())
    }
}
