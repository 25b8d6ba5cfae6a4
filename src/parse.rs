use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::{Error, Result, EXPECTED_CARDS_PER_PAGE};

/// Rendered for a text field that couldn't be found.
pub const NOT_AVAILABLE: &str = "N/A";
/// Rendered for a missing rating, review count or price.
pub const ZERO: &str = "0";
/// Rendered for a missing brand.
pub const UNKNOWN_BRAND: &str = "Unknown";
/// Text cue that marks a paid listing. Only cards carrying it are kept.
pub const SPONSORED_MARKER: &str = "Sponsored";

/// One product card as found on the page, before any validation.
///
/// `None` means the field wasn't found in the card. The placeholder text for a missing
/// field is only produced by the `*_text` accessors, so "not found" and a literal
/// placeholder on the page stay distinguishable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    /// An empty heading counts as no title.
    pub title: Option<String>,
    pub brand: Option<String>,
    /// Display text, e.g. `4.5` taken from `4.5 out of 5 stars`.
    /// Leading whitespace before the first token is ignored.
    pub rating: Option<String>,
    /// Display text with thousands separators removed.
    pub reviews: Option<String>,
    /// Display text with thousands separators removed.
    pub price: Option<String>,
    pub image_url: Option<String>,
    /// Always absolute.
    pub product_url: Option<String>,
}

impl RawRecord {
    pub fn title_text(&self) -> &str {
        self.title.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn brand_text(&self) -> &str {
        self.brand.as_deref().unwrap_or(UNKNOWN_BRAND)
    }

    pub fn rating_text(&self) -> &str {
        self.rating.as_deref().unwrap_or(ZERO)
    }

    pub fn reviews_text(&self) -> &str {
        self.reviews.as_deref().unwrap_or(ZERO)
    }

    pub fn price_text(&self) -> &str {
        self.price.as_deref().unwrap_or(ZERO)
    }

    pub fn image_url_text(&self) -> &str {
        self.image_url.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn product_url_text(&self) -> &str {
        self.product_url.as_deref().unwrap_or(NOT_AVAILABLE)
    }
}

/// Compiled selectors for a search results page plus the origin used to absolutize links.
#[derive(Debug)]
pub struct Extractor {
    origin: String,
    card: Selector,
    span: Selector,
    title: Selector,
    brand: Selector,
    rating: Selector,
    reviews: Selector,
    price: Selector,
    image: Selector,
    link: Selector,
}

impl Extractor {
    pub fn new(origin: &str) -> Result<Self> {
        Ok(Self {
            origin: origin.trim_end_matches('/').to_string(),
            card: create_selector(r#"div[data-component-type="s-search-result"]"#)?,
            span: create_selector("span")?,
            title: create_selector("h2")?,
            brand: create_selector("span.a-size-base-plus")?,
            rating: create_selector("span.a-icon-alt")?,
            reviews: create_selector("span.a-size-base.s-underline-text")?,
            price: create_selector("span.a-price-whole")?,
            image: create_selector("img.s-image")?,
            link: create_selector("a.a-link-normal.s-no-outline")?,
        })
    }

    /// Extracts one `RawRecord` per sponsored card, in page order.
    /// Cards without the sponsored marker are skipped. Never fails: a field
    /// that can't be found is left as `None`.
    pub fn extract(&self, html: &str) -> Vec<RawRecord> {
        let doc = Html::parse_document(html);

        let mut records = Vec::with_capacity(EXPECTED_CARDS_PER_PAGE);
        let mut seen = 0usize;
        for card in doc.select(&self.card) {
            seen += 1;
            if !self.is_sponsored(card) {
                continue;
            }
            records.push(self.extract_card(card));
        }
        debug!(cards = seen, sponsored = records.len(), "extracted page");
        records
    }

    fn extract_card(&self, card: ElementRef) -> RawRecord {
        let rating = first_text(card, &self.rating)
            .map(|t| t.split_whitespace().next().unwrap_or_default().to_string());
        let reviews = first_text(card, &self.reviews).map(|t| strip_separators(&t));
        let price = first_text(card, &self.price).map(|t| strip_separators(&t));
        let product_url = first_attr(card, &self.link, "href").map(|href| self.absolutize(&href));

        RawRecord {
            title: first_text(card, &self.title).filter(|title| !title.is_empty()),
            brand: first_text(card, &self.brand),
            rating,
            reviews,
            price,
            image_url: first_attr(card, &self.image, "src"),
            product_url,
        }
    }

    /// Looks for the marker in the text directly inside any `<span>` of the card.
    fn is_sponsored(&self, card: ElementRef) -> bool {
        card.select(&self.span).any(|span| {
            span.children()
                .filter_map(|child| child.value().as_text())
                .any(|text| text.contains(SPONSORED_MARKER))
        })
    }

    fn absolutize(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else if href.starts_with('/') {
            format!("{}{}", self.origin, href)
        } else {
            format!("{}/{}", self.origin, href)
        }
    }
}

/// Convenience for a single page: compiles the selectors and extracts.
pub fn extract_page(html: &str, origin: &str) -> Result<Vec<RawRecord>> {
    Ok(Extractor::new(origin)?.extract(html))
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::InvalidSelector(sel_str.into()))
}

/// Trimmed text of the first match. `None` only when nothing matches.
fn first_text(card: ElementRef, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

fn first_attr(card: ElementRef, selector: &Selector, attr: &str) -> Option<String> {
    card.select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|value| value.trim().to_string())
}

#[inline]
fn strip_separators(text: &str) -> String {
    text.replace(',', "")
}
