use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::parse::RawRecord;

/// Highest rating the site hands out. Ratings above it are treated as unparseable.
pub const MAX_RATING: f64 = 5.0;

/// A validated product row. Column order is the export order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Brand")]
    pub brand: String,
    #[serde(rename = "Rating")]
    pub rating: f64,
    #[serde(rename = "Reviews")]
    pub reviews: u64,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Image URL")]
    pub image_url: String,
    #[serde(rename = "Product URL")]
    pub product_url: String,
}

impl CleanRecord {
    /// Renders the row back into the shape the extractor produces.
    pub fn to_raw(&self) -> RawRecord {
        RawRecord {
            title: Some(self.title.clone()),
            brand: Some(self.brand.clone()),
            rating: Some(self.rating.to_string()),
            reviews: Some(self.reviews.to_string()),
            price: Some(self.price.to_string()),
            image_url: Some(self.image_url.clone()),
            product_url: Some(self.product_url.clone()),
        }
    }
}

/// Cleaned rows. Titles are unique and the position in `rows` is the row index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanTable {
    rows: Vec<CleanRecord>,
}

impl CleanTable {
    pub fn rows(&self) -> &[CleanRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CleanRecord> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<CleanRecord> {
        self.rows
    }
}

impl<'a> IntoIterator for &'a CleanTable {
    type Item = &'a CleanRecord;
    type IntoIter = std::slice::Iter<'a, CleanRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// The cleaned table together with how many rows each step removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanReport {
    pub table: CleanTable,
    pub duplicates_removed: usize,
    pub invalid_removed: usize,
}

/// Deduplicates by title (first seen wins), coerces rating/reviews/price and drops
/// every row where one of the three doesn't parse.
pub fn clean(records: &[RawRecord]) -> CleanReport {
    let mut seen_titles = HashSet::with_capacity(records.len());
    let unique: Vec<&RawRecord> = records
        .iter()
        .filter(|rec| seen_titles.insert(rec.title_text()))
        .collect();
    let duplicates_removed = records.len() - unique.len();

    let rows: Vec<CleanRecord> = unique.iter().filter_map(|rec| coerce(rec)).collect();
    let invalid_removed = unique.len() - rows.len();

    debug!(
        input = records.len(),
        duplicates_removed,
        invalid_removed,
        kept = rows.len(),
        "cleaned records"
    );

    CleanReport {
        table: CleanTable { rows },
        duplicates_removed,
        invalid_removed,
    }
}

fn coerce(rec: &RawRecord) -> Option<CleanRecord> {
    let rating = parse_rating(rec.rating_text())?;
    let reviews = parse_reviews(rec.reviews_text())?;
    let price = parse_price(rec.price_text())?;
    Some(CleanRecord {
        title: rec.title_text().to_string(),
        brand: rec.brand_text().to_string(),
        rating,
        reviews,
        price,
        image_url: rec.image_url_text().to_string(),
        product_url: rec.product_url_text().to_string(),
    })
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_rating(text: &str) -> Option<f64> {
    parse_number(text).filter(|r| (0.0..=MAX_RATING).contains(r))
}

/// Whole, non-negative counts only.
fn parse_reviews(text: &str) -> Option<u64> {
    parse_number(text)
        .filter(|n| *n >= 0.0 && n.fract() == 0.0 && *n <= u64::MAX as f64)
        .map(|n| n as u64)
}

fn parse_price(text: &str) -> Option<f64> {
    parse_number(text).filter(|p| *p >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: &str, brand: &str, rating: &str, reviews: &str, price: &str) -> RawRecord {
        RawRecord {
            title: Some(title.into()),
            brand: Some(brand.into()),
            rating: Some(rating.into()),
            reviews: Some(reviews.into()),
            price: Some(price.into()),
            image_url: Some(format!("https://img/{title}.jpg")),
            product_url: Some(format!("https://shop/{title}")),
        }
    }

    fn titles(report: &CleanReport) -> Vec<&str> {
        report.table.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn duplicate_titles_keep_the_first_record() {
        let report = clean(&[
            raw("Widget X", "Acme", "4.0", "10", "100"),
            raw("Widget X", "Globex", "5.0", "99", "50"),
        ]);
        assert_eq!(report.table.len(), 1);
        assert_eq!(report.table.rows()[0].brand, "Acme");
        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(report.invalid_removed, 0);
    }

    #[test]
    fn duplicate_is_dropped_even_when_first_is_invalid() {
        let report = clean(&[
            raw("Widget X", "Acme", "N/A", "10", "100"),
            raw("Widget X", "Acme", "4.0", "10", "100"),
        ]);
        assert!(report.table.is_empty());
        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(report.invalid_removed, 1);
    }

    #[test]
    fn rating_text_is_coerced() {
        let report = clean(&[raw("A", "Acme", "4.5", "1", "1")]);
        assert_eq!(report.table.rows()[0].rating, 4.5);
    }

    #[test]
    fn unparseable_numbers_drop_the_row() {
        let report = clean(&[
            raw("A", "Acme", "N/A", "1", "1"),
            raw("B", "Acme", "4.0", "many", "1"),
            raw("C", "Acme", "4.0", "1", "₹99"),
            raw("D", "Acme", "4.0", "1", "99"),
        ]);
        assert_eq!(titles(&report), ["D"]);
        assert_eq!(report.invalid_removed, 3);
    }

    #[test]
    fn blank_numbers_drop_the_row() {
        let report = clean(&[
            raw("A", "Acme", "", "1", "1"),
            raw("B", "Acme", "4.0", "", "1"),
            raw("C", "Acme", "4.0", "1", ""),
        ]);
        assert!(report.table.is_empty());
        assert_eq!(report.invalid_removed, 3);
    }

    #[test]
    fn missing_fields_are_zero_not_missing() {
        let rec = RawRecord {
            title: Some("Bare".into()),
            ..Default::default()
        };
        let report = clean(&[rec]);
        let row = &report.table.rows()[0];
        assert_eq!(row.brand, "Unknown");
        assert_eq!((row.rating, row.reviews, row.price), (0.0, 0, 0.0));
        assert_eq!(row.image_url, "N/A");
        assert_eq!(row.product_url, "N/A");
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let report = clean(&[
            raw("A", "Acme", "5.5", "1", "1"),
            raw("B", "Acme", "-1", "1", "1"),
            raw("C", "Acme", "4", "-3", "1"),
            raw("D", "Acme", "4", "2.5", "1"),
            raw("E", "Acme", "4", "2", "-10"),
            raw("F", "Acme", "NaN", "2", "10"),
            raw("G", "Acme", "5", "0", "inf"),
            raw("H", "Acme", "5", "0", "1299."),
        ]);
        assert_eq!(titles(&report), ["H"]);
        assert_eq!(report.table.rows()[0].price, 1299.0);
    }

    #[test]
    fn order_is_first_seen_and_dense() {
        let report = clean(&[
            raw("C", "Acme", "3", "1", "1"),
            raw("bad", "Acme", "x", "1", "1"),
            raw("A", "Acme", "4", "1", "1"),
            raw("C", "Acme", "1", "1", "1"),
            raw("B", "Acme", "2", "1", "1"),
        ]);
        assert_eq!(titles(&report), ["C", "A", "B"]);
        assert_eq!(report.table.rows()[0].rating, 3.0);
    }

    #[test]
    fn cleaning_is_a_fixed_point() {
        let first = clean(&[
            raw("A", "Acme", "4.5", "1200", "199"),
            raw("B", "Globex", "3", "0", "0"),
            raw("B", "Initech", "1", "1", "1"),
            raw("C", "Acme", "N/A", "5", "299"),
            raw("D", "Acme", "4.25", "7", "12.75"),
        ]);
        let again: Vec<RawRecord> = first.table.iter().map(CleanRecord::to_raw).collect();
        let second = clean(&again);
        assert_eq!(second.table, first.table);
        assert_eq!(second.duplicates_removed, 0);
        assert_eq!(second.invalid_removed, 0);
    }

    #[test]
    fn empty_input_is_empty_table() {
        let report = clean(&[]);
        assert!(report.table.is_empty());
        assert_eq!(report, CleanReport::default());
    }
}
