//! Read-only views over a [`CleanTable`].
//!
//! Every view is a pure function of the table and is recomputed on each call.
//! Ranked views sort stably, so ties keep the order in which the brand or row
//! first appears in the table.

use std::fmt;

use indexmap::IndexMap;

use crate::clean::{CleanRecord, CleanTable};

#[derive(Debug, Clone, PartialEq)]
pub struct BrandCount {
    pub brand: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrandRating {
    pub brand: String,
    pub mean_rating: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrandShare {
    pub brand: String,
    /// Percentage of the rows covered by the ranked brands, not of the whole table.
    pub percent: f64,
}

/// Rating ranges used to group prices. All are left-closed and right-open except
/// `FourToFive`, which also includes 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RatingBucket {
    ZeroToTwo,
    TwoToThree,
    ThreeToFour,
    FourToFive,
}

impl RatingBucket {
    pub const ALL: [RatingBucket; 4] = [
        RatingBucket::ZeroToTwo,
        RatingBucket::TwoToThree,
        RatingBucket::ThreeToFour,
        RatingBucket::FourToFive,
    ];

    /// `None` for ratings outside `[0, 5]`.
    pub fn of(rating: f64) -> Option<Self> {
        match rating {
            r if (0.0..2.0).contains(&r) => Some(RatingBucket::ZeroToTwo),
            r if (2.0..3.0).contains(&r) => Some(RatingBucket::TwoToThree),
            r if (3.0..4.0).contains(&r) => Some(RatingBucket::ThreeToFour),
            r if (4.0..=5.0).contains(&r) => Some(RatingBucket::FourToFive),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RatingBucket::ZeroToTwo => "0-2",
            RatingBucket::TwoToThree => "2-3",
            RatingBucket::ThreeToFour => "3-4",
            RatingBucket::FourToFive => "4-5",
        }
    }
}

impl fmt::Display for RatingBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BucketPrice {
    pub bucket: RatingBucket,
    /// `None` when no row falls into the bucket.
    pub mean_price: Option<f64>,
}

/// Per brand, in order of first appearance: (rows, summed rating).
fn group_by_brand(table: &CleanTable) -> IndexMap<&str, (usize, f64)> {
    let mut groups: IndexMap<&str, (usize, f64)> = IndexMap::new();
    for row in table {
        let group = groups.entry(row.brand.as_str()).or_insert((0, 0.0));
        group.0 += 1;
        group.1 += row.rating;
    }
    groups
}

pub fn top_brands_by_count(table: &CleanTable, k: usize) -> Vec<BrandCount> {
    let mut counts: Vec<(&str, usize)> = group_by_brand(table)
        .into_iter()
        .map(|(brand, (count, _))| (brand, count))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(k)
        .map(|(brand, count)| BrandCount {
            brand: brand.to_string(),
            count,
        })
        .collect()
}

pub fn top_brands_by_mean_rating(table: &CleanTable, k: usize) -> Vec<BrandRating> {
    let mut means: Vec<(&str, f64)> = group_by_brand(table)
        .into_iter()
        .map(|(brand, (count, sum))| (brand, sum / count as f64))
        .collect();
    means.sort_by(|a, b| b.1.total_cmp(&a.1));
    means
        .into_iter()
        .take(k)
        .map(|(brand, mean_rating)| BrandRating {
            brand: brand.to_string(),
            mean_rating,
        })
        .collect()
}

/// Share of each of the `k` most frequent brands within those `k` brands.
pub fn brand_share(table: &CleanTable, k: usize) -> Vec<BrandShare> {
    let top = top_brands_by_count(table, k);
    let total: usize = top.iter().map(|b| b.count).sum();
    if total == 0 {
        return Vec::new();
    }
    top.into_iter()
        .map(|b| BrandShare {
            percent: b.count as f64 * 100.0 / total as f64,
            brand: b.brand,
        })
        .collect()
}

/// Mean price for each of the four rating buckets, always in bucket order.
pub fn mean_price_by_rating_bucket(table: &CleanTable) -> Vec<BucketPrice> {
    let mut sums = [(0.0f64, 0usize); 4];
    for row in table {
        if let Some(bucket) = RatingBucket::of(row.rating) {
            let slot = &mut sums[bucket as usize];
            slot.0 += row.price;
            slot.1 += 1;
        }
    }
    RatingBucket::ALL
        .iter()
        .zip(sums)
        .map(|(&bucket, (sum, count))| BucketPrice {
            bucket,
            mean_price: (count > 0).then(|| sum / count as f64),
        })
        .collect()
}

/// The `k` rows with the most reviews; equal counts keep table order.
pub fn top_by_reviews(table: &CleanTable, k: usize) -> Vec<&CleanRecord> {
    top_by(table, k, |a, b| b.reviews.cmp(&a.reviews))
}

/// The `k` highest rated rows; equal ratings keep table order.
pub fn top_by_rating(table: &CleanTable, k: usize) -> Vec<&CleanRecord> {
    top_by(table, k, |a, b| b.rating.total_cmp(&a.rating))
}

fn top_by<F>(table: &CleanTable, k: usize, cmp: F) -> Vec<&CleanRecord>
where
    F: Fn(&CleanRecord, &CleanRecord) -> std::cmp::Ordering,
{
    let mut rows: Vec<&CleanRecord> = table.iter().collect();
    rows.sort_by(|a, b| cmp(a, b));
    rows.truncate(k);
    rows
}

/// `(price, rating)` for every row, in table order.
pub fn price_rating_points(table: &CleanTable) -> Vec<(f64, f64)> {
    table.iter().map(|row| (row.price, row.rating)).collect()
}

/// Pearson correlation between price and rating.
/// `None` with fewer than two rows or when either column is constant.
pub fn price_rating_correlation(table: &CleanTable) -> Option<f64> {
    let n = table.len();
    if n < 2 {
        return None;
    }
    let n_f = n as f64;
    let mean_price = table.iter().map(|r| r.price).sum::<f64>() / n_f;
    let mean_rating = table.iter().map(|r| r.rating).sum::<f64>() / n_f;

    let (mut cov, mut var_price, mut var_rating) = (0.0, 0.0, 0.0);
    for row in table {
        let dp = row.price - mean_price;
        let dr = row.rating - mean_rating;
        cov += dp * dr;
        var_price += dp * dp;
        var_rating += dr * dr;
    }
    if var_price == 0.0 || var_rating == 0.0 {
        return None;
    }
    Some(cov / (var_price.sqrt() * var_rating.sqrt()))
}

/// Every view over one table, computed with the same `k`.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub top_k: usize,
    pub brand_counts: Vec<BrandCount>,
    pub brand_ratings: Vec<BrandRating>,
    pub brand_shares: Vec<BrandShare>,
    pub bucket_prices: Vec<BucketPrice>,
    pub price_rating_correlation: Option<f64>,
    pub top_reviewed: Vec<CleanRecord>,
    pub top_rated: Vec<CleanRecord>,
}

impl Analysis {
    pub fn compute(table: &CleanTable, k: usize) -> Self {
        Self {
            top_k: k,
            brand_counts: top_brands_by_count(table, k),
            brand_ratings: top_brands_by_mean_rating(table, k),
            brand_shares: brand_share(table, k),
            bucket_prices: mean_price_by_rating_bucket(table),
            price_rating_correlation: price_rating_correlation(table),
            top_reviewed: top_by_reviews(table, k).into_iter().cloned().collect(),
            top_rated: top_by_rating(table, k).into_iter().cloned().collect(),
        }
    }
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let k = self.top_k;

        writeln!(f, "Top {k} Brands by Frequency:")?;
        for b in &self.brand_counts {
            writeln!(f, "  {:<40} {}", b.brand, b.count)?;
        }

        writeln!(f, "\nTop {k} Brands by Average Rating:")?;
        for b in &self.brand_ratings {
            writeln!(f, "  {:<40} {:.2}", b.brand, b.mean_rating)?;
        }

        writeln!(f, "\nPercentage Share of Top {k} Brands:")?;
        for b in &self.brand_shares {
            writeln!(f, "  {:<40} {:.1}%", b.brand, b.percent)?;
        }

        writeln!(f, "\nAverage Price by Rating Range:")?;
        for b in &self.bucket_prices {
            match b.mean_price {
                Some(mean) => writeln!(f, "  {:<40} {:.2}", b.bucket, mean)?,
                None => writeln!(f, "  {:<40} NaN", b.bucket)?,
            }
        }

        match self.price_rating_correlation {
            Some(r) => writeln!(f, "\nPrice vs. Rating correlation: {r:.3}")?,
            None => writeln!(f, "\nPrice vs. Rating correlation: n/a")?,
        }

        writeln!(f, "\nTop {k} Products by Reviews:")?;
        for row in &self.top_reviewed {
            writeln!(f, "  {:<60} {}", truncate(&row.title, 60), row.reviews)?;
        }

        writeln!(f, "\nTop {k} Products by Rating:")?;
        for row in &self.top_rated {
            writeln!(f, "  {:<60} {}", truncate(&row.title, 60), row.rating)?;
        }
        Ok(())
    }
}

/// Cuts long product titles on a char boundary so the columns line up.
fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
