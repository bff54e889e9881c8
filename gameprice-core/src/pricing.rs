//! Price aggregation and the authenticity heuristic
//!
//! Listing prices arrive as marketplace-formatted text. This module turns them
//! into numbers, derives a market-value estimate (mean and median) and flags
//! listings that are likely reproductions.
//!
//! A listing is flagged "possibly not authentic" when either:
//! - its title contains one of the configured keywords (case-insensitive), or
//! - its parsed price is strictly below `ratio * median` of all parsed prices.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::listing::Listing;

/// Default fraction of the median below which a price is suspicious
pub const DEFAULT_MEDIAN_RATIO: f64 = 0.6;

/// Default title keywords that mark a listing as a likely reproduction
pub const DEFAULT_KEYWORDS: [&str; 6] = [
    "repro",
    "bootleg",
    "copy",
    "aftermarket",
    "not original",
    "clone",
];

/// Parse a marketplace price string into a number
///
/// Strips every character that is not an ASCII digit or a decimal point, so
/// `"$1,299.00"` becomes `1299.0`. No locale handling: text with more than one
/// decimal point after stripping does not parse and yields `None`.
pub fn parse_price(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Arithmetic mean, `0.0` for an empty slice
pub fn average(nums: &[f64]) -> f64 {
    if nums.is_empty() {
        return 0.0;
    }
    nums.iter().sum::<f64>() / nums.len() as f64
}

/// Sorted-midpoint median, `None` for an empty slice
pub fn median(nums: &[f64]) -> Option<f64> {
    if nums.is_empty() {
        return None;
    }

    let mut sorted = nums.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Tunables for the authenticity heuristic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticityConfig {
    /// Prices strictly below `median_ratio * median` are flagged
    pub median_ratio: f64,
    /// Lowercased title keywords
    pub keywords: Vec<String>,
}

impl Default for AuthenticityConfig {
    fn default() -> Self {
        Self {
            median_ratio: DEFAULT_MEDIAN_RATIO,
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl AuthenticityConfig {
    pub fn new(median_ratio: f64, keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            median_ratio,
            keywords: keywords
                .into_iter()
                .map(|k| k.into().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// First keyword contained in `title`, if any
    pub fn matching_keyword(&self, title: &str) -> Option<&str> {
        let title = title.to_lowercase();
        self.keywords
            .iter()
            .find(|k| title.contains(k.as_str()))
            .map(String::as_str)
    }

    /// Classify one listing against the median of its result set
    pub fn assess(&self, listing: &Listing, median: Option<f64>) -> ListingAssessment {
        let price = listing.price();

        let reason = if let Some(keyword) = self.matching_keyword(&listing.title) {
            Some(FlagReason::Keyword {
                keyword: keyword.to_string(),
            })
        } else {
            match (price, median) {
                (Some(price), Some(median)) if price < self.median_ratio * median => {
                    Some(FlagReason::BelowMedian {
                        price,
                        threshold: self.median_ratio * median,
                    })
                }
                _ => None,
            }
        };

        let verdict = if reason.is_some() {
            Authenticity::PossiblyNotAuthentic
        } else {
            Authenticity::LooksAuthentic
        };

        ListingAssessment {
            item_id: listing.item_id.clone(),
            price,
            verdict,
            reason,
        }
    }
}

/// Authenticity verdict for a single listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Authenticity {
    LooksAuthentic,
    PossiblyNotAuthentic,
}

impl Authenticity {
    pub fn label(&self) -> &'static str {
        match self {
            Authenticity::LooksAuthentic => "Looks authentic",
            Authenticity::PossiblyNotAuthentic => "Possibly not authentic",
        }
    }
}

/// Why a listing was flagged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlagReason {
    Keyword { keyword: String },
    BelowMedian { price: f64, threshold: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingAssessment {
    pub item_id: String,
    pub price: Option<f64>,
    pub verdict: Authenticity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FlagReason>,
}

impl ListingAssessment {
    pub fn is_flagged(&self) -> bool {
        self.verdict == Authenticity::PossiblyNotAuthentic
    }
}

/// Market-value estimate for one query, recomputed on every fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedPriceView {
    /// Mean of parsed prices (`0.0` when nothing parsed)
    pub average: f64,
    pub median: Option<f64>,
    pub lowest: Option<f64>,
    /// Number of listings with a usable price
    pub sample_size: usize,
    /// One entry per listing, in listing order
    pub assessments: Vec<ListingAssessment>,
}

impl AggregatedPriceView {
    pub fn flagged_count(&self) -> usize {
        self.assessments.iter().filter(|a| a.is_flagged()).count()
    }
}

/// Aggregate a result set into prices and per-listing verdicts
pub fn aggregate(listings: &[Listing], config: &AuthenticityConfig) -> AggregatedPriceView {
    let prices: Vec<f64> = listings.iter().filter_map(Listing::price).collect();

    let mid = median(&prices);
    let assessments: Vec<ListingAssessment> = listings
        .iter()
        .map(|listing| config.assess(listing, mid))
        .collect();

    let view = AggregatedPriceView {
        average: average(&prices),
        median: mid,
        lowest: prices.iter().copied().reduce(f64::min),
        sample_size: prices.len(),
        assessments,
    };

    debug!(
        "Aggregated {} listings ({} priced): average={:.2}, median={:?}, flagged={}",
        listings.len(),
        view.sample_size,
        view.average,
        view.median,
        view.flagged_count()
    );

    view
}
