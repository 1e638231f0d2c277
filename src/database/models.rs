//! Rows and aggregates returned by a [`MarketStore`](super::MarketStore).
//!
//! Everything serializes in camelCase because these shapes are written to
//! HTTP responses unchanged.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An integer epoch partitioning the dataset. Always at least 1.
///
/// # Examples
///
/// ```
/// use economy_api::database::Season;
///
/// let season: Season = "12".parse().unwrap();
/// assert_eq!(season.get(), 12);
/// assert!("0".parse::<Season>().is_err());
/// assert!("-3".parse::<Season>().is_err());
/// assert!("twelve".parse::<Season>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Season(u32);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("season must be a positive integer, got {0:?}")]
pub struct InvalidSeason(pub String);

impl Season {
    pub const FIRST: Season = Season(1);

    pub fn new(value: u32) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl FromStr for Season {
    type Err = InvalidSeason;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>()
            .ok()
            .and_then(Season::new)
            .ok_or_else(|| InvalidSeason(s.to_owned()))
    }
}

impl TryFrom<u32> for Season {
    type Error = InvalidSeason;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Season::new(value).ok_or_else(|| InvalidSeason(value.to_string()))
    }
}

impl From<Season> for u32 {
    fn from(season: Season) -> u32 {
        season.0
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A single market offer/transaction record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: i64,
    pub season: Season,
    pub item_name: String,
    /// Unit price in the smallest currency unit.
    pub price: i64,
    pub quantity: i64,
    pub seller: Option<String>,
    /// Day the market event happened.
    pub data_date: NaiveDate,
    /// Day the record entered the system.
    pub ingestion_date: NaiveDate,
}

/// A listing that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub season: Season,
    pub item_name: String,
    pub price: i64,
    pub quantity: i64,
    pub seller: Option<String>,
    pub data_date: NaiveDate,
    pub ingestion_date: NaiveDate,
}

/// Aggregated prices for one item over a season's day window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub item_name: String,
    pub listings: u64,
    pub total_quantity: i64,
    pub min_price: i64,
    pub max_price: i64,
    pub avg_price: f64,
    pub first_seen: NaiveDate,
    pub last_seen: NaiveDate,
}

/// One data date's worth of prices for an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPrice {
    pub date: NaiveDate,
    pub listings: u64,
    pub quantity: i64,
    pub min_price: i64,
    pub max_price: i64,
    pub avg_price: f64,
}

/// Season-wide statistics for one item plus its daily price history.
///
/// Price fields are `None` when the item has no listings in the season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetail {
    pub item_name: String,
    pub season: Season,
    pub total_listings: u64,
    pub total_quantity: i64,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub avg_price: Option<f64>,
    /// Newest first.
    pub history: Vec<DailyPrice>,
}
