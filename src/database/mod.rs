//! Database layer: the read queries the economy endpoints are built on.
//!
//! [`MarketStore`] is the seam between handlers and storage. The production
//! implementation is [`SqliteStore`]; tests substitute their own stores to
//! record calls or inject faults.

use std::future::Future;

use chrono::NaiveDate;
use thiserror::Error;

pub mod models;
pub mod sqlite;

pub use models::{DailyPrice, InvalidSeason, ItemDetail, ItemSummary, Listing, NewListing, Season};
pub use sqlite::SqliteStore;

/// Errors raised by a [`MarketStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("blocking query task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("database connection mutex poisoned")]
    Poisoned,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to market listings.
///
/// Methods return `Send` futures so handlers built on them can run on the
/// multi-threaded runtime.
pub trait MarketStore: Send + Sync + 'static {
    /// Per-item aggregates over the `days` calendar days ending at the
    /// season's most recent data date, ordered by item name.
    fn item_summaries(
        &self,
        season: Season,
        days: u32,
    ) -> impl Future<Output = Result<Vec<ItemSummary>, StoreError>> + Send;

    /// Number of listings recorded for the season.
    fn total_listings(&self, season: Season) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Listings of `item_name` whose market event happened on `date`.
    fn listings_by_date(
        &self,
        item_name: &str,
        date: NaiveDate,
        season: Season,
    ) -> impl Future<Output = Result<Vec<Listing>, StoreError>> + Send;

    /// Listings of `item_name` that entered the system on `date`.
    fn listings_by_ingestion_date(
        &self,
        item_name: &str,
        date: NaiveDate,
        season: Season,
    ) -> impl Future<Output = Result<Vec<Listing>, StoreError>> + Send;

    /// Season statistics for one item with at most `limit` history days
    /// (unbounded when `None`).
    fn item_detail(
        &self,
        item_name: &str,
        season: Season,
        limit: Option<u32>,
    ) -> impl Future<Output = Result<ItemDetail, StoreError>> + Send;
}
