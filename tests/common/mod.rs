#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use chrono::NaiveDate;
use economy_api::cache::{CacheError, CacheKey, MemoryCache, ResponseCache};
use economy_api::database::{
    DailyPrice, ItemDetail, ItemSummary, Listing, MarketStore, Season, StoreError,
};
use economy_api::economy::{self, EconomyService, EconomySettings};
use economy_api::{Request, Response, Router};

pub const PREFIX: &str = "/api/economy";

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

pub fn season(n: u32) -> Season {
    Season::new(n).unwrap()
}

pub fn settings() -> EconomySettings {
    EconomySettings {
        current_season: season(3),
        default_days: 7,
    }
}

/// A store call as observed by [`RecordingStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ItemSummaries(Season, u32),
    TotalListings(Season),
    ListingsByDate(String, NaiveDate, Season),
    ListingsByIngestionDate(String, NaiveDate, Season),
    ItemDetail(String, Season, Option<u32>),
}

/// Answers every query with fixed data and records what it was asked.
#[derive(Clone, Default)]
pub struct RecordingStore {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl RecordingStore {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn listing(item_name: &str, season: Season, data_date: NaiveDate) -> Listing {
    Listing {
        id: 1,
        season,
        item_name: item_name.to_owned(),
        price: 25,
        quantity: 4,
        seller: Some("trader".to_owned()),
        data_date,
        ingestion_date: data_date,
    }
}

impl MarketStore for RecordingStore {
    async fn item_summaries(&self, season: Season, days: u32) -> Result<Vec<ItemSummary>, StoreError> {
        self.record(Call::ItemSummaries(season, days));
        Ok(vec![ItemSummary {
            item_name: "Iron Ore".to_owned(),
            listings: 2,
            total_quantity: 8,
            min_price: 10,
            max_price: 14,
            avg_price: 12.0,
            first_seen: day(1),
            last_seen: day(days.min(28)),
        }])
    }

    async fn total_listings(&self, season: Season) -> Result<u64, StoreError> {
        self.record(Call::TotalListings(season));
        Ok(42)
    }

    async fn listings_by_date(
        &self,
        item_name: &str,
        date: NaiveDate,
        season: Season,
    ) -> Result<Vec<Listing>, StoreError> {
        self.record(Call::ListingsByDate(item_name.to_owned(), date, season));
        Ok(vec![listing(item_name, season, date)])
    }

    async fn listings_by_ingestion_date(
        &self,
        item_name: &str,
        date: NaiveDate,
        season: Season,
    ) -> Result<Vec<Listing>, StoreError> {
        self.record(Call::ListingsByIngestionDate(item_name.to_owned(), date, season));
        Ok(vec![listing(item_name, season, date)])
    }

    async fn item_detail(
        &self,
        item_name: &str,
        season: Season,
        limit: Option<u32>,
    ) -> Result<ItemDetail, StoreError> {
        self.record(Call::ItemDetail(item_name.to_owned(), season, limit));
        Ok(ItemDetail {
            item_name: item_name.to_owned(),
            season,
            total_listings: 1,
            total_quantity: 4,
            min_price: Some(25),
            max_price: Some(25),
            avg_price: Some(25.0),
            history: vec![DailyPrice {
                date: day(2),
                listings: 1,
                quantity: 4,
                min_price: 25,
                max_price: 25,
                avg_price: 25.0,
            }],
        })
    }
}

/// Fails every query.
#[derive(Clone, Copy, Default)]
pub struct FailingStore;

fn down() -> StoreError {
    StoreError::Unavailable("connection refused".to_owned())
}

impl MarketStore for FailingStore {
    async fn item_summaries(&self, _: Season, _: u32) -> Result<Vec<ItemSummary>, StoreError> {
        Err(down())
    }

    async fn total_listings(&self, _: Season) -> Result<u64, StoreError> {
        Err(down())
    }

    async fn listings_by_date(&self, _: &str, _: NaiveDate, _: Season) -> Result<Vec<Listing>, StoreError> {
        Err(down())
    }

    async fn listings_by_ingestion_date(
        &self,
        _: &str,
        _: NaiveDate,
        _: Season,
    ) -> Result<Vec<Listing>, StoreError> {
        Err(down())
    }

    async fn item_detail(&self, _: &str, _: Season, _: Option<u32>) -> Result<ItemDetail, StoreError> {
        Err(down())
    }
}

/// A [`MemoryCache`] that also remembers which keys were written.
#[derive(Clone)]
pub struct CountingCache {
    inner: MemoryCache,
    writes: Arc<Mutex<Vec<String>>>,
}

impl CountingCache {
    pub fn new() -> Self {
        Self {
            inner: MemoryCache::new(1_000, None),
            writes: Arc::default(),
        }
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

impl ResponseCache for CountingCache {
    async fn get(&self, key: &CacheKey) -> Option<Bytes> {
        self.inner.get(key).await
    }

    async fn set(&self, key: CacheKey, value: Bytes) -> Result<(), CacheError> {
        self.writes.lock().unwrap().push(key.to_string());
        self.inner.set(key, value).await
    }
}

/// Misses on every lookup and refuses every write.
#[derive(Clone, Copy, Default)]
pub struct FailingCache;

impl ResponseCache for FailingCache {
    async fn get(&self, _key: &CacheKey) -> Option<Bytes> {
        None
    }

    async fn set(&self, _key: CacheKey, _value: Bytes) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection reset".to_owned()))
    }
}

pub fn router<S: MarketStore + Clone, C: ResponseCache + Clone>(store: &S, cache: &C) -> Router {
    let service = EconomyService::new(store.clone(), cache.clone(), settings());
    economy::router(Arc::new(service), PREFIX)
}

pub async fn get(router: &Router, target: &str) -> Response {
    send(router, "GET", target).await
}

pub async fn send(router: &Router, method: &str, target: &str) -> Response {
    let raw = format!("{method} {PREFIX}{target} HTTP/1.1\r\nHost: localhost\r\n\r\n");
    let (request, _) = Request::parse(raw.as_bytes()).unwrap();
    router.route(request).await
}

pub fn json(response: &Response) -> serde_json::Value {
    serde_json::from_slice(response.content()).unwrap()
}
