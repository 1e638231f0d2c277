//! Endpoint logic independent of HTTP: parse results in, JSON bytes or an
//! [`ApiError`] out.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::params::{DateSelector, ItemQuery, ItemsQuery, ListingsQuery};
use super::{ApiError, EconomySettings};
use crate::cache::{CacheKey, ResponseCache};
use crate::database::{ItemSummary, MarketStore, Season};

/// Body of `GET /items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsSummary {
    pub items: Vec<ItemSummary>,
    pub total_listings: u64,
    pub last_updated: DateTime<Utc>,
}

/// Body of `GET /listings-count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingsCount {
    pub total: u64,
}

/// Store and cache, wired together with the configured defaults.
pub struct EconomyService<S, C> {
    store: S,
    cache: C,
    settings: EconomySettings,
}

impl<S: MarketStore, C: ResponseCache> EconomyService<S, C> {
    pub fn new(store: S, cache: C, settings: EconomySettings) -> Self {
        Self {
            store,
            cache,
            settings,
        }
    }

    pub fn settings(&self) -> &EconomySettings {
        &self.settings
    }

    /// Summaries, season total and a fresh timestamp, cached as one body.
    pub async fn items_summary(&self, query: &ItemsQuery) -> Result<Bytes, ApiError> {
        let key = CacheKey::builder("items")
            .param(query.season)
            .param(query.days)
            .build();

        self.cached(key, move || async move {
            let items = self.store.item_summaries(query.season, query.days).await?;
            let total_listings = self.store.total_listings(query.season).await?;
            Ok::<_, ApiError>(ItemsSummary {
                items,
                total_listings,
                last_updated: Utc::now(),
            })
        })
        .await
    }

    pub async fn item_detail(&self, query: &ItemQuery) -> Result<Bytes, ApiError> {
        let key = CacheKey::builder("item")
            .param(query.season)
            .param(&query.item_name)
            .opt_param(query.limit)
            .build();

        self.cached(key, move || async move {
            let detail = self
                .store
                .item_detail(&query.item_name, query.season, query.limit)
                .await?;
            Ok::<_, ApiError>(detail)
        })
        .await
    }

    /// Never cached; exactly one of the two store lookups runs.
    pub async fn listings(&self, query: &ListingsQuery) -> Result<Bytes, ApiError> {
        let listings = match query.selector {
            DateSelector::Data(date) => {
                self.store
                    .listings_by_date(&query.item_name, date, query.season)
                    .await?
            }
            DateSelector::Ingestion(date) => {
                self.store
                    .listings_by_ingestion_date(&query.item_name, date, query.season)
                    .await?
            }
        };
        Ok(Bytes::from(serde_json::to_vec(&listings)?))
    }

    pub async fn listings_count(&self, season: Season) -> Result<Bytes, ApiError> {
        let key = CacheKey::builder("listings-count").param(season).build();

        self.cached(key, move || async move {
            let total = self.store.total_listings(season).await?;
            Ok::<_, ApiError>(ListingsCount { total })
        })
        .await
    }

    /// Returns the cached body for `key`, or computes, serializes and stores it.
    async fn cached<T, F, Fut>(&self, key: CacheKey, compute: F) -> Result<Bytes, ApiError>
    where
        T: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        if let Some(body) = self.cache.get(&key).await {
            debug!(%key, "cache hit");
            return Ok(body);
        }
        debug!(%key, "cache miss");

        let payload = compute().await?;
        let body = Bytes::from(serde_json::to_vec(&payload)?);
        self.cache.set(key, body.clone()).await?;
        Ok(body)
    }
}
