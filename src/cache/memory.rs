//! In-process cache backends.

use std::time::Duration;

use bytes::Bytes;
use moka::future::Cache;

use super::{CacheError, CacheKey, ResponseCache};

/// Bounded in-memory cache on top of [`moka`], with optional time-to-live.
///
/// Clones share the same underlying storage.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use bytes::Bytes;
/// use economy_api::cache::{CacheKey, MemoryCache, ResponseCache};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let cache = MemoryCache::new(1_000, Some(Duration::from_secs(60)));
/// let key = CacheKey::builder("listings-count").param(1).build();
///
/// assert!(cache.get(&key).await.is_none());
/// cache.set(key.clone(), Bytes::from_static(b"{\"total\":4}")).await.unwrap();
/// assert_eq!(cache.get(&key).await.unwrap(), Bytes::from_static(b"{\"total\":4}"));
/// # }
/// ```
#[derive(Clone)]
pub struct MemoryCache {
    inner: Cache<CacheKey, Bytes>,
}

impl MemoryCache {
    /// `capacity` bounds the number of entries; `ttl` of `None` keeps entries
    /// until they are evicted for space.
    pub fn new(capacity: u64, ttl: Option<Duration>) -> Self {
        let mut builder = Cache::builder().max_capacity(capacity);
        if let Some(ttl) = ttl {
            builder = builder.time_to_live(ttl);
        }
        Self {
            inner: builder.build(),
        }
    }
}

impl ResponseCache for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Option<Bytes> {
        self.inner.get(key).await
    }

    async fn set(&self, key: CacheKey, value: Bytes) -> Result<(), CacheError> {
        self.inner.insert(key, value).await;
        Ok(())
    }
}

/// A cache that never stores anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl ResponseCache for NoopCache {
    async fn get(&self, _key: &CacheKey) -> Option<Bytes> {
        None
    }

    async fn set(&self, _key: CacheKey, _value: Bytes) -> Result<(), CacheError> {
        Ok(())
    }
}
