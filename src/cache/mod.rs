//! Response cache: serialized JSON bodies addressed by [`CacheKey`].
//!
//! Handlers consult the cache themselves (read-through is the caller's job).
//! Eviction and expiry belong to the backend; nothing here invalidates
//! entries. Concurrent writers to one key race and the last write wins,
//! which is harmless because every entry can be recomputed from the store.

use std::future::Future;

use bytes::Bytes;
use thiserror::Error;

pub mod key;
pub mod memory;

pub use key::{CacheKey, CacheKeyBuilder};
pub use memory::{MemoryCache, NoopCache};

/// Failure to store an entry in a backend that can fail.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

/// Key-value store for response bodies.
pub trait ResponseCache: Send + Sync + 'static {
    /// Looks up a body. A miss is `None`; backends that fail internally log
    /// the failure and report a miss.
    fn get(&self, key: &CacheKey) -> impl Future<Output = Option<Bytes>> + Send;

    /// Stores `value` under `key`, replacing any previous entry.
    fn set(&self, key: CacheKey, value: Bytes) -> impl Future<Output = Result<(), CacheError>> + Send;
}
