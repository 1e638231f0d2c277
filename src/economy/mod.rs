//! The economy API: item summaries, item detail, listings and listing counts.
//!
//! | Method | Path                  | Query                              | Cached |
//! |--------|-----------------------|------------------------------------|--------|
//! | GET    | `/items`              | `season?`, `days?`                 | yes    |
//! | GET    | `/items/:itemName`    | `season?`, `limit?`                | yes    |
//! | GET    | `/listings/:itemName` | `date?` or `ingestionDate?`, `season?` | no |
//! | GET    | `/listings-count`     | `season?`                          | yes    |
//!
//! All paths live under a configurable prefix. Failures answer
//! `{"error":{"message": ...}}`.

use std::sync::Arc;

use crate::Router;
use crate::cache::ResponseCache;
use crate::context::Context;
use crate::database::{MarketStore, Season};
use crate::middleware::LoggerMiddleware;

pub mod error;
pub mod handlers;
pub mod params;
pub mod service;
pub mod validation;

pub use error::{ApiError, Endpoint};
pub use service::{EconomyService, ItemsSummary, ListingsCount};
pub use validation::SeasonValidation;

/// Defaults applied when a request leaves a parameter out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EconomySettings {
    pub current_season: Season,
    pub default_days: u32,
}

/// Builds a router serving the economy endpoints under `prefix`, with
/// request logging and season validation in front of every handler.
pub fn router<S, C>(service: Arc<EconomyService<S, C>>, prefix: &str) -> Router
where
    S: MarketStore,
    C: ResponseCache,
{
    let prefix = prefix.trim_end_matches('/');
    let mut router = Router::new();
    router.layer(LoggerMiddleware);
    router.layer(SeasonValidation);

    let svc = Arc::clone(&service);
    router.get(&format!("{prefix}/items"), move |ctx: Context| {
        let svc = Arc::clone(&svc);
        async move { handlers::items_summary(&svc, ctx).await }
    });

    let svc = Arc::clone(&service);
    router.get(&format!("{prefix}/items/:itemName"), move |ctx: Context| {
        let svc = Arc::clone(&svc);
        async move { handlers::item_detail(&svc, ctx).await }
    });

    let svc = Arc::clone(&service);
    router.get(&format!("{prefix}/listings/:itemName"), move |ctx: Context| {
        let svc = Arc::clone(&svc);
        async move { handlers::listings(&svc, ctx).await }
    });

    let svc = service;
    router.get(&format!("{prefix}/listings-count"), move |ctx: Context| {
        let svc = Arc::clone(&svc);
        async move { handlers::listings_count(&svc, ctx).await }
    });

    router
}
