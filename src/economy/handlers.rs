//! HTTP adapters: parse the [`Context`], call the service, map the result.
//!
//! This is the only place an [`ApiError`] becomes a status code.

use bytes::Bytes;

use super::error::Endpoint;
use super::params::{self, ItemQuery, ItemsQuery, ListingsQuery};
use super::{ApiError, EconomyService};
use crate::cache::ResponseCache;
use crate::context::Context;
use crate::database::MarketStore;
use crate::{Response, StatusCode};

fn respond(endpoint: Endpoint, result: Result<Bytes, ApiError>) -> Response {
    match result {
        Ok(body) => Response::json_bytes(StatusCode::Ok, body),
        Err(e) => e.into_response(endpoint),
    }
}

/// `GET /items`
pub async fn items_summary<S: MarketStore, C: ResponseCache>(
    service: &EconomyService<S, C>,
    ctx: Context,
) -> Response {
    let result = async {
        let query = ItemsQuery::from_context(&ctx, service.settings())?;
        service.items_summary(&query).await
    }
    .await;
    respond(Endpoint::ItemsSummary, result)
}

/// `GET /items/:itemName`
pub async fn item_detail<S: MarketStore, C: ResponseCache>(
    service: &EconomyService<S, C>,
    ctx: Context,
) -> Response {
    let result = async {
        let query = ItemQuery::from_context(&ctx, service.settings())?;
        service.item_detail(&query).await
    }
    .await;
    respond(Endpoint::ItemDetail, result)
}

/// `GET /listings/:itemName`
pub async fn listings<S: MarketStore, C: ResponseCache>(
    service: &EconomyService<S, C>,
    ctx: Context,
) -> Response {
    let result = async {
        let query = ListingsQuery::from_context(&ctx, service.settings())?;
        service.listings(&query).await
    }
    .await;
    respond(Endpoint::Listings, result)
}

/// `GET /listings-count`
pub async fn listings_count<S: MarketStore, C: ResponseCache>(
    service: &EconomyService<S, C>,
    ctx: Context,
) -> Response {
    let result = async {
        let season = params::season(&ctx, service.settings())?;
        service.listings_count(season).await
    }
    .await;
    respond(Endpoint::ListingsCount, result)
}
