//! Handler error taxonomy and its mapping to HTTP responses.

use thiserror::Error;
use tracing::{error, warn};

use crate::cache::CacheError;
use crate::database::StoreError;
use crate::{Response, StatusCode};

/// The four economy endpoints, used to pick the public failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    ItemsSummary,
    ItemDetail,
    Listings,
    ListingsCount,
}

impl Endpoint {
    pub fn name(self) -> &'static str {
        match self {
            Self::ItemsSummary => "items_summary",
            Self::ItemDetail => "item_detail",
            Self::Listings => "listings",
            Self::ListingsCount => "listings_count",
        }
    }

    /// Body message for a 500 on this endpoint. Never includes error details.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::ItemsSummary => "Failed to fetch items summary",
            Self::ItemDetail => "Failed to fetch item data",
            Self::Listings => "Failed to fetch listings",
            Self::ListingsCount => "Failed to fetch listings count",
        }
    }
}

/// Everything a handler can fail with.
///
/// Client errors display a message safe to return verbatim; the rest are
/// logged and replaced by [`Endpoint::failure_message`].
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Either date or ingestionDate query parameter is required")]
    MissingDateSelector,

    #[error("Invalid {name} parameter")]
    InvalidParameter { name: &'static str, value: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn invalid(name: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            value: value.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingDateSelector | Self::InvalidParameter { .. } => StatusCode::BadRequest,
            Self::Store(_) | Self::Cache(_) | Self::Encode(_) => StatusCode::InternalServerError,
        }
    }

    /// Logs the error and renders the `{"error":{"message":...}}` response.
    pub fn into_response(self, endpoint: Endpoint) -> Response {
        let status = self.status();
        if status.is_client_error() {
            match &self {
                Self::InvalidParameter { name, value } => {
                    warn!(endpoint = endpoint.name(), parameter = *name, value = %value, "rejected request");
                }
                other => warn!(endpoint = endpoint.name(), error = %other, "rejected request"),
            }
            Response::error(status, self.to_string())
        } else {
            error!(endpoint = endpoint.name(), error = %self, "request failed");
            Response::error(status, endpoint.failure_message())
        }
    }
}
