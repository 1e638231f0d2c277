//! Request validation shared by every economy route.

use tracing::warn;

use super::ApiError;
use crate::context::Context;
use crate::database::Season;
use crate::middleware::{BoxResponse, Middleware, Next};
use crate::{Response, StatusCode};

/// Rejects a malformed `season` query value with 400 before any handler runs.
///
/// An absent or empty `season` passes; the handler substitutes the current
/// season.
pub struct SeasonValidation;

impl Middleware for SeasonValidation {
    fn handle(&self, ctx: Context, next: Next) -> BoxResponse {
        Box::pin(async move {
            let malformed = ctx
                .query("season")
                .filter(|s| !s.is_empty() && s.parse::<Season>().is_err());
            if let Some(raw) = malformed {
                warn!(season = raw, path = ctx.request().path(), "rejected malformed season");
                let err = ApiError::invalid("season", raw);
                return Response::error(StatusCode::BadRequest, err.to_string());
            }
            next.run(ctx).await
        })
    }
}
