//! Query parameter parsing for the economy endpoints.
//!
//! An empty value (`?days=`) counts as absent.

use chrono::NaiveDate;

use super::{ApiError, EconomySettings};
use crate::context::Context;
use crate::database::Season;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn present<'a>(ctx: &'a Context, name: &str) -> Option<&'a str> {
    ctx.query(name).filter(|v| !v.is_empty())
}

/// `season`, or the configured current season.
pub fn season(ctx: &Context, settings: &EconomySettings) -> Result<Season, ApiError> {
    match present(ctx, "season") {
        Some(raw) => raw.parse().map_err(|_| ApiError::invalid("season", raw)),
        None => Ok(settings.current_season),
    }
}

/// An optional integer parameter that must be at least 1.
pub fn positive(ctx: &Context, name: &'static str) -> Result<Option<u32>, ApiError> {
    present(ctx, name)
        .map(|raw| {
            raw.parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ApiError::invalid(name, raw))
        })
        .transpose()
}

fn date(ctx: &Context, name: &'static str) -> Result<Option<NaiveDate>, ApiError> {
    present(ctx, name)
        .map(|raw| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| ApiError::invalid(name, raw))
        })
        .transpose()
}

/// Which date column a listings lookup filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSelector {
    /// `date`: when the market event happened.
    Data(NaiveDate),
    /// `ingestionDate`: when the record entered the system.
    Ingestion(NaiveDate),
}

impl DateSelector {
    /// `date` wins when both are given; the other one is ignored entirely.
    pub fn from_context(ctx: &Context) -> Result<Self, ApiError> {
        if let Some(d) = date(ctx, "date")? {
            return Ok(Self::Data(d));
        }
        match date(ctx, "ingestionDate")? {
            Some(d) => Ok(Self::Ingestion(d)),
            None => Err(ApiError::MissingDateSelector),
        }
    }
}

/// Parameters of `GET /items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemsQuery {
    pub season: Season,
    pub days: u32,
}

impl ItemsQuery {
    pub fn from_context(ctx: &Context, settings: &EconomySettings) -> Result<Self, ApiError> {
        Ok(Self {
            season: season(ctx, settings)?,
            days: positive(ctx, "days")?.unwrap_or(settings.default_days),
        })
    }
}

/// Parameters of `GET /items/:itemName`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQuery {
    pub item_name: String,
    pub season: Season,
    pub limit: Option<u32>,
}

impl ItemQuery {
    pub fn from_context(ctx: &Context, settings: &EconomySettings) -> Result<Self, ApiError> {
        Ok(Self {
            item_name: item_name(ctx)?,
            season: season(ctx, settings)?,
            limit: positive(ctx, "limit")?,
        })
    }
}

/// Parameters of `GET /listings/:itemName`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingsQuery {
    pub item_name: String,
    pub season: Season,
    pub selector: DateSelector,
}

impl ListingsQuery {
    /// The date selector is checked first, so a request with no date gets
    /// the dedicated 400 even when other parameters are also off.
    pub fn from_context(ctx: &Context, settings: &EconomySettings) -> Result<Self, ApiError> {
        let selector = DateSelector::from_context(ctx)?;
        Ok(Self {
            item_name: item_name(ctx)?,
            season: season(ctx, settings)?,
            selector,
        })
    }
}

fn item_name(ctx: &Context) -> Result<String, ApiError> {
    ctx.params()
        .get("itemName")
        .filter(|name| !name.trim().is_empty())
        .map(str::to_owned)
        .ok_or_else(|| ApiError::invalid("itemName", ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Request;
    use crate::context::PathParams;

    fn settings() -> EconomySettings {
        EconomySettings {
            current_season: Season::new(5).unwrap(),
            default_days: 7,
        }
    }

    fn ctx(query: &str) -> Context {
        let raw = format!("GET /x?{query} HTTP/1.1\r\n\r\n");
        let (req, _) = Request::parse(raw.as_bytes()).unwrap();
        let mut params = PathParams::new();
        params.insert("itemName".into(), "Iron Ore".into());
        Context::with_params(req, params)
    }

    #[test]
    fn items_query_defaults() {
        let q = ItemsQuery::from_context(&ctx(""), &settings()).unwrap();
        assert_eq!(q.season.get(), 5);
        assert_eq!(q.days, 7);

        let q = ItemsQuery::from_context(&ctx("season=2&days=30"), &settings()).unwrap();
        assert_eq!((q.season.get(), q.days), (2, 30));

        let q = ItemsQuery::from_context(&ctx("season=&days="), &settings()).unwrap();
        assert_eq!((q.season.get(), q.days), (5, 7));
    }

    #[test]
    fn days_and_limit_must_be_positive_integers() {
        for bad in ["days=0", "days=-1", "days=abc", "days=1.5"] {
            let err = ItemsQuery::from_context(&ctx(bad), &settings()).unwrap_err();
            assert!(matches!(err, ApiError::InvalidParameter { name: "days", .. }), "{bad}");
        }
        let err = ItemQuery::from_context(&ctx("limit=0"), &settings()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidParameter { name: "limit", .. }));
    }

    #[test]
    fn item_query_limit_is_optional() {
        let q = ItemQuery::from_context(&ctx(""), &settings()).unwrap();
        assert_eq!(q.item_name, "Iron Ore");
        assert_eq!(q.limit, None);
        let q = ItemQuery::from_context(&ctx("limit=10"), &settings()).unwrap();
        assert_eq!(q.limit, Some(10));
    }

    #[test]
    fn date_selector_requires_one_of_two() {
        let err = DateSelector::from_context(&ctx("season=1")).unwrap_err();
        assert!(matches!(err, ApiError::MissingDateSelector));
        let err = DateSelector::from_context(&ctx("date=&ingestionDate=")).unwrap_err();
        assert!(matches!(err, ApiError::MissingDateSelector));
    }

    #[test]
    fn data_date_takes_precedence() {
        let sel = DateSelector::from_context(&ctx("date=2024-01-01&ingestionDate=2024-01-02")).unwrap();
        assert_eq!(sel, DateSelector::Data(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));

        let sel = DateSelector::from_context(&ctx("ingestionDate=2024-01-02")).unwrap();
        assert_eq!(sel, DateSelector::Ingestion(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()));
    }

    #[test]
    fn malformed_date_is_rejected() {
        let err = DateSelector::from_context(&ctx("date=01/02/2024")).unwrap_err();
        assert!(matches!(err, ApiError::InvalidParameter { name: "date", .. }));
    }
}
