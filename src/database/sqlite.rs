//! SQLite-backed [`MarketStore`].
//!
//! One connection behind a mutex; every query runs on tokio's blocking pool
//! so handlers never stall a runtime worker on disk I/O. Listings are written
//! by an external ingester, so the connection waits on locks instead of
//! failing immediately.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{Days, NaiveDate};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, Row, params};
use tracing::{debug, info};

use super::{
    DailyPrice, ItemDetail, ItemSummary, Listing, MarketStore, NewListing, Season, StoreError,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS listings (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    season         INTEGER NOT NULL CHECK (season > 0),
    item_name      TEXT    NOT NULL,
    price          INTEGER NOT NULL,
    quantity       INTEGER NOT NULL DEFAULT 1,
    seller         TEXT,
    data_date      TEXT    NOT NULL,
    ingestion_date TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_listings_season_date
    ON listings(season, data_date);

CREATE INDEX IF NOT EXISTS idx_listings_item_data_date
    ON listings(item_name, season, data_date);

CREATE INDEX IF NOT EXISTS idx_listings_item_ingestion_date
    ON listings(item_name, season, ingestion_date);
"#;

const LISTING_COLUMNS: &str =
    "id, season, item_name, price, quantity, seller, data_date, ingestion_date";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

impl ToSql for Season {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(i64::from(self.get())))
    }
}

impl FromSql for Season {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = u32::column_result(value)?;
        Season::new(raw).ok_or(FromSqlError::OutOfRange(i64::from(raw)))
    }
}

/// SQLite listing store.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and applies the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Unavailable(format!("{}: {e}", parent.display())))?;
        }

        let conn = Connection::open(path)?;
        info!(path = %path.display(), "opened listing database");
        Self::from_connection(conn)
    }

    /// A private in-memory database, used by tests and demos.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Inserts listings in a single transaction and returns how many were written.
    pub async fn insert_listings(&self, listings: Vec<NewListing>) -> Result<usize, StoreError> {
        self.with_conn(move |conn| {
            let tx = conn.unchecked_transaction()?;
            {
                let mut stmt = tx.prepare_cached(
                    "INSERT INTO listings
                        (season, item_name, price, quantity, seller, data_date, ingestion_date)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )?;
                for l in &listings {
                    stmt.execute(params![
                        l.season,
                        l.item_name,
                        l.price,
                        l.quantity,
                        l.seller,
                        l.data_date,
                        l.ingestion_date,
                    ])?;
                }
            }
            tx.commit()?;
            Ok(listings.len())
        })
        .await
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&conn)
        })
        .await?
    }

    async fn listings_on(
        &self,
        column: DateColumn,
        item_name: &str,
        date: NaiveDate,
        season: Season,
    ) -> Result<Vec<Listing>, StoreError> {
        let item_name = item_name.to_owned();
        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT {LISTING_COLUMNS} FROM listings
                 WHERE item_name = ?1 AND season = ?2 AND {} = ?3
                 ORDER BY price ASC, id ASC",
                column.as_str()
            );
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows = stmt.query_map(params![item_name, season, date], listing_from_row)?;
            let listings = rows.collect::<Result<Vec<_>, _>>()?;
            debug!(item = %item_name, %date, column = column.as_str(), count = listings.len(), "listings query");
            Ok(listings)
        })
        .await
    }
}

#[derive(Debug, Clone, Copy)]
enum DateColumn {
    Data,
    Ingestion,
}

impl DateColumn {
    fn as_str(self) -> &'static str {
        match self {
            Self::Data => "data_date",
            Self::Ingestion => "ingestion_date",
        }
    }
}

fn listing_from_row(row: &Row<'_>) -> rusqlite::Result<Listing> {
    Ok(Listing {
        id: row.get(0)?,
        season: row.get(1)?,
        item_name: row.get(2)?,
        price: row.get(3)?,
        quantity: row.get(4)?,
        seller: row.get(5)?,
        data_date: row.get(6)?,
        ingestion_date: row.get(7)?,
    })
}

impl MarketStore for SqliteStore {
    async fn item_summaries(&self, season: Season, days: u32) -> Result<Vec<ItemSummary>, StoreError> {
        self.with_conn(move |conn| {
            let latest: Option<NaiveDate> = conn.query_row(
                "SELECT MAX(data_date) FROM listings WHERE season = ?1",
                params![season],
                |row| row.get(0),
            )?;
            let Some(latest) = latest else {
                return Ok(Vec::new());
            };
            let window_start = latest
                .checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
                .unwrap_or(NaiveDate::MIN);

            let mut stmt = conn.prepare_cached(
                "SELECT item_name, COUNT(*), COALESCE(SUM(quantity), 0),
                        MIN(price), MAX(price), AVG(price), MIN(data_date), MAX(data_date)
                 FROM listings
                 WHERE season = ?1 AND data_date BETWEEN ?2 AND ?3
                 GROUP BY item_name
                 ORDER BY item_name",
            )?;
            let rows = stmt.query_map(params![season, window_start, latest], |row| {
                Ok(ItemSummary {
                    item_name: row.get(0)?,
                    listings: row.get(1)?,
                    total_quantity: row.get(2)?,
                    min_price: row.get(3)?,
                    max_price: row.get(4)?,
                    avg_price: row.get(5)?,
                    first_seen: row.get(6)?,
                    last_seen: row.get(7)?,
                })
            })?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await
    }

    async fn total_listings(&self, season: Season) -> Result<u64, StoreError> {
        self.with_conn(move |conn| {
            let total = conn.query_row(
                "SELECT COUNT(*) FROM listings WHERE season = ?1",
                params![season],
                |row| row.get(0),
            )?;
            Ok(total)
        })
        .await
    }

    async fn listings_by_date(
        &self,
        item_name: &str,
        date: NaiveDate,
        season: Season,
    ) -> Result<Vec<Listing>, StoreError> {
        self.listings_on(DateColumn::Data, item_name, date, season).await
    }

    async fn listings_by_ingestion_date(
        &self,
        item_name: &str,
        date: NaiveDate,
        season: Season,
    ) -> Result<Vec<Listing>, StoreError> {
        self.listings_on(DateColumn::Ingestion, item_name, date, season).await
    }

    async fn item_detail(
        &self,
        item_name: &str,
        season: Season,
        limit: Option<u32>,
    ) -> Result<ItemDetail, StoreError> {
        let item_name = item_name.to_owned();
        self.with_conn(move |conn| {
            let (total_listings, total_quantity, min_price, max_price, avg_price) = conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(quantity), 0), MIN(price), MAX(price), AVG(price)
                 FROM listings
                 WHERE season = ?1 AND item_name = ?2",
                params![season, item_name],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )?;

            // SQLite treats a negative LIMIT as "no limit".
            let limit = limit.map_or(-1, i64::from);
            let mut stmt = conn.prepare_cached(
                "SELECT data_date, COUNT(*), COALESCE(SUM(quantity), 0),
                        MIN(price), MAX(price), AVG(price)
                 FROM listings
                 WHERE season = ?1 AND item_name = ?2
                 GROUP BY data_date
                 ORDER BY data_date DESC
                 LIMIT ?3",
            )?;
            let history = stmt
                .query_map(params![season, item_name, limit], |row| {
                    Ok(DailyPrice {
                        date: row.get(0)?,
                        listings: row.get(1)?,
                        quantity: row.get(2)?,
                        min_price: row.get(3)?,
                        max_price: row.get(4)?,
                        avg_price: row.get(5)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(ItemDetail {
                item_name,
                season,
                total_listings,
                total_quantity,
                min_price,
                max_price,
                avg_price,
                history,
            })
        })
        .await
    }
}
