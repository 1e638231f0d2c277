//! # economy-api
//!
//! A read-only async HTTP API over seasonal market listings, with a
//! response cache in front of the expensive aggregate queries.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use economy_api::Server;
//! use economy_api::cache::MemoryCache;
//! use economy_api::database::{Season, SqliteStore};
//! use economy_api::economy::{self, EconomyService, EconomySettings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SqliteStore::open("economy.db")?;
//!     let cache = MemoryCache::new(10_000, None);
//!     let settings = EconomySettings {
//!         current_season: Season::new(1).ok_or("season must be positive")?,
//!         default_days: 7,
//!     };
//!
//!     let service = Arc::new(EconomyService::new(store, cache, settings));
//!     let router = economy::router(service, "/api/economy");
//!
//!     let server = Server::bind("127.0.0.1:8080").await?;
//!     server.serve(router, async { let _ = tokio::signal::ctrl_c().await; }).await?;
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod context;
pub mod database;
pub mod economy;
pub mod http;
pub mod middleware;
pub mod router;
pub mod server;

pub use http::{Headers, Method, Request, Response, StatusCode};
pub use router::Router;
pub use server::{Server, ServerError};
