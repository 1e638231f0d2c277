use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use economy_api::Server;
use economy_api::cache::{MemoryCache, NoopCache, ResponseCache};
use economy_api::config::Config;
use economy_api::database::SqliteStore;
use economy_api::economy::{self, EconomyService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let store = SqliteStore::open(&config.database)?;

    if config.cache_enabled() {
        let cache = MemoryCache::new(config.cache_capacity, config.cache_ttl());
        info!(
            capacity = config.cache_capacity,
            ttl_secs = config.cache_ttl_secs,
            "response cache enabled"
        );
        run(config, store, cache).await
    } else {
        info!("response cache disabled");
        run(config, store, NoopCache).await
    }
}

async fn run<C: ResponseCache>(
    config: Config,
    store: SqliteStore,
    cache: C,
) -> Result<(), Box<dyn Error>> {
    let service = Arc::new(EconomyService::new(store, cache, config.settings()));
    let router = economy::router(service, &config.route_prefix);

    let server = Server::bind(config.bind.to_string()).await?;
    info!(
        address = %server.local_addr(),
        prefix = %config.route_prefix,
        season = %config.settings().current_season,
        "economy api ready"
    );

    server
        .serve(router, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    info!("server stopped");
    Ok(())
}
