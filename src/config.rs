//! Command line and environment configuration for the binary.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::database::Season;
use crate::economy::EconomySettings;

/// Serve the economy API over HTTP.
#[derive(Debug, Clone, Parser)]
#[command(name = "economy-api", version, about)]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "ECONOMY_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// SQLite database holding the listings. Created if missing.
    #[arg(long, env = "ECONOMY_DATABASE", default_value = "economy.db")]
    pub database: PathBuf,

    /// Season used when a request does not name one.
    #[arg(
        long,
        env = "ECONOMY_CURRENT_SEASON",
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub current_season: u32,

    /// Path prefix shared by every endpoint.
    #[arg(long, env = "ECONOMY_ROUTE_PREFIX", default_value = "/api/economy")]
    pub route_prefix: String,

    /// Window used by `/items` when `days` is not given.
    #[arg(
        long,
        env = "ECONOMY_DEFAULT_DAYS",
        default_value_t = 7,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub default_days: u32,

    /// Maximum number of cached responses; 0 disables caching.
    #[arg(long, env = "ECONOMY_CACHE_CAPACITY", default_value_t = 10_000)]
    pub cache_capacity: u64,

    /// Seconds a cached response stays valid; 0 keeps entries until evicted.
    #[arg(long, env = "ECONOMY_CACHE_TTL_SECS", default_value_t = 300)]
    pub cache_ttl_secs: u64,

    /// Log filter directive, overridden by `RUST_LOG` when set.
    #[arg(long, env = "ECONOMY_LOG", default_value = "info")]
    pub log_filter: String,
}

impl Config {
    pub fn settings(&self) -> EconomySettings {
        EconomySettings {
            // The value parser already rejects 0.
            current_season: Season::new(self.current_season).unwrap_or(Season::FIRST),
            default_days: self.default_days,
        }
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache_capacity > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, clap::Error> {
        Config::try_parse_from(std::iter::once("economy-api").chain(args.iter().copied()))
    }

    #[test]
    fn defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.bind, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.route_prefix, "/api/economy");
        assert_eq!(config.settings().current_season.get(), 1);
        assert_eq!(config.settings().default_days, 7);
        assert_eq!(config.cache_ttl(), Some(Duration::from_secs(300)));
        assert!(config.cache_enabled());
    }

    #[test]
    fn zero_ttl_and_capacity() {
        let config = parse(&["--cache-ttl-secs", "0", "--cache-capacity", "0"]).unwrap();
        assert_eq!(config.cache_ttl(), None);
        assert!(!config.cache_enabled());
    }

    #[test]
    fn season_and_days_must_be_positive() {
        assert!(parse(&["--current-season", "0"]).is_err());
        assert!(parse(&["--default-days", "0"]).is_err());
        assert_eq!(parse(&["--current-season", "4"]).unwrap().settings().current_season.get(), 4);
    }
}
