use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

use crate::services::alignment::AlignmentPolicy;
use crate::services::analytics_service::AnalyticsParams;
use crate::services::history_fetcher::FetchPolicy;
use crate::services::sharpe::SharpeParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    CoinGecko,
    Mock,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::CoinGecko => "coingecko",
            ProviderKind::Mock => "mock",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "coingecko" => Ok(ProviderKind::CoinGecko),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(format!("must be 'coingecko' or 'mock', got '{}'", other)),
        }
    }
}

/// Service settings, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub provider: ProviderKind,
    pub coingecko_base_url: String,
    pub coingecko_api_key: Option<String>,
    pub benchmark_asset: String,
    pub lookback_days: u32,
    pub coin_feed_limit: usize,
    pub fetch_timeout: Duration,
    pub fetch_retries: u32,
    pub rate_limit_per_minute: u32,
    pub max_concurrent_fetches: usize,
    pub alignment_tolerance: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            provider: ProviderKind::CoinGecko,
            coingecko_base_url: "https://api.coingecko.com/api/v3".to_string(),
            coingecko_api_key: None,
            benchmark_asset: "bitcoin".to_string(),
            lookback_days: 365,
            coin_feed_limit: 10,
            fetch_timeout: Duration::from_secs(10),
            fetch_retries: 1,
            rate_limit_per_minute: 30,
            max_concurrent_fetches: 4,
            alignment_tolerance: None,
        }
    }
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("invalid value for {}: '{}'", key, raw)),
        _ => Ok(default),
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let alignment_tolerance = match env_opt("ALIGNMENT_TOLERANCE") {
            Some(raw) => Some(
                raw.trim()
                    .parse::<usize>()
                    .with_context(|| format!("invalid value for ALIGNMENT_TOLERANCE: '{}'", raw))?,
            ),
            None => None,
        };

        Ok(Self {
            bind_addr: env_or("BIND_ADDR", defaults.bind_addr)?,
            provider: env_or("PRICE_PROVIDER", defaults.provider)?,
            coingecko_base_url: env_or("COINGECKO_BASE_URL", defaults.coingecko_base_url)?,
            coingecko_api_key: env_opt("COINGECKO_API_KEY"),
            benchmark_asset: env_or("BENCHMARK_ASSET", defaults.benchmark_asset)?,
            lookback_days: env_or("LOOKBACK_DAYS", defaults.lookback_days)?,
            coin_feed_limit: env_or("COIN_FEED_LIMIT", defaults.coin_feed_limit)?,
            fetch_timeout: Duration::from_secs(env_or("FETCH_TIMEOUT_SECS", defaults.fetch_timeout.as_secs())?),
            fetch_retries: env_or("FETCH_RETRIES", defaults.fetch_retries)?,
            rate_limit_per_minute: env_or("RATE_LIMIT_PER_MINUTE", defaults.rate_limit_per_minute)?,
            max_concurrent_fetches: env_or("MAX_CONCURRENT_FETCHES", defaults.max_concurrent_fetches)?,
            alignment_tolerance,
        })
    }

    pub fn analytics_params(&self) -> AnalyticsParams {
        AnalyticsParams {
            lookback_days: self.lookback_days,
            sharpe: SharpeParams::default(),
            alignment: AlignmentPolicy {
                tolerance: self.alignment_tolerance,
            },
            fetch: FetchPolicy {
                retries: self.fetch_retries,
                ..FetchPolicy::default()
            },
        }
    }
}
