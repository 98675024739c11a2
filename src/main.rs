use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;

use coinbasket::app;
use coinbasket::config::{AppConfig, ProviderKind};
use coinbasket::external::coingecko::CoinGeckoProvider;
use coinbasket::external::mock::MockProvider;
use coinbasket::external::price_provider::PriceProvider;
use coinbasket::logging::{init_logging, LoggingConfig};
use coinbasket::services::rate_limiter::RateLimiter;
use coinbasket::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("failed to read configuration")?;

    // Initialize logging before anything else logs
    init_logging(LoggingConfig::from_env(&config)?).context("failed to initialize logging")?;

    let provider: Arc<dyn PriceProvider> = match config.provider {
        ProviderKind::CoinGecko => {
            tracing::info!("📊 Using price provider: CoinGecko ({})", config.coingecko_base_url);
            let limiter = Arc::new(RateLimiter::new(
                config.max_concurrent_fetches,
                config.rate_limit_per_minute,
            ));
            Arc::new(CoinGeckoProvider::new(
                config.coingecko_base_url.clone(),
                config.coingecko_api_key.clone(),
                limiter,
                config.fetch_timeout,
            ))
        }
        ProviderKind::Mock => {
            tracing::info!("📊 Using price provider: offline mock");
            Arc::new(MockProvider::new())
        }
    };

    let addr = config.bind_addr;
    tracing::info!(
        "Benchmark {}, lookback {} days, feed of {} coins",
        config.benchmark_asset,
        config.lookback_days,
        config.coin_feed_limit
    );

    let state = AppState::new(config, provider);
    state.failure_cache.spawn_cleanup(Duration::from_secs(60 * 60));
    let app = app::create_app(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("🚀 Coinbasket backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
