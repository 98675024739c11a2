use futures::future::join_all;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::external::price_provider::PriceProvider;
use crate::models::{CoinCard, MarketAsset, PriceSeries};
use crate::services::failure_cache::FailureCache;
use crate::services::history_fetcher::{fetch_history, FetchPolicy};
use crate::services::sharpe::{series_sharpe, SharpeParams};

/// Card stats for one coin from its full lookback history.
pub fn build_card(asset: &MarketAsset, history: &PriceSeries, params: &SharpeParams) -> Option<CoinCard> {
    let prices = history.prices();
    let last_price = *prices.last()?;

    let sharpe = match series_sharpe(&prices, params) {
        Ok(s) => s,
        Err(e) => {
            warn!("Skipping Sharpe for {}: {}", asset.id, e);
            return None;
        }
    };

    Some(CoinCard {
        id: asset.id.clone(),
        name: asset.name.clone(),
        symbol: asset.symbol.clone(),
        sharpe,
        days: prices.len() - 1,
        last_price,
    })
}

/// The coin feed: top `limit` assets with their card stats.
///
/// Histories are fetched concurrently. Coins whose history cannot be loaded
/// are left out of the feed.
pub async fn load_feed(
    provider: &dyn PriceProvider,
    failure_cache: &FailureCache,
    limit: usize,
    lookback_days: u32,
    fetch_policy: &FetchPolicy,
    sharpe_params: &SharpeParams,
) -> Result<Vec<CoinCard>, AppError> {
    let assets = provider.list_top_assets(limit).await?;
    info!("🪙 Loading feed for {} assets", assets.len());

    let histories = join_all(
        assets
            .iter()
            .map(|a| fetch_history(provider, failure_cache, &a.id, lookback_days, fetch_policy)),
    )
    .await;

    let cards: Vec<CoinCard> = assets
        .iter()
        .zip(histories)
        .filter_map(|(asset, history)| match history {
            Ok(series) => build_card(asset, &series, sharpe_params),
            Err(e) => {
                warn!("Dropping {} from the feed: {}", asset.id, e);
                None
            }
        })
        .collect();

    info!("🪙 Feed ready with {} of {} coins", cards.len(), assets.len());
    Ok(cards)
}
