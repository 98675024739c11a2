use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::CoinCard;
use crate::services::coin_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_coin_feed))
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    /// Number of coins (default: COIN_FEED_LIMIT)
    pub limit: Option<usize>,
}

/// GET /api/coins
///
/// Top coins by market cap with their whole-period Sharpe, last price and
/// number of days behind the figures.
pub async fn get_coin_feed(
    Query(params): Query<FeedQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<CoinCard>>, AppError> {
    let limit = params.limit.unwrap_or(state.config.coin_feed_limit).clamp(1, 100);
    info!("GET /api/coins - Loading coin feed (limit={})", limit);

    let cards = coin_service::load_feed(
        state.price_provider.as_ref(),
        &state.failure_cache,
        limit,
        state.analytics_params.lookback_days,
        &state.analytics_params.fetch,
        &state.analytics_params.sharpe,
    )
    .await
    .map_err(|e| {
        error!("Failed to load coin feed: {}", e);
        e
    })?;

    Ok(Json(cards))
}
