use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::{BasketEntry, BasketView, CoinCard, Holding, SetAmountRequest};
use crate::services::{analytics_service, summary_service};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_basket).post(add_to_basket))
        .route("/:asset_id", delete(remove_from_basket))
        .route("/:asset_id/amount", put(set_amount))
}

/// Kick off a fresh analytics run for the basket as it is now.
fn recompute(state: &AppState, revision: u64, holdings: Vec<Holding>) {
    analytics_service::schedule_recompute(
        state.price_provider.clone(),
        state.failure_cache.clone(),
        state.analytics.clone(),
        state.analytics_params.clone(),
        state.config.benchmark_asset.clone(),
        revision,
        holdings,
    );
}

/// GET /api/basket
pub async fn get_basket(State(state): State<AppState>) -> Json<BasketView> {
    let latest = state.analytics.latest();
    let basket = state.basket.read();

    // only use analytics computed for the basket as it stands
    let current = latest
        .as_ref()
        .filter(|p| p.revision == basket.revision())
        .map(|p| &p.result);

    Json(BasketView {
        revision: basket.revision(),
        entries: basket.entries().to_vec(),
        summary: summary_service::summarize(basket.entries(), current),
    })
}

/// POST /api/basket
///
/// Drop a coin card into the basket. 201 when added, 200 when it was
/// already there.
pub async fn add_to_basket(
    State(state): State<AppState>,
    Json(card): Json<CoinCard>,
) -> Result<(StatusCode, Json<BasketEntry>), AppError> {
    info!("POST /api/basket - Adding {}", card.id);
    if card.id.trim().is_empty() {
        return Err(AppError::Validation("Card id must not be empty".to_string()));
    }

    let (added, entry, revision, holdings) = {
        let mut basket = state.basket.write();
        let id = card.id.clone();
        let added = basket.add(card);
        let entry = basket
            .entries()
            .iter()
            .find(|e| e.card.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("{} is not in the basket", id)))?;
        (added, entry, basket.revision(), basket.holdings())
    };

    if added {
        recompute(&state, revision, holdings);
        Ok((StatusCode::CREATED, Json(entry)))
    } else {
        Ok((StatusCode::OK, Json(entry)))
    }
}

/// DELETE /api/basket/:asset_id
pub async fn remove_from_basket(
    Path(asset_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    info!("DELETE /api/basket/{} - Removing from basket", asset_id);

    let (removed, revision, holdings) = {
        let mut basket = state.basket.write();
        let removed = basket.remove(&asset_id);
        (removed, basket.revision(), basket.holdings())
    };

    if !removed {
        warn!("{} was not in the basket", asset_id);
        return Err(AppError::NotFound(format!("{} is not in the basket", asset_id)));
    }

    recompute(&state, revision, holdings);
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/basket/:asset_id/amount
pub async fn set_amount(
    Path(asset_id): Path<String>,
    State(state): State<AppState>,
    Json(req): Json<SetAmountRequest>,
) -> Result<Json<BasketEntry>, AppError> {
    info!("PUT /api/basket/{}/amount - amount={}", asset_id, req.amount);

    let (entry, revision, holdings) = {
        let mut basket = state.basket.write();
        let entry = basket.set_amount(&asset_id, req.amount)?.clone();
        (entry, basket.revision(), basket.holdings())
    };

    recompute(&state, revision, holdings);
    Ok(Json(entry))
}
