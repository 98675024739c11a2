use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{AnalyticsResult, AnalyticsStatus, Holding};
use crate::services::analytics_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_analytics))
        .route("/compute", post(compute_analytics))
}

#[derive(Debug, Deserialize)]
pub struct ComputeRequest {
    pub holdings: Vec<Holding>,
    /// Defaults to BENCHMARK_ASSET
    pub benchmark_id: Option<String>,
}

/// GET /api/analytics
///
/// Latest analytics for the shared basket: 200 when ready, 202 while the
/// newest run is in flight, 503 when it failed or nothing was requested yet.
pub async fn get_analytics(State(state): State<AppState>) -> (StatusCode, Json<AnalyticsStatus>) {
    let status = state.analytics.status();
    let code = match &status {
        AnalyticsStatus::Ready(_) => StatusCode::OK,
        AnalyticsStatus::Pending { .. } => StatusCode::ACCEPTED,
        AnalyticsStatus::Unavailable { .. } | AnalyticsStatus::Idle => StatusCode::SERVICE_UNAVAILABLE,
    };
    (code, Json(status))
}

/// POST /api/analytics/compute
///
/// Run the analytics for an explicit basket and wait for the result.
///
/// Example body: `{"holdings": [{"asset_id": "ethereum", "amount": 2.5}], "benchmark_id": "bitcoin"}`
pub async fn compute_analytics(
    State(state): State<AppState>,
    Json(req): Json<ComputeRequest>,
) -> Result<Json<AnalyticsResult>, AppError> {
    if let Some(bad) = req.holdings.iter().find(|h| !h.amount.is_finite() || h.amount < 0.0) {
        return Err(AppError::Validation(format!(
            "Amount for {} must be a non-negative number",
            bad.asset_id
        )));
    }

    let benchmark_id = req
        .benchmark_id
        .unwrap_or_else(|| state.config.benchmark_asset.clone());
    info!(
        "POST /api/analytics/compute - {} holdings vs {}",
        req.holdings.len(),
        benchmark_id
    );

    let result = analytics_service::run_analytics(
        state.price_provider.as_ref(),
        &state.failure_cache,
        &req.holdings,
        &benchmark_id,
        &state.analytics_params,
    )
    .await
    .map_err(|e| {
        error!("Analytics computation failed: {}", e);
        AppError::Compute(e)
    })?;

    Ok(Json(result))
}
