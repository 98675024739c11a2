use axum::Router;
use tower_http::cors::CorsLayer;

use crate::routes::{analytics, basket, coins, health};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/coins", coins::router())
        .nest("/api/basket", basket::router())
        .nest("/api/analytics", analytics::router())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
