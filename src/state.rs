use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::AppConfig;
use crate::external::price_provider::PriceProvider;
use crate::services::analytics_publisher::AnalyticsPublisher;
use crate::services::analytics_service::AnalyticsParams;
use crate::services::basket_service::Basket;
use crate::services::failure_cache::FailureCache;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub analytics_params: Arc<AnalyticsParams>,
    pub price_provider: Arc<dyn PriceProvider>,
    pub failure_cache: FailureCache,
    pub basket: Arc<RwLock<Basket>>,
    pub analytics: AnalyticsPublisher,
}

impl AppState {
    pub fn new(config: AppConfig, price_provider: Arc<dyn PriceProvider>) -> Self {
        let analytics_params = Arc::new(config.analytics_params());
        Self {
            config: Arc::new(config),
            analytics_params,
            price_provider,
            failure_cache: FailureCache::new(),
            basket: Arc::new(RwLock::new(Basket::new())),
            analytics: AnalyticsPublisher::new(),
        }
    }
}
