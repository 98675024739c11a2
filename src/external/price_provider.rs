use async_trait::async_trait;
use thiserror::Error;

use crate::models::{MarketAsset, PriceSeries};

#[derive(Debug, Error)]
pub enum PriceProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate limited")]
    RateLimited,

    #[error("asset not found: {0}")]
    NotFound(String),

    #[error("request timed out")]
    Timeout,

    #[error("empty price history for {0}")]
    EmptySeries(String),
}

impl PriceProviderError {
    /// Errors worth a second attempt. A missing asset or a payload we cannot
    /// read will not get better by asking again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PriceProviderError::Network(_) | PriceProviderError::Timeout | PriceProviderError::RateLimited
        )
    }
}

/// Source of daily price history.
///
/// Implementations return one point per calendar day in ascending date order,
/// quoted in a single currency.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn fetch_daily_history(
        &self,
        asset_id: &str,
        days: u32,
    ) -> Result<PriceSeries, PriceProviderError>;

    /// Most valuable assets first.
    async fn list_top_assets(&self, limit: usize) -> Result<Vec<MarketAsset>, PriceProviderError>;
}
