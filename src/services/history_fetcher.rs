use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::models::PriceSeries;
use crate::services::failure_cache::{FailureCache, FailureType};

/// Retry budget for a single history fetch.
///
/// Request deadlines belong to the provider's HTTP exchange, so time spent
/// waiting for a rate limit slot never counts against them.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchPolicy {
    pub retries: u32,
    pub retry_delay: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            retries: 1,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Fetch one asset's daily history with a bounded retry.
///
/// Assets known to be missing or to have no usable history are rejected from
/// the failure cache without calling the provider. Transient errors are
/// returned as is and the next request tries again.
pub async fn fetch_history(
    provider: &dyn PriceProvider,
    failure_cache: &FailureCache,
    asset_id: &str,
    days: u32,
    policy: &FetchPolicy,
) -> Result<PriceSeries, PriceProviderError> {
    if let Some(failure) = failure_cache.is_failed(asset_id) {
        info!(
            "⚠️ Skipping fetch for {} - failed {:?} at {}",
            asset_id, failure.error_type, failure.failed_at
        );
        return Err(match failure.error_type {
            FailureType::NotFound => PriceProviderError::NotFound(asset_id.to_string()),
            FailureType::BadData => PriceProviderError::EmptySeries(asset_id.to_string()),
        });
    }

    let mut attempt = 0;
    loop {
        let outcome = match provider.fetch_daily_history(asset_id, days).await {
            Ok(series) if series.is_empty() => Err(PriceProviderError::EmptySeries(asset_id.to_string())),
            other => other,
        };

        match outcome {
            Ok(series) => {
                failure_cache.clear(asset_id);
                info!("✓ Fetched {} daily prices for {}", series.len(), asset_id);
                return Ok(series);
            }
            Err(e) if e.is_retryable() && attempt < policy.retries => {
                attempt += 1;
                warn!(
                    "Fetch for {} failed ({}), retrying in {:?} (attempt {}/{})",
                    asset_id, e, policy.retry_delay, attempt, policy.retries
                );
                sleep(policy.retry_delay).await;
            }
            Err(e) => {
                if let Some(failure_type) = FailureType::from_error(&e) {
                    failure_cache.record_failure(asset_id, failure_type);
                }
                warn!("✗ Failed to fetch price history for {}: {}", asset_id, e);
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MarketAsset;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the first `failures` calls with `error`, then serves a short series.
    struct FlakyProvider {
        failures: usize,
        error: fn() -> PriceProviderError,
        calls: AtomicUsize,
    }

    impl FlakyProvider {
        fn new(failures: usize, error: fn() -> PriceProviderError) -> Self {
            Self { failures, error, calls: AtomicUsize::new(0) }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PriceProvider for FlakyProvider {
        async fn fetch_daily_history(&self, asset_id: &str, _days: u32) -> Result<PriceSeries, PriceProviderError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err((self.error)());
            }
            let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
            Ok(PriceSeries::from_prices(asset_id, start, &[1.0, 2.0]))
        }

        async fn list_top_assets(&self, _limit: usize) -> Result<Vec<MarketAsset>, PriceProviderError> {
            Ok(Vec::new())
        }
    }

    fn fast_policy() -> FetchPolicy {
        FetchPolicy {
            retries: 1,
            retry_delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_single_retry_recovers() {
        let provider = FlakyProvider::new(1, || PriceProviderError::Network("connection reset".into()));
        let cache = FailureCache::new();

        let series = fetch_history(&provider, &cache, "bitcoin", 30, &fast_policy()).await.unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(provider.calls(), 2);
        assert!(cache.is_failed("bitcoin").is_none());
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried_on_next_request() {
        let provider = FlakyProvider::new(2, || PriceProviderError::Timeout);
        let cache = FailureCache::new();

        let err = fetch_history(&provider, &cache, "bitcoin", 30, &fast_policy()).await.unwrap_err();
        assert!(matches!(err, PriceProviderError::Timeout));
        assert_eq!(provider.calls(), 2);
        assert!(cache.is_empty());

        // provider is healthy again, the next request goes through
        let series = fetch_history(&provider, &cache, "bitcoin", 30, &fast_policy()).await.unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_rate_limit_is_not_cached() {
        let provider = FlakyProvider::new(2, || PriceProviderError::RateLimited);
        let cache = FailureCache::new();

        assert!(fetch_history(&provider, &cache, "solana", 30, &fast_policy()).await.is_err());
        assert!(cache.is_failed("solana").is_none());
    }

    #[tokio::test]
    async fn test_unknown_asset_is_cached() {
        let provider = FlakyProvider::new(usize::MAX, || PriceProviderError::NotFound("nope".into()));
        let cache = FailureCache::new();

        let err = fetch_history(&provider, &cache, "nope", 30, &fast_policy()).await.unwrap_err();
        assert!(matches!(err, PriceProviderError::NotFound(_)));
        // not retryable
        assert_eq!(provider.calls(), 1);

        // second call is served from the failure cache
        let err = fetch_history(&provider, &cache, "nope", 30, &fast_policy()).await.unwrap_err();
        assert!(matches!(err, PriceProviderError::NotFound(_)));
        assert_eq!(provider.calls(), 1);
    }
}
