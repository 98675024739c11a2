use std::sync::Arc;
use chrono::{DateTime, Utc, Duration};
use dashmap::DashMap;
use tracing::debug;

use crate::external::price_provider::PriceProviderError;

/// Information about a failed history fetch for an asset
#[derive(Debug, Clone)]
pub struct FailureInfo {
    pub failed_at: DateTime<Utc>,
    pub error_type: FailureType,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FailureType {
    NotFound,       // Asset id unknown to the provider
    BadData,        // Empty or unreadable history
}

impl FailureType {
    /// Outcomes that will not change on the next request. Timeouts, network
    /// errors and rate limits are transient and never cached.
    pub fn from_error(error: &PriceProviderError) -> Option<Self> {
        match error {
            PriceProviderError::NotFound(_) => Some(FailureType::NotFound),
            PriceProviderError::EmptySeries(_) | PriceProviderError::Parse(_) => Some(FailureType::BadData),
            PriceProviderError::Network(_)
            | PriceProviderError::Timeout
            | PriceProviderError::RateLimited
            | PriceProviderError::BadResponse(_) => None,
        }
    }

    fn ttl_hours(self) -> i64 {
        match self {
            FailureType::NotFound => 24,
            FailureType::BadData => 1,
        }
    }
}

/// Thread-safe cache of assets whose history fetch failed recently.
///
/// A basket holding a dead asset id fails fast instead of hitting the provider
/// on every recompute.
#[derive(Clone, Default)]
pub struct FailureCache {
    cache: Arc<DashMap<String, FailureInfo>>,
}

impl FailureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded failure for `asset_id`, if it has not expired yet
    pub fn is_failed(&self, asset_id: &str) -> Option<FailureInfo> {
        if let Some(entry) = self.cache.get(asset_id) {
            let info = entry.value().clone();
            let expiry = info.failed_at + Duration::hours(info.ttl_hours);

            if Utc::now() < expiry {
                return Some(info);
            }
            drop(entry); // release the read lock before removing
            self.cache.remove(asset_id);
        }
        None
    }

    pub fn record_failure(&self, asset_id: &str, error_type: FailureType) {
        let info = FailureInfo {
            failed_at: Utc::now(),
            error_type,
            ttl_hours: error_type.ttl_hours(),
        };

        self.cache.insert(asset_id.to_string(), info);
    }

    /// Clear an asset after a successful fetch
    pub fn clear(&self, asset_id: &str) {
        self.cache.remove(asset_id);
    }

    pub fn cleanup_expired(&self) {
        let now = Utc::now();
        self.cache.retain(|_, info| {
            let expiry = info.failed_at + Duration::hours(info.ttl_hours);
            now < expiry
        });
    }

    /// Sweep expired entries every `every` until the runtime shuts down.
    /// Entries for ids that are never requested again would otherwise stay.
    pub fn spawn_cleanup(&self, every: std::time::Duration) -> tokio::task::JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let before = cache.len();
                cache.cleanup_expired();
                let removed = before.saturating_sub(cache.len());
                if removed > 0 {
                    debug!("Dropped {} expired fetch failures", removed);
                }
            }
        })
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
