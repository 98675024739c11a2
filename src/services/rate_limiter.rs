use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::{sleep, Duration, Instant};
use parking_lot::Mutex;

/// Spaces out requests to the market data API.
///
/// The CoinGecko demo tier allows roughly 30 calls per minute; a basket
/// recompute fans out one call per coin plus the benchmark.
pub struct RateLimiter {
    /// Bounds concurrent requests
    semaphore: Arc<Semaphore>,
    last_request: Arc<Mutex<Instant>>,
    min_delay: Duration,
}

impl RateLimiter {
    /// * `max_concurrent` - maximum requests in flight
    /// * `requests_per_minute` - sustained request rate
    pub fn new(max_concurrent: usize, requests_per_minute: u32) -> Self {
        let min_delay_ms = 60_000 / requests_per_minute.max(1) as u64;
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            last_request: Arc::new(Mutex::new(
                Instant::now()
                    .checked_sub(Duration::from_secs(60))
                    .unwrap_or_else(Instant::now),
            )),
            min_delay: Duration::from_millis(min_delay_ms),
        }
    }

    /// Wait for a concurrency slot and for the minimum spacing since the last
    /// request. The slot is released when the guard drops.
    pub async fn acquire(&self) -> RateLimitGuard {
        // The semaphore is never closed, so acquisition only fails after close()
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("rate limiter semaphore closed");

        // Reserve the next slot while holding the lock, sleep outside it
        let wait_time = {
            let mut last = self.last_request.lock();
            let now = Instant::now();
            let next_slot = (*last + self.min_delay).max(now);
            *last = next_slot;
            next_slot - now
        };

        if !wait_time.is_zero() {
            sleep(wait_time).await;
        }

        RateLimitGuard { _permit: permit }
    }

    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

/// Holds a rate limit permit until dropped
pub struct RateLimitGuard {
    _permit: tokio::sync::OwnedSemaphorePermit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant as StdInstant;

    #[tokio::test]
    async fn test_rate_limiter_enforces_delay() {
        // 60 per minute (1 per second)
        let limiter = RateLimiter::new(2, 60);

        let start = StdInstant::now();

        let guard1 = limiter.acquire().await;
        assert!(start.elapsed().as_millis() < 100, "First request should be immediate");
        drop(guard1);

        let _guard2 = limiter.acquire().await;
        assert!(start.elapsed().as_millis() >= 900, "Second request should wait ~1 second");
    }

    #[tokio::test]
    async fn test_concurrent_limit() {
        let limiter = Arc::new(RateLimiter::new(2, 600));

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move {
                    let _guard = limiter.acquire().await;
                    sleep(Duration::from_millis(50)).await;
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(limiter.available_permits(), 2);
    }
}
