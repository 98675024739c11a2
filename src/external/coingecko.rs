use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::models::{MarketAsset, PricePoint, PriceSeries};
use crate::services::rate_limiter::RateLimiter;

/// CoinGecko v3 market data, quoted in USD.
///
/// Works keyless on the public tier; a demo key raises the quota.
pub struct CoinGeckoProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    rate_limiter: Arc<RateLimiter>,
    /// Deadline for one HTTP exchange, started once a rate limit slot is held
    request_timeout: Duration,
}

fn transport_error(e: reqwest::Error) -> PriceProviderError {
    if e.is_timeout() {
        PriceProviderError::Timeout
    } else {
        PriceProviderError::Network(e.to_string())
    }
}

fn body_error(e: reqwest::Error) -> PriceProviderError {
    if e.is_timeout() {
        PriceProviderError::Timeout
    } else {
        PriceProviderError::Parse(e.to_string())
    }
}

impl CoinGeckoProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        rate_limiter: Arc<RateLimiter>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("coinbasket/0.1")
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            rate_limiter,
            request_timeout,
        }
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<reqwest::Response, PriceProviderError> {
        let _guard = self.rate_limiter.acquire().await;

        let mut request = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header("accept", "application/json")
            .timeout(self.request_timeout)
            .query(query);
        if let Some(key) = &self.api_key {
            request = request.header("x-cg-demo-api-key", key);
        }

        let resp = request.send().await.map_err(transport_error)?;

        match resp.status() {
            s if s.is_success() => Ok(resp),
            StatusCode::TOO_MANY_REQUESTS => Err(PriceProviderError::RateLimited),
            StatusCode::NOT_FOUND => Err(PriceProviderError::NotFound(path.to_string())),
            s => Err(PriceProviderError::BadResponse(format!("HTTP {}", s))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    /// `[unix_ms, price]` pairs
    prices: Vec<(f64, f64)>,
}

#[derive(Debug, Deserialize)]
struct CoinGeckoMarket {
    id: String,
    symbol: String,
    name: String,
    current_price: Option<f64>,
}

/// Convert market_chart pairs to one point per UTC day, oldest first.
///
/// CoinGecko appends a live point for "now" after the daily closes; when two
/// points land on the same day the later one wins.
fn points_from_market_chart(raw: &[(f64, f64)]) -> Result<Vec<PricePoint>, PriceProviderError> {
    let mut points: Vec<PricePoint> = Vec::with_capacity(raw.len());

    for &(timestamp_ms, price) in raw {
        if !price.is_finite() {
            return Err(PriceProviderError::Parse(format!("non-finite price at {}", timestamp_ms)));
        }
        let date: NaiveDate = DateTime::from_timestamp_millis(timestamp_ms as i64)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| PriceProviderError::Parse(format!("bad timestamp {}", timestamp_ms)))?;

        match points.last_mut() {
            Some(last) if last.date == date => last.price = price,
            Some(last) if last.date > date => {
                return Err(PriceProviderError::Parse("timestamps are not ascending".into()));
            }
            _ => points.push(PricePoint::new(date, price)),
        }
    }

    Ok(points)
}

#[async_trait]
impl PriceProvider for CoinGeckoProvider {
    async fn fetch_daily_history(
        &self,
        asset_id: &str,
        days: u32,
    ) -> Result<PriceSeries, PriceProviderError> {
        let path = format!("/coins/{}/market_chart", asset_id);
        let resp = self
            .get(
                &path,
                &[
                    ("vs_currency", "usd".to_string()),
                    ("days", days.to_string()),
                    ("interval", "daily".to_string()),
                    ("precision", "2".to_string()),
                ],
            )
            .await
            .map_err(|e| match e {
                PriceProviderError::NotFound(_) => PriceProviderError::NotFound(asset_id.to_string()),
                other => other,
            })?;

        let body: MarketChartResponse = resp
            .json()
            .await
            .map_err(body_error)?;

        let points = points_from_market_chart(&body.prices)?;
        if points.is_empty() {
            return Err(PriceProviderError::EmptySeries(asset_id.to_string()));
        }

        Ok(PriceSeries::new(asset_id, points))
    }

    async fn list_top_assets(&self, limit: usize) -> Result<Vec<MarketAsset>, PriceProviderError> {
        let resp = self
            .get(
                "/coins/markets",
                &[
                    ("vs_currency", "usd".to_string()),
                    ("order", "market_cap_desc".to_string()),
                    ("per_page", limit.clamp(1, 250).to_string()),
                    ("page", "1".to_string()),
                ],
            )
            .await?;

        let markets: Vec<CoinGeckoMarket> = resp
            .json()
            .await
            .map_err(body_error)?;

        Ok(markets
            .into_iter()
            .take(limit)
            .map(|m| MarketAsset {
                id: m.id,
                symbol: m.symbol,
                name: m.name,
                current_price: m.current_price,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: f64 = 86_400_000.0;

    #[tokio::test]
    async fn test_stalled_server_times_out() {
        // accepts connections and never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let provider = CoinGeckoProvider::new(
            format!("http://{}", addr),
            None,
            Arc::new(RateLimiter::new(1, 600)),
            Duration::from_millis(200),
        );

        let err = provider.fetch_daily_history("bitcoin", 30).await.unwrap_err();
        assert!(matches!(err, PriceProviderError::Timeout));
    }

    #[test]
    fn test_parses_market_chart_payload() {
        let json = r#"{
            "prices": [[1704067200000, 42280.23], [1704153600000, 44187.14]],
            "market_caps": [],
            "total_volumes": []
        }"#;
        let body: MarketChartResponse = serde_json::from_str(json).unwrap();
        let points = points_from_market_chart(&body.prices).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(points[1].price, 44187.14);
    }

    #[test]
    fn test_live_point_replaces_same_day_close() {
        let start = 1_704_067_200_000.0;
        let raw = [(start, 1.0), (start + DAY_MS, 2.0), (start + DAY_MS + 3_600_000.0, 2.5)];
        let points = points_from_market_chart(&raw).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[1].price, 2.5);
    }

    #[test]
    fn test_rejects_descending_timestamps() {
        let start = 1_704_067_200_000.0;
        let raw = [(start + DAY_MS, 1.0), (start, 2.0)];
        assert!(matches!(points_from_market_chart(&raw), Err(PriceProviderError::Parse(_))));
    }

    #[test]
    fn test_parses_markets_listing() {
        let json = r#"[{"id":"bitcoin","symbol":"btc","name":"Bitcoin","current_price":67000.5,"market_cap":1}]"#;
        let markets: Vec<CoinGeckoMarket> = serde_json::from_str(json).unwrap();
        assert_eq!(markets[0].id, "bitcoin");
        assert_eq!(markets[0].current_price, Some(67000.5));
    }
}
