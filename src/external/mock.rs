use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::models::{MarketAsset, PriceSeries};

const UNIVERSE: &[(&str, &str, &str, f64)] = &[
    ("bitcoin", "btc", "Bitcoin", 60_000.0),
    ("ethereum", "eth", "Ethereum", 3_000.0),
    ("tether", "usdt", "Tether", 1.0),
    ("binancecoin", "bnb", "BNB", 550.0),
    ("solana", "sol", "Solana", 150.0),
    ("ripple", "xrp", "XRP", 0.55),
    ("cardano", "ada", "Cardano", 0.45),
    ("dogecoin", "doge", "Dogecoin", 0.12),
    ("tron", "trx", "TRON", 0.12),
    ("polkadot", "dot", "Polkadot", 6.5),
];

/// Offline provider producing a seeded random walk per asset id.
///
/// The same id always gets the same path relative to `end`, so repeated
/// requests are stable.
pub struct MockProvider {
    end: NaiveDate,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            end: Utc::now().date_naive(),
        }
    }

    pub fn ending_on(end: NaiveDate) -> Self {
        Self { end }
    }

    fn seed(asset_id: &str) -> u64 {
        // FNV-1a
        asset_id
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325, |h, b| (h ^ b as u64).wrapping_mul(0x0100_0000_01b3))
    }

    fn start_price(asset_id: &str) -> f64 {
        UNIVERSE
            .iter()
            .find(|(id, ..)| *id == asset_id)
            .map(|(.., price)| *price)
            .unwrap_or(100.0)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceProvider for MockProvider {
    async fn fetch_daily_history(
        &self,
        asset_id: &str,
        days: u32,
    ) -> Result<PriceSeries, PriceProviderError> {
        let mut rng = StdRng::seed_from_u64(Self::seed(asset_id));
        let start = self.end - Duration::days(days as i64);
        let mut current = Self::start_price(asset_id);

        let prices: Vec<f64> = (0..=days)
            .map(|_| {
                let price = current;
                current *= 1.0 + (rng.random::<f64>() - 0.48) * 0.06;
                price
            })
            .collect();

        Ok(PriceSeries::from_prices(asset_id, start, &prices))
    }

    async fn list_top_assets(&self, limit: usize) -> Result<Vec<MarketAsset>, PriceProviderError> {
        Ok(UNIVERSE
            .iter()
            .take(limit)
            .map(|(id, symbol, name, price)| MarketAsset {
                id: id.to_string(),
                symbol: symbol.to_string(),
                name: name.to_string(),
                current_price: Some(*price),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_history_is_deterministic_and_daily() {
        let end = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let provider = MockProvider::ending_on(end);

        let a = provider.fetch_daily_history("bitcoin", 30).await.unwrap();
        let b = provider.fetch_daily_history("bitcoin", 30).await.unwrap();

        assert_eq!(a, b);
        assert_eq!(a.len(), 31);
        assert_eq!(a.points.last().unwrap().date, end);
        assert!(a.points.iter().all(|p| p.price > 0.0));
    }

    #[tokio::test]
    async fn test_listing_respects_limit() {
        let provider = MockProvider::new();
        let assets = provider.list_top_assets(3).await.unwrap();
        assert_eq!(assets.len(), 3);
        assert_eq!(assets[0].id, "bitcoin");
    }
}
