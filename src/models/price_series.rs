use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Closing price of an asset on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// Daily price history for one asset, oldest first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    pub asset_id: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(asset_id: impl Into<String>, points: Vec<PricePoint>) -> Self {
        Self {
            asset_id: asset_id.into(),
            points,
        }
    }

    /// Build a series from consecutive days starting at `start`.
    pub fn from_prices(asset_id: impl Into<String>, start: NaiveDate, prices: &[f64]) -> Self {
        let points = prices
            .iter()
            .zip(start.iter_days())
            .map(|(&price, date)| PricePoint { date, price })
            .collect();
        Self::new(asset_id, points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn last_price(&self) -> Option<f64> {
        self.points.last().map(|p| p.price)
    }

    /// The most recent `n` points (the whole series when it is shorter).
    pub fn tail(&self, n: usize) -> &[PricePoint] {
        let skip = self.points.len().saturating_sub(n);
        &self.points[skip..]
    }
}
