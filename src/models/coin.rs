use serde::{Deserialize, Serialize};

/// Listing entry returned by the market data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAsset {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub current_price: Option<f64>,
}

/// Stats shown on a draggable coin card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinCard {
    pub id: String,
    pub name: String,
    pub symbol: String,
    /// Annualized Sharpe over the whole lookback, two decimals
    pub sharpe: f64,
    /// Number of daily returns behind `sharpe`
    pub days: usize,
    pub last_price: f64,
}
