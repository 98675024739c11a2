mod analytics;
mod basket;
mod coin;
mod holding;
mod price_series;
mod summary;

pub use analytics::{AnalyticsMeta, AnalyticsResult, AnalyticsStatus, PublishedAnalytics};
pub use basket::{BasketEntry, BasketView, SetAmountRequest};
pub use coin::{CoinCard, MarketAsset};
pub use holding::Holding;
pub use price_series::{PricePoint, PriceSeries};
pub use summary::{PortfolioSummary, SharpeBand};
