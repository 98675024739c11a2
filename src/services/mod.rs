pub mod alignment;
pub mod analytics_publisher;
pub mod analytics_service;
pub mod basket_service;
pub mod benchmark;
pub mod coin_service;
pub mod failure_cache;
pub mod history_fetcher;
pub mod normalizer;
pub mod portfolio_value;
pub mod rate_limiter;
pub mod returns;
pub mod sharpe;
pub mod summary_service;
