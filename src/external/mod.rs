pub mod coingecko;
pub mod mock;
pub mod price_provider;
