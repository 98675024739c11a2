//! Crypto basket analytics backend.
//!
//! Turns daily price histories for a basket of coins into a portfolio index,
//! a rolling 30-day Sharpe series and the same pair for a benchmark coin, ready
//! to be charted side by side.

pub mod app;
pub mod config;
pub mod errors;
pub mod external;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
