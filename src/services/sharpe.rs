//! Annualized Sharpe ratios over daily crypto returns.
//!
//! Crypto trades every day, so both the risk-free rate and the annualization
//! use a 365-day year.

use serde::{Deserialize, Serialize};

use crate::errors::DivisionError;
use crate::services::returns::daily_returns;

/// Standard deviations below this are treated as a flat window.
const MIN_STD: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharpeParams {
    /// Rolling window length in days
    pub window: usize,
    /// Annual risk-free rate as a decimal (0.0435 = 4.35%)
    pub annual_risk_free_rate: f64,
    pub periods_per_year: f64,
}

impl Default for SharpeParams {
    fn default() -> Self {
        Self {
            window: 30,
            annual_risk_free_rate: 0.0435,
            periods_per_year: 365.0,
        }
    }
}

impl SharpeParams {
    pub fn daily_risk_free_rate(&self) -> f64 {
        self.annual_risk_free_rate / self.periods_per_year
    }

    pub fn annualization_factor(&self) -> f64 {
        self.periods_per_year.sqrt()
    }
}

/// Output precision. Summary badges show two decimals, charts want the full value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SharpePrecision {
    Rounded,
    Raw,
}

impl SharpePrecision {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            SharpePrecision::Rounded => (value * 100.0).round() / 100.0,
            SharpePrecision::Raw => value,
        }
    }
}

/// Annualized Sharpe of one sample of daily returns.
///
/// Uses the sample (n - 1) variance. Samples with fewer than two returns or
/// no dispersion yield 0.
fn annualized_sharpe(sample: &[f64], params: &SharpeParams) -> f64 {
    let n = sample.len();
    if n < 2 {
        return 0.0;
    }

    let avg = sample.iter().sum::<f64>() / n as f64;
    let variance = sample.iter().map(|r| (r - avg).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std = variance.sqrt();

    if !std.is_finite() || std < MIN_STD {
        return 0.0;
    }

    let daily = (avg - params.daily_risk_free_rate()) / std;
    daily * params.annualization_factor()
}

/// Rolling-window Sharpe series, aligned 1:1 with `returns`.
///
/// Index `i` uses the `window` returns strictly before it, `[i - window, i)`.
/// Indices before the window fills are 0 (warm-up).
pub fn rolling_sharpe(returns: &[f64], params: &SharpeParams, precision: SharpePrecision) -> Vec<f64> {
    let window = params.window;

    (0..returns.len())
        .map(|i| {
            if window == 0 || i < window {
                0.0
            } else {
                precision.apply(annualized_sharpe(&returns[i - window..i], params))
            }
        })
        .collect()
}

/// Single Sharpe figure over a whole price history, as shown on a coin card.
///
/// The mean includes the leading zero return. Rounded to two decimals.
pub fn series_sharpe(prices: &[f64], params: &SharpeParams) -> Result<f64, DivisionError> {
    if prices.len() < 2 {
        return Ok(0.0);
    }
    let returns = daily_returns(prices)?;
    Ok(SharpePrecision::Rounded.apply(annualized_sharpe(&returns, params)))
}
