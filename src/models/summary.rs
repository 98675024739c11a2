use serde::{Deserialize, Serialize};

/// Coarse grading of a Sharpe value for the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SharpeBand {
    Unavailable,
    Negative,
    Weak,
    Good,
    Strong,
    Excellent,
}

impl SharpeBand {
    pub fn classify(sharpe: Option<f64>) -> Self {
        match sharpe {
            None => SharpeBand::Unavailable,
            Some(s) if !s.is_finite() => SharpeBand::Unavailable,
            Some(s) if s < 0.0 => SharpeBand::Negative,
            Some(s) if s < 1.0 => SharpeBand::Weak,
            Some(s) if s < 2.0 => SharpeBand::Good,
            Some(s) if s < 3.0 => SharpeBand::Strong,
            Some(_) => SharpeBand::Excellent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Mean of the card Sharpe values; `None` while the basket is empty
    pub average_sharpe: Option<f64>,
    pub sharpe_band: SharpeBand,
    pub total_value: f64,
    /// Percent change of the portfolio index over the lookback
    pub performance_pct: Option<f64>,
    /// Portfolio minus benchmark performance, in percentage points
    pub vs_benchmark_pct: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_edges() {
        assert_eq!(SharpeBand::classify(None), SharpeBand::Unavailable);
        assert_eq!(SharpeBand::classify(Some(-0.01)), SharpeBand::Negative);
        assert_eq!(SharpeBand::classify(Some(0.0)), SharpeBand::Weak);
        assert_eq!(SharpeBand::classify(Some(1.0)), SharpeBand::Good);
        assert_eq!(SharpeBand::classify(Some(2.5)), SharpeBand::Strong);
        assert_eq!(SharpeBand::classify(Some(3.0)), SharpeBand::Excellent);
        assert_eq!(SharpeBand::classify(Some(f64::NAN)), SharpeBand::Unavailable);
    }
}
