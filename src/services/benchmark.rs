use tracing::warn;

use crate::errors::DivisionError;
use crate::services::normalizer::normalize;

/// Benchmark rescaled onto the portfolio's value scale.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkAlignment {
    /// portfolio_value[0] / benchmark_price[0]
    pub ratio: f64,
    /// Benchmark expressed in portfolio currency units
    pub scaled: Vec<f64>,
    /// Indexed to 1.0 on day 0, directly comparable with the portfolio index
    pub normalized: Vec<f64>,
}

/// Put the benchmark on the same starting point as the portfolio.
///
/// Series of different lengths are cut to the shorter one, keeping the most
/// recent observations.
pub fn align_benchmark(
    benchmark_prices: &[f64],
    portfolio_values: &[f64],
) -> Result<BenchmarkAlignment, DivisionError> {
    let n = benchmark_prices.len().min(portfolio_values.len());
    if benchmark_prices.len() != portfolio_values.len() {
        warn!(
            "Benchmark has {} points and portfolio {}; truncating both to {}",
            benchmark_prices.len(),
            portfolio_values.len(),
            n
        );
    }
    let bench = &benchmark_prices[benchmark_prices.len() - n..];
    let values = &portfolio_values[portfolio_values.len() - n..];

    let (Some(&bench_base), Some(&value_base)) = (bench.first(), values.first()) else {
        return Ok(BenchmarkAlignment {
            ratio: 0.0,
            scaled: Vec::new(),
            normalized: Vec::new(),
        });
    };
    if bench_base == 0.0 || value_base == 0.0 {
        return Err(DivisionError::ZeroBaseline);
    }

    let ratio = value_base / bench_base;
    let scaled: Vec<f64> = bench.iter().map(|p| p * ratio).collect();
    let rebased: Vec<f64> = scaled.iter().map(|v| v / value_base).collect();
    let normalized = normalize(&rebased)?;

    Ok(BenchmarkAlignment {
        ratio,
        scaled,
        normalized,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_bitcoin_benchmark() {
        let aligned = align_benchmark(&[50000.0, 52000.0], &[1000.0, 1100.0]).unwrap();
        assert!((aligned.ratio - 0.02).abs() < 1e-15);
        assert!((aligned.scaled[0] - 1000.0).abs() < 1e-9);
        assert!((aligned.scaled[1] - 1040.0).abs() < 1e-9);
        assert_eq!(aligned.normalized[0], 1.0);
        assert!((aligned.normalized[1] - 1.04).abs() < 1e-12);
    }

    #[test]
    fn test_mismatched_lengths_keep_recent_points() {
        let aligned = align_benchmark(&[1.0, 50.0, 55.0], &[200.0, 220.0]).unwrap();
        assert_eq!(aligned.normalized.len(), 2);
        assert!((aligned.ratio - 4.0).abs() < 1e-12);
        assert!((aligned.normalized[1] - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_zero_portfolio_value_is_an_error() {
        let err = align_benchmark(&[100.0, 101.0], &[0.0, 0.0]).unwrap_err();
        assert_eq!(err, DivisionError::ZeroBaseline);
    }

    #[test]
    fn test_empty_inputs() {
        let aligned = align_benchmark(&[], &[1.0]).unwrap();
        assert!(aligned.normalized.is_empty());
    }
}
