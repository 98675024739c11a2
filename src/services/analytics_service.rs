use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::ComputeError;
use crate::external::price_provider::PriceProvider;
use crate::models::{AnalyticsMeta, AnalyticsResult, Holding, PriceSeries};
use crate::services::alignment::{align_by_position, AlignmentPolicy};
use crate::services::analytics_publisher::AnalyticsPublisher;
use crate::services::benchmark::align_benchmark;
use crate::services::failure_cache::FailureCache;
use crate::services::history_fetcher::{fetch_history, FetchPolicy};
use crate::services::normalizer::normalize;
use crate::services::portfolio_value::{portfolio_value, WeightedPrices};
use crate::services::returns::daily_returns;
use crate::services::sharpe::{rolling_sharpe, SharpeParams, SharpePrecision};

/// Knobs for one analytics run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsParams {
    pub lookback_days: u32,
    pub sharpe: SharpeParams,
    pub alignment: AlignmentPolicy,
    pub fetch: FetchPolicy,
}

impl Default for AnalyticsParams {
    fn default() -> Self {
        Self {
            lookback_days: 365,
            sharpe: SharpeParams::default(),
            alignment: AlignmentPolicy::default(),
            fetch: FetchPolicy::default(),
        }
    }
}

/// Turn fetched histories into the comparison dataset.
///
/// `basket` pairs each holding's history with its amount. Pure: the same inputs
/// always give the same result.
pub fn compute_analytics(
    basket: &[(PriceSeries, f64)],
    benchmark: &PriceSeries,
    params: &AnalyticsParams,
) -> Result<AnalyticsResult, ComputeError> {
    if basket.is_empty() {
        return Ok(AnalyticsResult::empty(benchmark.asset_id.clone()));
    }

    // basket series first, benchmark last
    let mut all: Vec<&PriceSeries> = basket.iter().map(|(series, _)| series).collect();
    all.push(benchmark);
    let aligned = align_by_position(&all, params.alignment)?;

    let Some((bench_prices, asset_prices)) = aligned.prices.split_last() else {
        return Ok(AnalyticsResult::empty(benchmark.asset_id.clone()));
    };

    let weighted: Vec<WeightedPrices<'_>> = asset_prices
        .iter()
        .zip(basket.iter())
        .map(|(prices, (_, amount))| WeightedPrices {
            prices: prices.as_slice(),
            amount: *amount,
        })
        .collect();
    let values = portfolio_value(&weighted)?;

    let portfolio_normalized = normalize(&values)?;
    let portfolio_returns = daily_returns(&portfolio_normalized)?;
    let portfolio_sharpe = rolling_sharpe(&portfolio_returns, &params.sharpe, SharpePrecision::Raw);

    let benchmark_aligned = align_benchmark(bench_prices, &values)?;
    let benchmark_returns = daily_returns(bench_prices)?;
    let benchmark_sharpe = rolling_sharpe(&benchmark_returns, &params.sharpe, SharpePrecision::Raw);

    let meta = AnalyticsMeta {
        points: aligned.len(),
        start: aligned.dates.first().copied(),
        end: aligned.dates.last().copied(),
        benchmark_id: benchmark.asset_id.clone(),
    };

    Ok(AnalyticsResult {
        dates: aligned.dates,
        portfolio_normalized,
        portfolio_sharpe,
        benchmark_normalized: benchmark_aligned.normalized,
        benchmark_sharpe,
        meta,
    })
}

/// Fetch every basket asset and the benchmark concurrently, wait for all of
/// them, then compute.
///
/// Any failed fetch aborts the run; partial data is never used.
pub async fn run_analytics(
    provider: &dyn PriceProvider,
    failure_cache: &FailureCache,
    holdings: &[Holding],
    benchmark_id: &str,
    params: &AnalyticsParams,
) -> Result<AnalyticsResult, ComputeError> {
    if holdings.is_empty() {
        info!("Basket is empty, nothing to compute");
        return Ok(AnalyticsResult::empty(benchmark_id));
    }

    let days = params.lookback_days;
    let asset_fetches = holdings
        .iter()
        .map(|h| fetch_history(provider, failure_cache, &h.asset_id, days, &params.fetch));
    let benchmark_fetch = fetch_history(provider, failure_cache, benchmark_id, days, &params.fetch);

    let (asset_results, benchmark_result) =
        futures::join!(join_all(asset_fetches), benchmark_fetch);

    let mut basket = Vec::with_capacity(holdings.len());
    for (holding, result) in holdings.iter().zip(asset_results) {
        let series = result.map_err(|source| ComputeError::Fetch {
            asset_id: holding.asset_id.clone(),
            source,
        })?;
        basket.push((series, holding.amount));
    }
    let benchmark = benchmark_result.map_err(|source| ComputeError::Fetch {
        asset_id: benchmark_id.to_string(),
        source,
    })?;

    compute_analytics(&basket, &benchmark, params)
}

/// Recompute in the background for basket `revision` and hand the outcome to
/// the publisher. Earlier runs still in flight are left alone; the publisher
/// drops whichever finishes stale.
pub fn schedule_recompute(
    provider: Arc<dyn PriceProvider>,
    failure_cache: FailureCache,
    publisher: AnalyticsPublisher,
    params: Arc<AnalyticsParams>,
    benchmark_id: String,
    revision: u64,
    holdings: Vec<Holding>,
) -> tokio::task::JoinHandle<()> {
    publisher.begin(revision);

    tokio::spawn(async move {
        let run_id = Uuid::new_v4();
        let start = Instant::now();
        info!(
            "📈 Analytics run {} started for revision {} ({} holdings, benchmark {})",
            run_id,
            revision,
            holdings.len(),
            benchmark_id
        );

        match run_analytics(provider.as_ref(), &failure_cache, &holdings, &benchmark_id, &params).await {
            Ok(result) => {
                info!(
                    "✓ Analytics run {} finished in {:?} ({} points)",
                    run_id,
                    start.elapsed(),
                    result.meta.points
                );
                publisher.publish(revision, run_id, result);
            }
            Err(e) => {
                error!("✗ Analytics run {} for revision {} failed: {}", run_id, revision, e);
                publisher.fail(revision, e.to_string());
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DivisionError;
    use chrono::NaiveDate;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_single_holding_scenario() {
        let coin = PriceSeries::from_prices("coin", start(), &[100.0, 110.0, 121.0]);
        let btc = PriceSeries::from_prices("bitcoin", start(), &[50000.0, 52000.0, 54000.0]);

        let result = compute_analytics(&[(coin, 1.0)], &btc, &AnalyticsParams::default()).unwrap();

        assert_eq!(result.dates.len(), 3);
        assert_eq!(result.portfolio_normalized[0], 1.0);
        assert!((result.portfolio_normalized[1] - 1.10).abs() < 1e-12);
        assert!((result.portfolio_normalized[2] - 1.21).abs() < 1e-12);
        assert!((result.benchmark_normalized[1] - 1.04).abs() < 1e-12);
        assert_eq!(result.portfolio_sharpe, vec![0.0; 3]);
        assert_eq!(result.benchmark_sharpe, vec![0.0; 3]);
        assert_eq!(result.meta.benchmark_id, "bitcoin");
    }

    #[test]
    fn test_empty_basket_is_no_data() {
        let btc = PriceSeries::from_prices("bitcoin", start(), &[1.0, 2.0]);
        let result = compute_analytics(&[], &btc, &AnalyticsParams::default()).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.meta.points, 0);
    }

    #[test]
    fn test_all_zero_amounts_is_a_division_error() {
        let coin = PriceSeries::from_prices("coin", start(), &[1.0, 2.0]);
        let btc = PriceSeries::from_prices("bitcoin", start(), &[1.0, 2.0]);
        let err = compute_analytics(&[(coin, 0.0)], &btc, &AnalyticsParams::default()).unwrap_err();
        assert!(matches!(err, ComputeError::Division(DivisionError::ZeroBaseline)));
    }

    #[test]
    fn test_zero_benchmark_price_is_a_division_error() {
        let coin = PriceSeries::from_prices("coin", start(), &[1.0, 2.0, 3.0]);
        let btc = PriceSeries::from_prices("bitcoin", start(), &[1.0, 0.0, 2.0]);
        let err = compute_analytics(&[(coin, 1.0)], &btc, &AnalyticsParams::default()).unwrap_err();
        assert!(matches!(err, ComputeError::Division(DivisionError::ZeroPrice { index: 2 })));
    }

    #[test]
    fn test_series_lengths_follow_shortest_history() {
        let old = PriceSeries::from_prices("old", start(), &[1.0, 2.0, 3.0, 4.0]);
        let new = PriceSeries::from_prices("new", start().succ_opt().unwrap(), &[5.0, 6.0, 7.0]);
        let btc = PriceSeries::from_prices("bitcoin", start(), &[10.0, 11.0, 12.0, 13.0]);

        let result =
            compute_analytics(&[(old, 1.0), (new, 1.0)], &btc, &AnalyticsParams::default()).unwrap();

        assert_eq!(result.dates.len(), 3);
        assert_eq!(result.portfolio_sharpe.len(), 3);
        assert_eq!(result.benchmark_normalized.len(), 3);
        // day 0 is 2 + 5, last day 4 + 7
        assert!((result.portfolio_normalized[2] - 11.0 / 7.0).abs() < 1e-12);
    }
}
