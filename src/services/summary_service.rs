use crate::models::{AnalyticsResult, BasketEntry, PortfolioSummary, SharpeBand};

/// Status-bar figures for the basket, optionally with the latest analytics.
pub fn summarize(entries: &[BasketEntry], analytics: Option<&AnalyticsResult>) -> PortfolioSummary {
    let average_sharpe = if entries.is_empty() {
        None
    } else {
        Some(entries.iter().map(|e| e.card.sharpe).sum::<f64>() / entries.len() as f64)
    };

    let total_value = entries.iter().map(|e| e.position).sum();

    let portfolio_last = analytics.and_then(|a| a.portfolio_normalized.last().copied());
    let benchmark_last = analytics.and_then(|a| a.benchmark_normalized.last().copied());

    let performance_pct = portfolio_last.map(|p| (p - 1.0) * 100.0);
    let vs_benchmark_pct = match (portfolio_last, benchmark_last) {
        (Some(p), Some(b)) => Some((p - b) * 100.0),
        _ => None,
    };

    PortfolioSummary {
        average_sharpe,
        sharpe_band: SharpeBand::classify(average_sharpe),
        total_value,
        performance_pct,
        vs_benchmark_pct,
    }
}
