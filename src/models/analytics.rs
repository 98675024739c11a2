use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsMeta {
    pub points: usize,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub benchmark_id: String,
}

/// Everything the chart layer needs: two value curves indexed to 1.0 on day 0
/// and their rolling Sharpe curves, all aligned with `dates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsResult {
    pub dates: Vec<NaiveDate>,
    pub portfolio_normalized: Vec<f64>,
    pub portfolio_sharpe: Vec<f64>,
    pub benchmark_normalized: Vec<f64>,
    pub benchmark_sharpe: Vec<f64>,
    pub meta: AnalyticsMeta,
}

impl AnalyticsResult {
    /// The "no data" result for an empty basket.
    pub fn empty(benchmark_id: impl Into<String>) -> Self {
        Self {
            dates: Vec::new(),
            portfolio_normalized: Vec::new(),
            portfolio_sharpe: Vec::new(),
            benchmark_normalized: Vec::new(),
            benchmark_sharpe: Vec::new(),
            meta: AnalyticsMeta {
                points: 0,
                start: None,
                end: None,
                benchmark_id: benchmark_id.into(),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// A completed run, tagged with the basket revision it was computed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedAnalytics {
    pub revision: u64,
    pub run_id: Uuid,
    pub computed_at: DateTime<Utc>,
    pub result: AnalyticsResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalyticsStatus {
    /// Nothing requested yet
    Idle,
    /// A run for `revision` is in flight
    Pending { revision: u64 },
    Ready(PublishedAnalytics),
    /// The newest run failed; no stale result is served in its place
    Unavailable { revision: u64, reason: String },
}
