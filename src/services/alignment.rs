use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AlignmentError;
use crate::models::PriceSeries;

/// How much length disagreement between fetched series is tolerated.
///
/// Without a tolerance every mismatch is truncated away with a warning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentPolicy {
    pub tolerance: Option<usize>,
}

/// Price series cut to a common length, matched by index position.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSeries {
    /// Dates of the first input series
    pub dates: Vec<NaiveDate>,
    /// Prices per input series, in input order
    pub prices: Vec<Vec<f64>>,
    pub truncated: bool,
    /// Index positions where the inputs disagree on the calendar day
    pub date_mismatches: usize,
}

impl AlignedSeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Align by index position, keeping the most recent observations of each series.
///
/// Providers deliver histories ending today, so trimming the oldest points lines
/// up the tails. Calendar disagreements are counted and logged, not repaired.
pub fn align_by_position(
    series: &[&PriceSeries],
    policy: AlignmentPolicy,
) -> Result<AlignedSeries, AlignmentError> {
    let Some(first) = series.first() else {
        return Ok(AlignedSeries {
            dates: Vec::new(),
            prices: Vec::new(),
            truncated: false,
            date_mismatches: 0,
        });
    };

    let shortest = series.iter().map(|s| s.len()).min().unwrap_or(0);
    let longest = series.iter().map(|s| s.len()).max().unwrap_or(0);
    let difference = longest - shortest;

    if let Some(tolerance) = policy.tolerance {
        if difference > tolerance {
            return Err(AlignmentError {
                shortest,
                longest,
                difference,
                tolerance,
            });
        }
    }

    let truncated = difference > 0;
    if truncated {
        let lengths: Vec<String> = series
            .iter()
            .map(|s| format!("{}={}", s.asset_id, s.len()))
            .collect();
        warn!(
            "Price histories differ in length ({}); truncating to the most recent {} points",
            lengths.join(", "),
            shortest
        );
    }

    let tails: Vec<_> = series.iter().map(|s| s.tail(shortest)).collect();
    let dates: Vec<NaiveDate> = first.tail(shortest).iter().map(|p| p.date).collect();

    let date_mismatches = (0..shortest)
        .filter(|&i| tails.iter().any(|t| t[i].date != dates[i]))
        .count();
    if date_mismatches > 0 {
        warn!(
            "{} of {} aligned positions disagree on the calendar day",
            date_mismatches, shortest
        );
    }

    Ok(AlignedSeries {
        dates,
        prices: tails
            .iter()
            .map(|t| t.iter().map(|p| p.price).collect())
            .collect(),
        truncated,
        date_mismatches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_equal_lengths_untouched() {
        let a = PriceSeries::from_prices("a", day(1), &[1.0, 2.0]);
        let b = PriceSeries::from_prices("b", day(1), &[3.0, 4.0]);
        let aligned = align_by_position(&[&a, &b], AlignmentPolicy::default()).unwrap();
        assert!(!aligned.truncated);
        assert_eq!(aligned.prices, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(aligned.date_mismatches, 0);
    }

    #[test]
    fn test_truncates_to_most_recent() {
        let long = PriceSeries::from_prices("long", day(1), &[1.0, 2.0, 3.0]);
        let short = PriceSeries::from_prices("short", day(2), &[20.0, 30.0]);
        let aligned = align_by_position(&[&long, &short], AlignmentPolicy::default()).unwrap();
        assert!(aligned.truncated);
        assert_eq!(aligned.dates, vec![day(2), day(3)]);
        assert_eq!(aligned.prices[0], vec![2.0, 3.0]);
        assert_eq!(aligned.date_mismatches, 0);
    }

    #[test]
    fn test_tolerance_exceeded() {
        let long = PriceSeries::from_prices("long", day(1), &[1.0, 2.0, 3.0, 4.0]);
        let short = PriceSeries::from_prices("short", day(1), &[1.0]);
        let err = align_by_position(&[&long, &short], AlignmentPolicy { tolerance: Some(2) }).unwrap_err();
        assert_eq!(err.difference, 3);
    }

    #[test]
    fn test_counts_calendar_disagreement() {
        let a = PriceSeries::from_prices("a", day(1), &[1.0, 2.0]);
        let b = PriceSeries::from_prices("b", day(5), &[1.0, 2.0]);
        let aligned = align_by_position(&[&a, &b], AlignmentPolicy::default()).unwrap();
        assert_eq!(aligned.date_mismatches, 2);
        assert_eq!(aligned.dates, a.dates());
    }
}
