use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use thiserror::Error;

use crate::external::price_provider::PriceProviderError;

/// A zero divisor met while turning prices into returns or indexing a series.
///
/// Surfacing this instead of dividing keeps infinities and NaN out of the charts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DivisionError {
    #[error("previous-day price is zero at index {index}")]
    ZeroPrice { index: usize },
    #[error("baseline value is zero, series cannot be indexed")]
    ZeroBaseline,
}

/// Series lengths differ by more than the configured tolerance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("series lengths differ by {difference} (shortest {shortest}, longest {longest}, tolerance {tolerance})")]
pub struct AlignmentError {
    pub shortest: usize,
    pub longest: usize,
    pub difference: usize,
    pub tolerance: usize,
}

/// Everything that can stop an analytics run.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("price history unavailable for {asset_id}: {source}")]
    Fetch {
        asset_id: String,
        #[source]
        source: PriceProviderError,
    },
    #[error(transparent)]
    Division(#[from] DivisionError),
    #[error(transparent)]
    Alignment(#[from] AlignmentError),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Rate limited by external provider")]
    RateLimited,
    #[error("External error: {0}")]
    External(String),
    #[error("Analytics unavailable: {0}")]
    Compute(#[from] ComputeError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::RateLimited => {
                let mut headers = HeaderMap::new();
                headers.insert("Retry-After", HeaderValue::from_static("60"));
                (StatusCode::TOO_MANY_REQUESTS, headers, "Rate limited").into_response()
            }
            AppError::External(msg) => (StatusCode::BAD_GATEWAY, msg).into_response(),
            AppError::Compute(e) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Analytics unavailable: {}", e),
            )
                .into_response(),
        }
    }
}

impl From<PriceProviderError> for AppError {
    fn from(value: PriceProviderError) -> Self {
        match value {
            PriceProviderError::RateLimited => AppError::RateLimited,
            PriceProviderError::NotFound(id) => AppError::NotFound(format!("Unknown asset {}", id)),
            other => AppError::External(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_error_maps_to_service_unavailable() {
        let err = AppError::from(ComputeError::from(DivisionError::ZeroBaseline));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = AppError::from(PriceProviderError::RateLimited).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get("Retry-After").unwrap(), "60");
    }

    #[test]
    fn test_fetch_error_names_the_asset() {
        let err = ComputeError::Fetch {
            asset_id: "dogecoin".to_string(),
            source: PriceProviderError::Timeout,
        };
        assert!(err.to_string().contains("dogecoin"));
    }
}
