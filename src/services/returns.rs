use crate::errors::DivisionError;

/// Simple daily returns, aligned with `prices`.
///
/// The first element is 0 since there is no prior day. A zero previous price is
/// an error rather than an infinite return.
pub fn daily_returns(prices: &[f64]) -> Result<Vec<f64>, DivisionError> {
    if prices.is_empty() {
        return Ok(Vec::new());
    }

    let mut out = Vec::with_capacity(prices.len());
    out.push(0.0);

    for (i, pair) in prices.windows(2).enumerate() {
        let (prev, curr) = (pair[0], pair[1]);
        if prev == 0.0 {
            return Err(DivisionError::ZeroPrice { index: i + 1 });
        }
        out.push((curr - prev) / prev);
    }

    Ok(out)
}
