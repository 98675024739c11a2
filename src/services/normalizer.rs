use crate::errors::DivisionError;

/// Index a series to its first observation, so `out[0] == 1.0`.
pub fn normalize(values: &[f64]) -> Result<Vec<f64>, DivisionError> {
    let Some(&base) = values.first() else {
        return Ok(Vec::new());
    };
    if base == 0.0 {
        return Err(DivisionError::ZeroBaseline);
    }
    Ok(values.iter().map(|v| v / base).collect())
}
