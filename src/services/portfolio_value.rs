use crate::errors::AlignmentError;

/// One holding's price history together with the amount held.
#[derive(Debug, Clone, Copy)]
pub struct WeightedPrices<'a> {
    pub prices: &'a [f64],
    pub amount: f64,
}

/// Portfolio value per day: `value[i] = Σ amount * price[i]`.
///
/// All price slices must already be aligned to the same length. An empty
/// basket gives an empty series.
pub fn portfolio_value(holdings: &[WeightedPrices<'_>]) -> Result<Vec<f64>, AlignmentError> {
    let Some(first) = holdings.first() else {
        return Ok(Vec::new());
    };
    let n = first.prices.len();

    let (shortest, longest) = holdings.iter().fold((n, n), |(lo, hi), h| {
        (lo.min(h.prices.len()), hi.max(h.prices.len()))
    });
    if shortest != longest {
        return Err(AlignmentError {
            shortest,
            longest,
            difference: longest - shortest,
            tolerance: 0,
        });
    }

    Ok((0..n)
        .map(|i| holdings.iter().map(|h| h.amount * h.prices[i]).sum())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_basket_is_empty() {
        assert!(portfolio_value(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_weighted_sum() {
        let btc = [100.0, 110.0];
        let eth = [10.0, 9.0];
        let value = portfolio_value(&[
            WeightedPrices { prices: &btc, amount: 2.0 },
            WeightedPrices { prices: &eth, amount: 10.0 },
        ])
        .unwrap();
        assert_eq!(value, vec![300.0, 310.0]);
    }

    #[test]
    fn test_zero_amount_contributes_nothing() {
        let btc = [100.0, 110.0, 121.0];
        let doge = [0.1, 0.2, 0.3];
        let value = portfolio_value(&[
            WeightedPrices { prices: &btc, amount: 1.0 },
            WeightedPrices { prices: &doge, amount: 0.0 },
        ])
        .unwrap();
        assert_eq!(value, vec![100.0, 110.0, 121.0]);
    }

    #[test]
    fn test_unaligned_inputs_rejected() {
        let a = [1.0, 2.0, 3.0];
        let b = [1.0, 2.0];
        let err = portfolio_value(&[
            WeightedPrices { prices: &a, amount: 1.0 },
            WeightedPrices { prices: &b, amount: 1.0 },
        ])
        .unwrap_err();
        assert_eq!(err.difference, 1);
    }
}
