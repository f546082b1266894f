//! EMA (Exponential Moving Average), seeded with the first price.

/// Compute the EMA series over a slice of prices (oldest first).
///
/// Seeded with the first price itself, not an SMA of the first `period`
/// values; the downtrend check downstream was tuned against that seeding.
/// Multiplier is `2 / (period + 1)`. Output length equals input length.
pub fn series(prices: &[f64], period: usize) -> Vec<f64> {
    assert!(period >= 1, "EMA period must be >= 1");

    let mut out = Vec::with_capacity(prices.len());
    let Some(&first) = prices.first() else {
        return out;
    };

    let k = 2.0 / (period as f64 + 1.0);
    let mut prev = first;
    out.push(prev);
    for &price in &prices[1..] {
        prev = (price - prev) * k + prev;
        out.push(prev);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(series(&[], 9).is_empty());
    }

    #[test]
    fn output_length_matches_input_and_seed_is_first_price() {
        let prices = vec![104.0, 102.0, 101.5, 103.0, 99.0];
        let out = series(&prices, 9);
        assert_eq!(out.len(), prices.len());
        assert_eq!(out[0], 104.0);
    }

    #[test]
    fn follows_a_declining_series_downward() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let out = series(&prices, 9);
        for pair in out.windows(2) {
            assert!(pair[1] < pair[0], "EMA must strictly decrease on a decline");
        }
    }

    #[test]
    fn constant_series_is_a_fixed_point() {
        let out = series(&[50.0; 10], 9);
        assert!(out.iter().all(|&v| (v - 50.0).abs() < 1e-12));
    }
}
