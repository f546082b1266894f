//! RSI (Relative Strength Index) with Wilder's smoothing.

use common::{Error, Result};

/// Compute the RSI series over a slice of prices (oldest first).
///
/// The first average gain/loss is the arithmetic mean of the first `period`
/// deltas; every later value uses Wilder smoothing,
/// `avg = (avg * (period - 1) + x) / period`. Output is tail-aligned: one
/// value per delta from index `period - 1` onward, so the series is
/// `prices.len() - period` long.
///
/// A window with zero average loss maps RS to 100, yielding an RSI of
/// `100 - 100/101` (≈ 99.0099) rather than saturating at exactly 100. The
/// overbought threshold downstream was tuned against this variant, so it is
/// kept as-is.
pub fn series(prices: &[f64], period: usize) -> Result<Vec<f64>> {
    assert!(period >= 1, "RSI period must be >= 1");

    let needed = period + 1;
    if prices.len() < needed {
        return Err(Error::InsufficientData {
            needed,
            got: prices.len(),
        });
    }

    let deltas: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
    let gains: Vec<f64> = deltas.iter().map(|&d| if d > 0.0 { d } else { 0.0 }).collect();
    let losses: Vec<f64> = deltas.iter().map(|&d| if d < 0.0 { -d } else { 0.0 }).collect();

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;

    let mut rs = if avg_loss != 0.0 { avg_gain / avg_loss } else { 100.0 };
    let mut out = vec![100.0 - 100.0 / (1.0 + rs)];

    for i in period..deltas.len() {
        avg_gain = (avg_gain * (period as f64 - 1.0) + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + losses[i]) / period as f64;
        rs = if avg_loss != 0.0 { avg_gain / avg_loss } else { 100.0 };
        out.push(100.0 - 100.0 / (1.0 + rs));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_when_insufficient_data() {
        let prices = vec![100.0; 5];
        match series(&prices, 5) {
            Err(Error::InsufficientData { needed, got }) => {
                assert_eq!(needed, 6);
                assert_eq!(got, 5);
            }
            other => panic!("expected InsufficientData, got {other:?}"),
        }
    }

    #[test]
    fn output_is_one_value_per_smoothed_delta() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + (i % 3) as f64).collect();
        let out = series(&prices, 5).unwrap();
        assert_eq!(out.len(), prices.len() - 5);
    }

    #[test]
    fn zero_loss_window_yields_rs_100_not_saturation() {
        // Strictly increasing prices: avg_loss is 0 on every step, so every
        // RSI value must be exactly 100 - 100/101.
        let prices: Vec<f64> = (0..12).map(|i| 100.0 + i as f64).collect();
        let out = series(&prices, 5).unwrap();
        let expected = 100.0 - 100.0 / 101.0;
        for v in out {
            assert!((v - expected).abs() < 1e-12, "expected {expected}, got {v}");
        }
    }

    #[test]
    fn stays_within_bounds_and_trends_high_on_rally() {
        let mut prices: Vec<f64> = (0..30).map(|i| 100.0 - (i % 4) as f64).collect();
        prices.extend((0..15).map(|i| 100.0 + i as f64 * 2.0));
        let out = series(&prices, 5).unwrap();
        for &v in &out {
            assert!((0.0..=100.0).contains(&v), "RSI out of range: {v}");
        }
        assert!(*out.last().unwrap() > 90.0, "RSI should be high after a rally");
    }

    #[test]
    fn all_losses_drive_rsi_to_zero() {
        let prices: Vec<f64> = (0..12).map(|i| 100.0 - i as f64).collect();
        let out = series(&prices, 5).unwrap();
        assert!(out.last().unwrap().abs() < 1e-9);
    }
}
