use serde::{Deserialize, Serialize};

use common::{Candle, Error, Result};

use crate::indicators::{ema, rsi};

/// Tunable thresholds for the pump-fade signal. Defaults match the values
/// the strategy was tuned with; override via the `[signal]` table of the
/// symbols config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalParams {
    /// Candle window the indicators are computed over. Longer inputs are
    /// truncated to this tail so extra history cannot shift the outcome.
    pub window: usize,
    /// Bars between the reference close and the latest close.
    pub pump_lookback: usize,
    /// Minimum close ratio over the lookback to count as a pump.
    pub pump_ratio: f64,
    /// Number of preceding bars averaged for the volume baseline.
    pub volume_window: usize,
    /// Multiple of the baseline the latest volume must exceed.
    pub volume_factor: f64,
    pub rsi_period: usize,
    pub rsi_overbought: f64,
    pub ema_period: usize,
    /// Minimum upper-wick share of the bar's range for a rejection.
    pub wick_threshold: f64,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            window: 20,
            pump_lookback: 5,
            pump_ratio: 1.12,
            volume_window: 10,
            volume_factor: 2.5,
            rsi_period: 5,
            rsi_overbought: 80.0,
            ema_period: 9,
            wick_threshold: 0.7,
        }
    }
}

impl SignalParams {
    /// Smallest window that supports every factor: the volume baseline plus
    /// the current bar, the pump lookback, two smoothed RSI values, and
    /// three EMA values.
    pub fn min_candles(&self) -> usize {
        (self.volume_window + 1)
            .max(self.pump_lookback + 1)
            .max(self.rsi_period + 2)
            .max(3)
    }
}

/// Derived values behind one evaluation. Produced fresh per call; useful
/// for logging and tests, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalMetrics {
    /// Latest close over the close `pump_lookback` bars earlier.
    pub pump_ratio: f64,
    /// Latest volume over the baseline average (0 when the baseline is 0).
    pub volume_ratio: f64,
    pub rsi: f64,
    pub rsi_prev: f64,
    /// EMA over the last three bars, oldest first.
    pub ema: [f64; 3],
    pub wick_ratio: f64,
}

/// Outcome of one evaluation.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub fired: bool,
    pub metrics: SignalMetrics,
}

/// The composite pump-fade predicate. All five factors must hold on the
/// latest bar for the signal to fire:
///
/// 1. pump: close is up more than `pump_ratio` over `pump_lookback` bars
/// 2. volume spike over the `volume_window`-bar baseline
/// 3. RSI above `rsi_overbought` and strictly below the prior bar's RSI
/// 4. EMA strictly decreasing across the last three bars
/// 5. upper wick larger than `wick_threshold` of the bar's range
#[derive(Debug, Clone, Default)]
pub struct SignalEvaluator {
    params: SignalParams,
}

impl SignalEvaluator {
    pub fn new(params: SignalParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SignalParams {
        &self.params
    }

    /// Evaluate one candle window, oldest first. Fails closed with
    /// `InsufficientData` when the window is too short; degenerate bars
    /// (zero range, zero volume baseline) evaluate to non-firing factors
    /// rather than erroring.
    pub fn evaluate(&self, candles: &[Candle]) -> Result<Evaluation> {
        let p = &self.params;
        let needed = p.min_candles();
        if candles.len() < needed {
            return Err(Error::InsufficientData {
                needed,
                got: candles.len(),
            });
        }

        // Work on a fixed-size tail: both smoothed indicators depend on how
        // far back the series starts, so extra history must not be allowed
        // to shift the decision.
        let span = p.window.max(needed);
        let window = &candles[candles.len().saturating_sub(span)..];
        let n = window.len();
        let last = &window[n - 1];

        let closes: Vec<f64> = window.iter().map(|c| c.close).collect();
        let volumes: Vec<f64> = window.iter().map(|c| c.volume).collect();

        let close_ref = closes[n - 1 - p.pump_lookback];
        let pump = last.close > close_ref * p.pump_ratio;
        let pump_ratio = if close_ref > 0.0 {
            last.close / close_ref
        } else {
            0.0
        };

        // Baseline excludes the current bar.
        let baseline = &volumes[n - 1 - p.volume_window..n - 1];
        let avg_volume = baseline.iter().sum::<f64>() / p.volume_window as f64;
        let volume_spike = last.volume > p.volume_factor * avg_volume;
        let volume_ratio = if avg_volume > 0.0 {
            last.volume / avg_volume
        } else {
            0.0
        };

        let rsi_series = rsi::series(&closes, p.rsi_period)?;
        let rsi = rsi_series[rsi_series.len() - 1];
        let rsi_prev = rsi_series[rsi_series.len() - 2];
        let overbought_turn = rsi > p.rsi_overbought && rsi < rsi_prev;

        let ema_series = ema::series(&closes, p.ema_period);
        let ema = [ema_series[n - 3], ema_series[n - 2], ema_series[n - 1]];
        let downtrend = ema[2] < ema[1] && ema[1] < ema[0];

        let range = last.high - last.low;
        let wick_ratio = if range > 0.0 {
            (last.high - last.close) / range
        } else {
            0.0
        };
        let rejection = wick_ratio > p.wick_threshold;

        let fired = pump && volume_spike && overbought_turn && downtrend && rejection;

        Ok(Evaluation {
            fired,
            metrics: SignalMetrics {
                pump_ratio,
                volume_ratio,
                rsi,
                rsi_prev,
                ema,
                wick_ratio,
            },
        })
    }
}
