use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use common::{Candle, Config, ExchangeGateway, ExecutionDecision, Notifier, Result};
use signal::{SignalEvaluator, SymbolConfig};

use crate::executor::OrderExecutor;
use crate::tracker::PositionTracker;

/// Loop timing and candle-fetch parameters.
#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    pub timeframe: String,
    pub candle_limit: usize,
    /// Pause after a placed (or simulated) entry.
    pub cooldown: Duration,
    /// Pause between uneventful scans.
    pub scan_interval: Duration,
    /// Pause while every symbol is blocked by an open position.
    pub idle_delay: Duration,
    /// Pause after a failed cycle.
    pub error_backoff: Duration,
}

impl From<&Config> for SchedulerOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            timeframe: cfg.timeframe.clone(),
            candle_limit: cfg.candle_limit,
            cooldown: cfg.cooldown,
            scan_interval: cfg.scan_interval,
            idle_delay: cfg.idle_delay,
            error_backoff: cfg.error_backoff,
        }
    }
}

/// What a single scan cycle amounted to; picks the delay before the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// An entry was placed or simulated.
    Traded,
    /// Every symbol was scanned, none fired.
    NoSignal,
    /// Open positions blocked every symbol.
    AllBlocked,
}

/// Drives the scan loop: sweep positions, fetch candles concurrently,
/// evaluate symbols in priority order, and hand the first firing symbol
/// to the executor. At most one entry per cycle.
pub struct ScanScheduler {
    gateway: Arc<dyn ExchangeGateway>,
    notifier: Arc<dyn Notifier>,
    evaluator: SignalEvaluator,
    executor: OrderExecutor,
    tracker: PositionTracker,
    symbols: Vec<SymbolConfig>,
    opts: SchedulerOptions,
}

impl ScanScheduler {
    pub fn new(
        gateway: Arc<dyn ExchangeGateway>,
        notifier: Arc<dyn Notifier>,
        evaluator: SignalEvaluator,
        tracker: PositionTracker,
        symbols: Vec<SymbolConfig>,
        opts: SchedulerOptions,
    ) -> Self {
        let executor = OrderExecutor::new(Arc::clone(&gateway));
        Self {
            gateway,
            notifier,
            evaluator,
            executor,
            tracker,
            symbols,
            opts,
        }
    }

    /// One pass over the configured symbols.
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let names: Vec<String> = self.symbols.iter().map(|s| s.symbol.clone()).collect();
        let tradable = self
            .tracker
            .tradable_symbols(self.gateway.as_ref(), &names)
            .await?;
        if tradable.is_empty() {
            debug!("Every symbol is blocked by an open position");
            return Ok(CycleOutcome::AllBlocked);
        }

        let fetches = tradable.iter().map(|symbol| async move {
            let result = self
                .gateway
                .fetch_candles(symbol, &self.opts.timeframe, self.opts.candle_limit)
                .await;
            (symbol.clone(), result)
        });
        let mut windows: HashMap<String, Vec<Candle>> = HashMap::new();
        for (symbol, result) in join_all(fetches).await {
            match result {
                Ok(candles) => {
                    windows.insert(symbol, candles);
                }
                Err(err) => warn!(pair = %symbol, error = %err, "Candle fetch failed"),
            }
        }

        for cfg in self.symbols.iter() {
            let Some(candles) = windows.get(&cfg.symbol) else {
                continue;
            };
            let eval = match self.evaluator.evaluate(candles) {
                Ok(eval) => eval,
                Err(err) => {
                    warn!(pair = %cfg.symbol, error = %err, "Signal evaluation failed");
                    continue;
                }
            };
            debug!(
                pair = %cfg.symbol,
                fired = eval.fired,
                rsi = eval.metrics.rsi,
                pump = eval.metrics.pump_ratio,
                volume = eval.metrics.volume_ratio,
                wick = eval.metrics.wick_ratio,
                "Scanned"
            );
            if !eval.fired {
                continue;
            }

            // evaluate() rejects empty windows, so a last bar exists here.
            let price = candles[candles.len() - 1].close;
            info!(pair = %cfg.symbol, price = price, "Pump-fade signal fired");

            let decision = self.executor.execute(cfg, price).await?;
            if let ExecutionDecision::Skipped { ref reason, .. } = decision {
                warn!(pair = %cfg.symbol, reason = %reason, "Entry skipped");
                continue;
            }
            self.notifier.send(&decision.notification_text()).await;
            return Ok(CycleOutcome::Traded);
        }

        Ok(CycleOutcome::NoSignal)
    }

    /// Run until the shutdown flag flips to `true`. Delays between cycles
    /// depend on the previous outcome and are cut short on shutdown.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(symbols = self.symbols.len(), timeframe = %self.opts.timeframe, "Scan loop started");
        loop {
            if *shutdown.borrow() {
                break;
            }
            let delay = match self.run_cycle().await {
                Ok(CycleOutcome::Traded) => self.opts.cooldown,
                Ok(CycleOutcome::NoSignal) => self.opts.scan_interval,
                Ok(CycleOutcome::AllBlocked) => self.opts.idle_delay,
                Err(err) => {
                    error!(error = %err, "Scan cycle failed");
                    self.opts.error_backoff
                }
            };
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => {}
            }
        }
        info!("Scan loop stopped");
    }
}
