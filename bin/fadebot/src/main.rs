use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use common::{Config, ExchangeGateway, Notifier};
use engine::{BitgetClient, PositionTracker, ScanScheduler, SchedulerOptions};
use signal::{SignalEvaluator, SymbolsFileConfig};
use telegram_notify::TelegramNotifier;

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    let symbols_file = SymbolsFileConfig::load(&cfg.symbols_config_path);
    info!(
        symbols = symbols_file.symbols.len(),
        timeframe = %cfg.timeframe,
        block_policy = ?cfg.block_policy,
        "FadeBot starting"
    );

    // ── Exchange and notifier ─────────────────────────────────────────────────
    let gateway: Arc<dyn ExchangeGateway> = Arc::new(BitgetClient::new(
        &cfg.bitget_api_key,
        &cfg.bitget_secret,
        &cfg.bitget_passphrase,
    ));
    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(
        &cfg.telegram_token,
        &cfg.telegram_chat_ids,
    ));

    // ── Scheduler ─────────────────────────────────────────────────────────────
    let scheduler = ScanScheduler::new(
        gateway,
        notifier,
        SignalEvaluator::new(symbols_file.signal.clone()),
        PositionTracker::new(cfg.block_policy, cfg.sweep_policy),
        symbols_file.symbols,
        SchedulerOptions::from(&cfg),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scan_task = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

    info!("Scan loop running. Waiting for shutdown signal.");
    tokio::signal::ctrl_c().await.unwrap();
    info!("Shutdown signal received. Stopping scan loop.");

    let _ = shutdown_tx.send(true);
    let _ = scan_task.await;
}
