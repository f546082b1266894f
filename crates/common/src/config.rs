use std::time::Duration;

use crate::{BlockPolicy, SweepPolicy};

/// All process configuration loaded from environment variables at startup.
/// Missing required variables cause an immediate panic with a clear message.
/// Per-symbol and signal parameters live in the TOML file at
/// `symbols_config_path` (see `signal::SymbolsFileConfig`).
#[derive(Debug, Clone)]
pub struct Config {
    // Exchange credentials
    pub bitget_api_key: String,
    pub bitget_secret: String,
    pub bitget_passphrase: String,

    // Telegram
    pub telegram_token: String,
    pub telegram_chat_ids: Vec<i64>,

    // Scan loop
    pub timeframe: String,
    pub candle_limit: usize,
    pub cooldown: Duration,
    pub scan_interval: Duration,
    pub idle_delay: Duration,
    pub error_backoff: Duration,

    // Position policies
    pub block_policy: BlockPolicy,
    pub sweep_policy: SweepPolicy,

    // Symbol config file path
    pub symbols_config_path: String,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Panics on any missing required variable.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let telegram_chat_ids = required_env("TELEGRAM_CHAT_IDS")
            .split(',')
            .map(|s| {
                s.trim().parse::<i64>().unwrap_or_else(|_| {
                    panic!("TELEGRAM_CHAT_IDS contains non-numeric ID: '{}'", s.trim())
                })
            })
            .collect();

        let block_policy = match optional_env("BLOCK_POLICY").as_deref() {
            None | Some("global") => BlockPolicy::Global,
            Some("per-symbol") => BlockPolicy::PerSymbol,
            Some(other) => {
                panic!("BLOCK_POLICY must be 'global' or 'per-symbol', got: '{other}'")
            }
        };

        let sweep_policy = match optional_env("SWEEP_POLICY").as_deref() {
            None | Some("fail-closed") => SweepPolicy::FailClosed,
            Some("fail-open") => SweepPolicy::FailOpen,
            Some(other) => {
                panic!("SWEEP_POLICY must be 'fail-closed' or 'fail-open', got: '{other}'")
            }
        };

        Config {
            bitget_api_key: required_env("BITGET_API_KEY"),
            bitget_secret: required_env("BITGET_SECRET"),
            bitget_passphrase: required_env("BITGET_PASSPHRASE"),
            telegram_token: required_env("TELEGRAM_TOKEN"),
            telegram_chat_ids,
            timeframe: optional_env("TIMEFRAME").unwrap_or_else(|| "3m".to_string()),
            candle_limit: usize_env("CANDLE_LIMIT", 20),
            cooldown: secs_env("COOLDOWN_SECS", 300),
            scan_interval: secs_env("SCAN_INTERVAL_SECS", 10),
            idle_delay: secs_env("IDLE_DELAY_SECS", 60),
            error_backoff: secs_env("ERROR_BACKOFF_SECS", 10),
            block_policy,
            sweep_policy,
            symbols_config_path: optional_env("SYMBOLS_CONFIG_PATH")
                .unwrap_or_else(|| "config/symbols.toml".to_string()),
        }
    }
}

fn required_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        panic!("Required environment variable '{key}' is not set. Check your .env file.")
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn secs_env(key: &str, default: u64) -> Duration {
    Duration::from_secs(
        optional_env(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default),
    )
}

fn usize_env(key: &str, default: usize) -> usize {
    optional_env(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
