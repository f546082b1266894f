use serde::{Deserialize, Serialize};

use crate::SignalParams;

/// Top-level symbols config file (TOML).
///
/// Example `config/symbols.toml`:
/// ```toml
/// [[symbol]]
/// symbol = "SOLUSDT"
/// leverage = 20
/// notional = 1.0
///
/// [signal]
/// rsi_overbought = 80.0
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SymbolsFileConfig {
    /// Symbols in scan-priority order: when several fire in one cycle, the
    /// earliest entry wins.
    #[serde(rename = "symbol")]
    pub symbols: Vec<SymbolConfig>,
    /// Optional signal-threshold overrides.
    #[serde(default)]
    pub signal: SignalParams,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SymbolConfig {
    /// Perpetual-swap symbol, e.g. "SOLUSDT".
    pub symbol: String,
    /// Leverage applied before entry.
    pub leverage: u32,
    /// Margin committed per trade, in quote currency.
    pub notional: f64,
}

impl SymbolsFileConfig {
    /// Load from a TOML file. Exits process on error.
    pub fn load(path: &str) -> Self {
        let content = std::fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read symbols config at '{path}': {e}"));
        let cfg: Self = toml::from_str(&content)
            .unwrap_or_else(|e| panic!("Failed to parse symbols config at '{path}': {e}"));
        for s in &cfg.symbols {
            if s.leverage < 1 {
                panic!("Symbol '{}' has leverage 0; must be >= 1", s.symbol);
            }
            if s.notional <= 0.0 {
                panic!("Symbol '{}' has non-positive notional", s.symbol);
            }
        }
        cfg
    }
}
