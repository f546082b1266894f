use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV interval fetched from the exchange. Windows are always
/// ordered oldest-first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Side of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

/// Direction of an open position as reported by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Flat,
    Long,
    Short,
}

/// Open exposure on one symbol. Re-fetched every scan cycle, never cached
/// across cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub symbol: String,
    pub side: PositionSide,
    /// Contract quantity. Zero means no exposure even if `side` is set.
    pub contracts: f64,
}

impl PositionSnapshot {
    pub fn is_open(&self) -> bool {
        self.side != PositionSide::Flat && self.contracts > 0.0
    }
}

/// Free and total balance for one currency.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AssetBalance {
    pub free: f64,
    pub total: f64,
}

/// Market metadata needed for sizing. Always fetched fresh — contract size
/// must never be cached across executions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub symbol: String,
    /// Minimum tradable unit multiplier for the contract.
    pub contract_size: f64,
}

/// A market order to be submitted to the exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub client_order_id: String,
    pub symbol: String,
    pub side: OrderSide,
    /// Quantity in contracts.
    pub contracts: f64,
    /// Optional take-profit trigger attached to the entry.
    pub take_profit: Option<f64>,
}

impl OrderRequest {
    /// Market short entry, optionally with a take-profit attached.
    pub fn market_short(symbol: impl Into<String>, contracts: f64, take_profit: Option<f64>) -> Self {
        Self {
            client_order_id: uuid::Uuid::new_v4().to_string(),
            symbol: symbol.into(),
            side: OrderSide::Sell,
            contracts,
            take_profit,
        }
    }
}

/// Acknowledgement returned by the exchange for a submitted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAck {
    pub order_id: String,
    pub client_order_id: String,
}

/// Computed order parameters, shared by real and simulated entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sizing {
    pub symbol: String,
    /// Entry price (latest close at evaluation time).
    pub price: f64,
    pub contracts: f64,
    /// Margin committed, in quote currency, before leverage.
    pub notional: f64,
    pub leverage: u32,
    pub take_profit: f64,
}

/// Outcome of the sizing/execution step for one fired signal. Consumed
/// immediately by the notification path.
#[derive(Debug, Clone)]
pub enum ExecutionDecision {
    /// A real order was submitted.
    Executed { order_id: String, sizing: Sizing },
    /// Free balance was below the target notional; no order was sent.
    Simulated { sizing: Sizing },
    /// Entry abandoned before sizing completed.
    Skipped { symbol: String, reason: String },
}

impl ExecutionDecision {
    /// Operator-facing message describing the outcome.
    pub fn notification_text(&self) -> String {
        match self {
            ExecutionDecision::Executed { order_id, sizing } => format!(
                "🚨 SHORT OPENED\n\
                 Pair: {}\n\
                 Price: ${:.4}\n\
                 Margin: ${:.2}, x{}\n\
                 Take-profit: ${:.4}\n\
                 Order: {}",
                sizing.symbol, sizing.price, sizing.notional, sizing.leverage, sizing.take_profit, order_id,
            ),
            ExecutionDecision::Simulated { sizing } => format!(
                "📝 SHORT SIMULATED — insufficient balance\n\
                 Pair: {}\n\
                 Price: ${:.4}\n\
                 Margin: ${:.2}, x{}\n\
                 Take-profit: ${:.4}",
                sizing.symbol, sizing.price, sizing.notional, sizing.leverage, sizing.take_profit,
            ),
            ExecutionDecision::Skipped { symbol, reason } => {
                format!("⛔ Entry skipped on {symbol}: {reason}")
            }
        }
    }
}

/// What an open position on one symbol blocks.
///
/// `Global`: any open position anywhere blocks the entire scan cycle.
/// `PerSymbol`: only the symbol holding the position is excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockPolicy {
    Global,
    PerSymbol,
}

/// How a failed position fetch during the sweep is treated.
///
/// `FailClosed` excludes the symbol for the cycle (its state is unknown);
/// `FailOpen` keeps it tradable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SweepPolicy {
    FailClosed,
    FailOpen,
}
