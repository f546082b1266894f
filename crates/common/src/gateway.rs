use std::collections::HashMap;

use async_trait::async_trait;

use crate::{AssetBalance, Candle, Market, OrderAck, OrderRequest, PositionSnapshot, Result};

/// Abstraction over the exchange connection.
///
/// `BitgetClient` in `crates/engine` implements this for live trading;
/// tests use scripted in-memory implementations. The `OrderExecutor` is the
/// only component that calls `submit_order`.
#[async_trait]
pub trait ExchangeGateway: Send + Sync {
    /// Fetch the most recent candle window for a symbol, oldest first.
    async fn fetch_candles(&self, symbol: &str, timeframe: &str, limit: usize)
        -> Result<Vec<Candle>>;

    /// Query open positions on one symbol.
    async fn fetch_positions(&self, symbol: &str) -> Result<Vec<PositionSnapshot>>;

    /// Account balances keyed by currency.
    async fn fetch_balance(&self) -> Result<HashMap<String, AssetBalance>>;

    /// Set the leverage used for subsequent orders on a symbol.
    async fn set_leverage(&self, leverage: u32, symbol: &str) -> Result<()>;

    /// Market metadata keyed by symbol. Called fresh before every sizing so
    /// contract-size drift on the exchange side is picked up.
    async fn load_markets(&self) -> Result<HashMap<String, Market>>;

    /// Submit an order and return the exchange acknowledgement.
    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderAck>;
}
