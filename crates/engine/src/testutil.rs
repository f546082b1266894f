//! Scripted gateway and notifier doubles for engine tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use common::{
    AssetBalance, Candle, Error, ExchangeGateway, Market, Notifier, OrderAck, OrderRequest,
    PositionSnapshot, Result,
};

/// In-memory gateway with scripted responses. Submitted orders and
/// leverage calls are recorded for assertions.
#[derive(Default)]
pub struct MockGateway {
    candles: HashMap<String, Vec<Candle>>,
    positions: HashMap<String, Vec<PositionSnapshot>>,
    balances: HashMap<String, AssetBalance>,
    markets: HashMap<String, Market>,
    position_errors: HashSet<String>,
    pub submitted: Mutex<Vec<OrderRequest>>,
    pub leverage_calls: Mutex<Vec<(u32, String)>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candles(mut self, symbol: &str, candles: Vec<Candle>) -> Self {
        self.candles.insert(symbol.to_string(), candles);
        self
    }

    pub fn with_position(mut self, snapshot: PositionSnapshot) -> Self {
        self.positions
            .entry(snapshot.symbol.clone())
            .or_default()
            .push(snapshot);
        self
    }

    pub fn with_balance(mut self, coin: &str, free: f64) -> Self {
        self.balances
            .insert(coin.to_string(), AssetBalance { free, total: free });
        self
    }

    pub fn with_market(mut self, symbol: &str, contract_size: f64) -> Self {
        self.markets.insert(
            symbol.to_string(),
            Market {
                symbol: symbol.to_string(),
                contract_size,
            },
        );
        self
    }

    /// Make `fetch_positions` fail for one symbol.
    pub fn with_position_error(mut self, symbol: &str) -> Self {
        self.position_errors.insert(symbol.to_string());
        self
    }

    pub fn submitted_orders(&self) -> Vec<OrderRequest> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExchangeGateway for MockGateway {
    async fn fetch_candles(
        &self,
        symbol: &str,
        _timeframe: &str,
        _limit: usize,
    ) -> Result<Vec<Candle>> {
        self.candles
            .get(symbol)
            .cloned()
            .ok_or_else(|| Error::Exchange(format!("no candles scripted for {symbol}")))
    }

    async fn fetch_positions(&self, symbol: &str) -> Result<Vec<PositionSnapshot>> {
        if self.position_errors.contains(symbol) {
            return Err(Error::Exchange(format!("scripted failure for {symbol}")));
        }
        Ok(self.positions.get(symbol).cloned().unwrap_or_default())
    }

    async fn fetch_balance(&self) -> Result<HashMap<String, AssetBalance>> {
        Ok(self.balances.clone())
    }

    async fn set_leverage(&self, leverage: u32, symbol: &str) -> Result<()> {
        self.leverage_calls
            .lock()
            .unwrap()
            .push((leverage, symbol.to_string()));
        Ok(())
    }

    async fn load_markets(&self) -> Result<HashMap<String, Market>> {
        Ok(self.markets.clone())
    }

    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderAck> {
        self.submitted.lock().unwrap().push(order.clone());
        Ok(OrderAck {
            order_id: format!("mock-{}", self.submitted.lock().unwrap().len()),
            client_order_id: order.client_order_id.clone(),
        })
    }
}

/// A 20-bar window that satisfies every factor of the pump-fade predicate
/// when evaluated with a two-bar RSI.
pub fn firing_window() -> Vec<Candle> {
    let closes = [
        250.0, 250.0, 250.0, 250.0, 250.0, 250.0, 250.0, 250.0, 175.0, 100.0, 100.0, 100.0,
        100.0, 100.0, 100.0, 104.0, 108.0, 111.0, 113.4, 113.3,
    ];
    let mut volumes = [10.0; 20];
    volumes[19] = 35.0;
    let mut candles = window_from(&closes, &volumes);
    candles[19].high = 114.9;
    candles[19].low = 112.9;
    candles[19].open = 113.4;
    candles
}

/// A 20-bar window with no price movement at all.
pub fn flat_window() -> Vec<Candle> {
    window_from(&[100.0; 20], &[10.0; 20])
}

fn window_from(closes: &[f64], volumes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .zip(volumes)
        .map(|(&close, &volume)| Candle {
            timestamp: chrono::Utc::now(),
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume,
        })
        .collect()
}

/// Notifier that records every message it is asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
