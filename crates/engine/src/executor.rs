use std::sync::Arc;

use tracing::{info, warn};

use common::{ExchangeGateway, ExecutionDecision, OrderRequest, Result, Sizing};
use signal::SymbolConfig;

/// Take profit sits 3% below the short entry price.
const TAKE_PROFIT_RATIO: f64 = 0.97;

/// Sizes and submits market-short entries, falling back to a simulated
/// entry when the account cannot cover the configured notional.
pub struct OrderExecutor {
    gateway: Arc<dyn ExchangeGateway>,
}

impl OrderExecutor {
    pub fn new(gateway: Arc<dyn ExchangeGateway>) -> Self {
        Self { gateway }
    }

    pub async fn execute(&self, cfg: &SymbolConfig, price: f64) -> Result<ExecutionDecision> {
        if !price.is_finite() || price <= 0.0 {
            return Ok(ExecutionDecision::Skipped {
                symbol: cfg.symbol.clone(),
                reason: format!("unusable entry price {price}"),
            });
        }

        self.gateway.set_leverage(cfg.leverage, &cfg.symbol).await?;

        let markets = self.gateway.load_markets().await?;
        let contract_size = match markets.get(&cfg.symbol) {
            Some(market) if market.contract_size > 0.0 => market.contract_size,
            Some(market) => {
                return Ok(ExecutionDecision::Skipped {
                    symbol: cfg.symbol.clone(),
                    reason: format!("bad contract size {}", market.contract_size),
                });
            }
            None => {
                return Ok(ExecutionDecision::Skipped {
                    symbol: cfg.symbol.clone(),
                    reason: "symbol missing from exchange markets".into(),
                });
            }
        };

        let contracts = cfg.notional / price * f64::from(cfg.leverage) / contract_size;
        if !contracts.is_finite() || contracts <= 0.0 {
            return Ok(ExecutionDecision::Skipped {
                symbol: cfg.symbol.clone(),
                reason: format!("computed order size {contracts}"),
            });
        }

        let take_profit = price * TAKE_PROFIT_RATIO;
        let sizing = Sizing {
            symbol: cfg.symbol.clone(),
            price,
            contracts,
            notional: cfg.notional,
            leverage: cfg.leverage,
            take_profit,
        };

        let balances = self.gateway.fetch_balance().await?;
        let free_usdt = balances.get("USDT").map(|b| b.free).unwrap_or(0.0);
        if free_usdt < cfg.notional {
            warn!(
                pair = %cfg.symbol,
                free = free_usdt,
                needed = cfg.notional,
                "Insufficient margin, simulating entry"
            );
            return Ok(ExecutionDecision::Simulated { sizing });
        }

        let order = OrderRequest::market_short(&cfg.symbol, contracts, Some(take_profit));
        let ack = self.gateway.submit_order(&order).await?;
        info!(
            pair = %cfg.symbol,
            order_id = %ack.order_id,
            contracts = contracts,
            take_profit = take_profit,
            "Short entry placed"
        );
        Ok(ExecutionDecision::Executed {
            order_id: ack.order_id,
            sizing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockGateway;
    use common::OrderSide;

    fn cfg(symbol: &str, leverage: u32, notional: f64) -> SymbolConfig {
        SymbolConfig {
            symbol: symbol.to_string(),
            leverage,
            notional,
        }
    }

    #[tokio::test]
    async fn executed_entry_sizes_contracts_and_sets_take_profit() {
        let gateway = Arc::new(
            MockGateway::new()
                .with_market("BTCUSDT", 0.1)
                .with_balance("USDT", 500.0),
        );
        let executor = OrderExecutor::new(gateway.clone());

        let decision = executor.execute(&cfg("BTCUSDT", 10, 100.0), 50.0).await.unwrap();
        match decision {
            ExecutionDecision::Executed { sizing, .. } => {
                // 100 / 50 * 10 / 0.1
                assert!((sizing.contracts - 200.0).abs() < 1e-9);
                assert!((sizing.take_profit - 48.5).abs() < 1e-9);
            }
            other => panic!("expected Executed, got {other:?}"),
        }

        let submitted = gateway.submitted_orders();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].side, OrderSide::Sell);
        assert_eq!(submitted[0].take_profit, Some(48.5));
        assert_eq!(gateway.leverage_calls.lock().unwrap().as_slice(), &[(10, "BTCUSDT".to_string())]);
    }

    #[tokio::test]
    async fn low_balance_simulates_without_submitting() {
        let gateway = Arc::new(
            MockGateway::new()
                .with_market("ETHUSDT", 1.0)
                .with_balance("USDT", 40.0),
        );
        let executor = OrderExecutor::new(gateway.clone());

        let decision = executor.execute(&cfg("ETHUSDT", 5, 100.0), 2_000.0).await.unwrap();
        match decision {
            ExecutionDecision::Simulated { sizing } => {
                assert!((sizing.contracts - 0.25).abs() < 1e-9);
            }
            other => panic!("expected Simulated, got {other:?}"),
        }
        assert!(gateway.submitted_orders().is_empty());
    }

    #[tokio::test]
    async fn missing_usdt_balance_counts_as_zero() {
        let gateway = Arc::new(MockGateway::new().with_market("ETHUSDT", 1.0));
        let executor = OrderExecutor::new(gateway.clone());

        let decision = executor.execute(&cfg("ETHUSDT", 5, 100.0), 2_000.0).await.unwrap();
        assert!(matches!(decision, ExecutionDecision::Simulated { .. }));
        assert!(gateway.submitted_orders().is_empty());
    }

    #[tokio::test]
    async fn nonpositive_price_is_skipped_before_any_exchange_call() {
        let gateway = Arc::new(MockGateway::new());
        let executor = OrderExecutor::new(gateway.clone());

        let decision = executor.execute(&cfg("BTCUSDT", 10, 100.0), 0.0).await.unwrap();
        assert!(matches!(decision, ExecutionDecision::Skipped { .. }));
        assert!(gateway.leverage_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_market_is_skipped() {
        let gateway = Arc::new(MockGateway::new().with_balance("USDT", 500.0));
        let executor = OrderExecutor::new(gateway.clone());

        let decision = executor.execute(&cfg("DOGEUSDT", 10, 100.0), 0.1).await.unwrap();
        match decision {
            ExecutionDecision::Skipped { reason, .. } => {
                assert!(reason.contains("missing"));
            }
            other => panic!("expected Skipped, got {other:?}"),
        }
        assert!(gateway.submitted_orders().is_empty());
    }
}
