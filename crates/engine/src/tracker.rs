use common::{BlockPolicy, ExchangeGateway, Result, SweepPolicy};
use tracing::warn;

/// Sweeps open positions before each scan and decides which symbols are
/// still eligible for a new entry.
pub struct PositionTracker {
    block_policy: BlockPolicy,
    sweep_policy: SweepPolicy,
}

impl PositionTracker {
    pub fn new(block_policy: BlockPolicy, sweep_policy: SweepPolicy) -> Self {
        Self {
            block_policy,
            sweep_policy,
        }
    }

    /// Returns the subset of `symbols` eligible for a new entry, in the
    /// original priority order.
    ///
    /// Under `BlockPolicy::Global` a single open position anywhere blocks
    /// every symbol. Under `SweepPolicy::FailClosed` a sweep error counts
    /// as an open position for that symbol.
    pub async fn tradable_symbols(
        &self,
        gateway: &dyn ExchangeGateway,
        symbols: &[String],
    ) -> Result<Vec<String>> {
        let mut tradable = Vec::with_capacity(symbols.len());
        let mut any_open = false;

        for symbol in symbols {
            let open = match gateway.fetch_positions(symbol).await {
                Ok(positions) => positions.iter().any(|p| p.is_open()),
                Err(err) => {
                    warn!(pair = %symbol, error = %err, "Position sweep failed");
                    match self.sweep_policy {
                        SweepPolicy::FailClosed => true,
                        SweepPolicy::FailOpen => false,
                    }
                }
            };
            if open {
                any_open = true;
            } else {
                tradable.push(symbol.clone());
            }
        }

        match self.block_policy {
            BlockPolicy::Global if any_open => Ok(Vec::new()),
            _ => Ok(tradable),
        }
    }
}
