pub mod config;
pub mod evaluator;
pub mod indicators;

pub use config::{SymbolConfig, SymbolsFileConfig};
pub use evaluator::{Evaluation, SignalEvaluator, SignalMetrics, SignalParams};
