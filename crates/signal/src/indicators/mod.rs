pub mod ema;
pub mod rsi;
