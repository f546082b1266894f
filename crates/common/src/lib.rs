pub mod config;
pub mod error;
pub mod gateway;
pub mod notifier;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use gateway::ExchangeGateway;
pub use notifier::Notifier;
pub use types::*;
