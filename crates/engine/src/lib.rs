pub mod bitget;
pub mod executor;
pub mod scheduler;
pub mod tracker;

pub use bitget::BitgetClient;
pub use executor::OrderExecutor;
pub use scheduler::{CycleOutcome, ScanScheduler, SchedulerOptions};
pub use tracker::PositionTracker;

#[cfg(test)]
pub(crate) mod testutil;
