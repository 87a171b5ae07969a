//! Single-instrument, single-position backtest.
//!
//! The simulator replays bars and signals in time order against one cash
//! account that is either flat or fully invested, then derives summary
//! statistics from the trade list and the mark-to-market equity curve.

pub mod simulator;
pub mod stats;

pub use simulator::{BacktestReport, BacktestSimulator};
pub use stats::BacktestResult;
