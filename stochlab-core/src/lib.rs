//! StochLab Core: indicators, crossover signals and the single-position backtest.
//!
//! This crate is the analysis engine:
//! - Domain types (bars, trades)
//! - Indicator engine (SMA, slow stochastic %K/%D, RSI) with first-class undefined values
//! - Signal detector (stochastic crossovers with StrongBuy / Buy / Sell tiers)
//! - Backtest simulator (one cash account, one position, mark-to-market equity)
//! - Configuration validation and run fingerprints
//!
//! Everything here is a pure function of its inputs: no I/O, no clocks, no
//! randomness, no shared state between runs.

pub mod backtest;
pub mod config;
pub mod domain;
pub mod error;
pub mod fingerprint;
pub mod indicators;
pub mod pipeline;
pub mod signals;

pub use backtest::{BacktestReport, BacktestResult, BacktestSimulator};
pub use config::{AnalysisConfig, BacktestParams, StrategyParams};
pub use domain::{Bar, Trade, TradeKind};
pub use error::ConfigError;
pub use fingerprint::RunFingerprint;
pub use indicators::{Indicator, IndicatorFrame};
pub use pipeline::{Analysis, Pipeline};
pub use signals::{ReferencePriceMode, Signal, SignalDetector, SignalKind};
