//! Configuration errors.
//!
//! Only malformed configuration is rejected. Numeric edge cases inside the
//! engine (short history, flat windows, empty series) resolve to undefined
//! values or neutral statistics and never surface here.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be a positive window length, got {value}")]
    NonPositiveWindow { name: String, value: usize },

    #[error("{name} must be within [{min}, {max}], got {value}")]
    ThresholdOutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("oversold ({oversold}) must be strictly below overbought ({overbought})")]
    ThresholdOrder { oversold: f64, overbought: f64 },

    #[error("initial capital must be a positive finite amount, got {0}")]
    InvalidCapital(f64),
}
