//! Analysis configuration: indicator windows, signal thresholds, backtest capital.
//!
//! Every struct deserializes with defaults for missing fields, so a partial
//! TOML table is a valid configuration. `AnalysisConfig::validate` is the
//! single gate: nothing is computed from an unvalidated configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::signals::ReferencePriceMode;

pub const DEFAULT_K_PERIOD: usize = 8;
pub const DEFAULT_D_PERIOD: usize = 5;
pub const DEFAULT_SMOOTH_K: usize = 5;
pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_OVERSOLD: f64 = 25.0;
pub const DEFAULT_OVERBOUGHT: f64 = 75.0;
pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000_000.0;
pub const DEFAULT_MA_WINDOWS: [usize; 4] = [5, 20, 60, 120];

/// Indicator windows and signal thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    pub k_period: usize,
    pub d_period: usize,
    pub smooth_k: usize,
    pub rsi_period: usize,
    pub ma_windows: Vec<usize>,
    /// Buy-side threshold, within [0, 50].
    pub oversold: f64,
    /// Sell-side threshold, within [50, 100].
    pub overbought: f64,
    pub reference_price_mode: ReferencePriceMode,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            k_period: DEFAULT_K_PERIOD,
            d_period: DEFAULT_D_PERIOD,
            smooth_k: DEFAULT_SMOOTH_K,
            rsi_period: DEFAULT_RSI_PERIOD,
            ma_windows: DEFAULT_MA_WINDOWS.to_vec(),
            oversold: DEFAULT_OVERSOLD,
            overbought: DEFAULT_OVERBOUGHT,
            reference_price_mode: ReferencePriceMode::default(),
        }
    }
}

impl StrategyParams {
    /// Bars needed before %D can be defined.
    pub fn stochastic_warmup(&self) -> usize {
        self.k_period + self.smooth_k + self.d_period - 2
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let windows = [
            ("k_period", self.k_period),
            ("d_period", self.d_period),
            ("smooth_k", self.smooth_k),
            ("rsi_period", self.rsi_period),
        ];
        for (name, value) in windows {
            if value == 0 {
                return Err(ConfigError::NonPositiveWindow {
                    name: name.to_string(),
                    value,
                });
            }
        }
        if let Some(&value) = self.ma_windows.iter().find(|&&w| w == 0) {
            return Err(ConfigError::NonPositiveWindow {
                name: "ma_windows".to_string(),
                value,
            });
        }

        check_range("oversold", self.oversold, 0.0, 50.0)?;
        check_range("overbought", self.overbought, 50.0, 100.0)?;
        if self.oversold >= self.overbought {
            return Err(ConfigError::ThresholdOrder {
                oversold: self.oversold,
                overbought: self.overbought,
            });
        }
        Ok(())
    }
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ThresholdOutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

/// Backtest account settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestParams {
    pub initial_capital: f64,
}

impl Default for BacktestParams {
    fn default() -> Self {
        Self {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
        }
    }
}

impl BacktestParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capital.is_finite() && self.initial_capital > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidCapital(self.initial_capital))
        }
    }
}

/// Complete configuration of one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub strategy: StrategyParams,
    pub backtest: BacktestParams,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.strategy.validate()?;
        self.backtest.validate()
    }
}
