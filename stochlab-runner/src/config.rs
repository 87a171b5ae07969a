//! TOML run configuration.
//!
//! ```toml
//! [strategy]
//! k_period = 8
//! oversold = 20.0
//!
//! [backtest]
//! initial_capital = 5_000_000.0
//!
//! [data]
//! timeframe = "1wk"
//! data_dir = "prices"
//! ```
//!
//! Every table and field is optional. Values are validated on load.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stochlab_core::{AnalysisConfig, BacktestParams, ConfigError, StrategyParams};

use crate::timeframe::Timeframe;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ConfigError),
}

/// Where bars come from when the command line does not say.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub timeframe: Timeframe,
    /// Directory of `<SYMBOL>[_<interval>].csv` files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Use the deterministic synthetic source instead of files.
    pub synthetic: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub strategy: StrategyParams,
    pub backtest: BacktestParams,
    pub data: DataConfig,
}

impl RunConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigLoadError> {
        let config: RunConfig = toml::from_str(content)?;
        config.analysis_config().validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            strategy: self.strategy.clone(),
            backtest: self.backtest.clone(),
        }
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
