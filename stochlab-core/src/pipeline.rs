//! One analysis run: bars → indicators → signals → backtest.
//!
//! `Pipeline::new` is the only place configuration is checked. A built
//! pipeline holds no per-run state, so one instance can be shared across
//! threads and reused for any number of series.

use serde::{Deserialize, Serialize};
use tracing::debug_span;

use crate::backtest::{BacktestReport, BacktestSimulator};
use crate::config::AnalysisConfig;
use crate::domain::Bar;
use crate::error::ConfigError;
use crate::indicators::IndicatorFrame;
use crate::signals::{Signal, SignalDetector};

/// Output of one run over one price series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub frame: IndicatorFrame,
    pub signals: Vec<Signal>,
    pub backtest: BacktestReport,
}

impl Analysis {
    /// Signal on the most recent bar, if any.
    pub fn latest_signal(&self) -> Option<&Signal> {
        let last = self.frame.len().checked_sub(1)?;
        self.signals.last().filter(|s| s.index == last)
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    config: AnalysisConfig,
    detector: SignalDetector,
    simulator: BacktestSimulator,
}

impl Pipeline {
    pub fn new(config: AnalysisConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let detector = SignalDetector::from_params(&config.strategy);
        let simulator = BacktestSimulator::from_params(&config.backtest);
        Ok(Self {
            config,
            detector,
            simulator,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn run(&self, bars: &[Bar]) -> Analysis {
        let _span = debug_span!("analysis", bars = bars.len()).entered();

        let frame = IndicatorFrame::compute(bars, &self.config.strategy);
        let signals = self.detector.detect(bars, &frame);
        let backtest = self.simulator.run(bars, &signals);

        Analysis {
            frame,
            signals,
            backtest,
        }
    }
}
