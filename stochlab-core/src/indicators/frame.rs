//! IndicatorFrame: every derived series for one price series, index-aligned.
//!
//! Built once per run, then read by the signal detector and by external
//! renderers. Moving averages are keyed by window length (BTreeMap for a
//! deterministic serialization order).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::stochastic::stochastic;
use super::{Indicator, Rsi, Sma};
use crate::config::StrategyParams;
use crate::domain::Bar;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorFrame {
    pub moving_averages: BTreeMap<usize, Vec<Option<f64>>>,
    pub k: Vec<Option<f64>>,
    pub d: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
}

/// All indicator values at a single bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub moving_averages: BTreeMap<usize, Option<f64>>,
    pub k: Option<f64>,
    pub d: Option<f64>,
    pub rsi: Option<f64>,
}

impl IndicatorFrame {
    /// Compute the frame for `bars`. Window parameters must already be validated.
    pub fn compute(bars: &[Bar], params: &StrategyParams) -> Self {
        let moving_averages = params
            .ma_windows
            .iter()
            .map(|&window| (window, Sma::new(window).compute(bars)))
            .collect();
        let lines = stochastic(bars, params.k_period, params.d_period, params.smooth_k);
        let rsi = Rsi::new(params.rsi_period).compute(bars);

        Self {
            moving_averages,
            k: lines.k,
            d: lines.d,
            rsi,
        }
    }

    /// Number of bars the frame is aligned with.
    pub fn len(&self) -> usize {
        self.k.len()
    }

    pub fn is_empty(&self) -> bool {
        self.k.is_empty()
    }

    /// Moving average series for a configured window.
    pub fn ma(&self, window: usize) -> Option<&[Option<f64>]> {
        self.moving_averages.get(&window).map(Vec::as_slice)
    }

    /// Snapshot of every line at `index`, or `None` past the end of the frame.
    pub fn value_at(&self, index: usize) -> Option<IndicatorPoint> {
        if index >= self.len() {
            return None;
        }
        Some(IndicatorPoint {
            moving_averages: self
                .moving_averages
                .iter()
                .map(|(&w, series)| (w, series[index]))
                .collect(),
            k: self.k[index],
            d: self.d[index],
            rsi: self.rsi[index],
        })
    }

    /// Snapshot of the most recent bar.
    pub fn last(&self) -> Option<IndicatorPoint> {
        self.len().checked_sub(1).and_then(|i| self.value_at(i))
    }
}
