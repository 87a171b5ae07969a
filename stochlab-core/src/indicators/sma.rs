//! Simple Moving Average (SMA).
//!
//! Arithmetic mean of close prices over the trailing window, current bar included.
//! Lookback: period - 1 (first valid value at index period-1).

use super::{rolling_mean, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let closes: Vec<Option<f64>> = bars.iter().map(|b| Some(b.close)).collect();
        rolling_mean(&closes, self.period)
    }
}
