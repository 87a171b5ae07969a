//! Slow stochastic oscillator (%K / %D).
//!
//! raw %K[t] = 100 * (close[t] - lowest_low) / (highest_high - lowest_low)
//! over the trailing `k_period` bars. %K is the `smooth_k` SMA of raw %K and
//! %D is the `d_period` SMA of %K.
//!
//! A window whose high-low range is zero has no defined raw %K: the flat
//! window propagates as `None` through both lines instead of dividing by zero.
//!
//! Produces two series (exposed as separate Indicator instances):
//! - K: lookback k_period + smooth_k - 2
//! - D: lookback k_period + smooth_k + d_period - 3

use serde::{Deserialize, Serialize};

use super::{rolling_mean, Indicator};
use crate::domain::Bar;

/// Which line of the oscillator to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StochasticLine {
    K,
    D,
}

/// Both oscillator lines, aligned index-for-index with the input bars.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StochasticLines {
    pub k: Vec<Option<f64>>,
    pub d: Vec<Option<f64>>,
}

#[derive(Debug, Clone)]
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
    smooth_k: usize,
    line: StochasticLine,
    name: String,
}

impl Stochastic {
    pub fn k(k_period: usize, d_period: usize, smooth_k: usize) -> Self {
        Self::with_line(k_period, d_period, smooth_k, StochasticLine::K)
    }

    pub fn d(k_period: usize, d_period: usize, smooth_k: usize) -> Self {
        Self::with_line(k_period, d_period, smooth_k, StochasticLine::D)
    }

    fn with_line(k_period: usize, d_period: usize, smooth_k: usize, line: StochasticLine) -> Self {
        assert!(k_period >= 1, "stochastic k_period must be >= 1");
        assert!(d_period >= 1, "stochastic d_period must be >= 1");
        assert!(smooth_k >= 1, "stochastic smooth_k must be >= 1");
        let tag = match line {
            StochasticLine::K => "k",
            StochasticLine::D => "d",
        };
        Self {
            k_period,
            d_period,
            smooth_k,
            line,
            name: format!("stoch_{tag}_{k_period}_{d_period}_{smooth_k}"),
        }
    }

    pub fn line(&self) -> StochasticLine {
        self.line
    }

    /// Compute both lines at once.
    pub fn lines(&self, bars: &[Bar]) -> StochasticLines {
        stochastic(bars, self.k_period, self.d_period, self.smooth_k)
    }
}

impl Indicator for Stochastic {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        let k_lookback = self.k_period + self.smooth_k - 2;
        match self.line {
            StochasticLine::K => k_lookback,
            StochasticLine::D => k_lookback + self.d_period - 1,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let lines = self.lines(bars);
        match self.line {
            StochasticLine::K => lines.k,
            StochasticLine::D => lines.d,
        }
    }
}

/// Compute slow %K and %D for the whole series.
pub fn stochastic(
    bars: &[Bar],
    k_period: usize,
    d_period: usize,
    smooth_k: usize,
) -> StochasticLines {
    let raw = raw_k(bars, k_period);
    let k = rolling_mean(&raw, smooth_k);
    let d = rolling_mean(&k, d_period);
    StochasticLines { k, d }
}

/// Fast (unsmoothed) %K, clamped to [0, 100].
fn raw_k(bars: &[Bar], k_period: usize) -> Vec<Option<f64>> {
    let n = bars.len();
    let mut result = vec![None; n];
    if k_period == 0 || n < k_period {
        return result;
    }

    for i in (k_period - 1)..n {
        let window = &bars[(i + 1 - k_period)..=i];
        let mut highest = f64::NEG_INFINITY;
        let mut lowest = f64::INFINITY;
        let mut finite = true;
        for bar in window {
            if !bar.high.is_finite() || !bar.low.is_finite() {
                finite = false;
                break;
            }
            highest = highest.max(bar.high);
            lowest = lowest.min(bar.low);
        }

        let close = bars[i].close;
        let range = highest - lowest;
        if !finite || !close.is_finite() || range <= 0.0 {
            continue;
        }

        result[i] = Some((100.0 * (close - lowest) / range).clamp(0.0, 100.0));
    }

    result
}
