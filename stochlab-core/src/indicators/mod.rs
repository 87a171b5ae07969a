//! Indicator engine: rolling-window series derived from a price series.
//!
//! Every indicator maps `&[Bar]` to a `Vec<Option<f64>>` of the same length.
//! `None` means "not yet available": too little history, a degenerate
//! window, or non-finite inputs inside the window. Undefined values are
//! never reported as zero.

pub mod frame;
pub mod rsi;
pub mod sma;
pub mod stochastic;

pub use frame::{IndicatorFrame, IndicatorPoint};
pub use rsi::Rsi;
pub use sma::Sma;
pub use stochastic::{Stochastic, StochasticLine, StochasticLines};

use crate::domain::Bar;

/// Trait for indicators.
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "rsi_14").
    fn name(&self) -> &str;

    /// Index of the first bar that can carry a defined value.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    ///
    /// Returns a vector of the same length as `bars`; indices below
    /// `lookback()` are always `None`.
    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>>;
}

/// Trailing simple mean over `window` values, inclusive of the current one.
///
/// Defined only when every value in the window is present and finite.
pub(crate) fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut result = vec![None; n];
    if window == 0 || n < window {
        return result;
    }

    for i in (window - 1)..n {
        let mut sum = 0.0;
        let mut complete = true;
        for v in &values[(i + 1 - window)..=i] {
            match v {
                Some(x) if x.is_finite() => sum += x,
                _ => {
                    complete = false;
                    break;
                }
            }
        }
        if complete {
            result[i] = Some(sum / window as f64);
        }
    }

    result
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar::new(
                base + chrono::Duration::days(i as i64),
                open,
                open.max(close) + 1.0,
                open.min(close) - 1.0,
                close,
                1000.0,
            )
        })
        .collect()
}

/// Assert an indicator value is defined and approximately equal to `expected`.
#[cfg(test)]
pub fn assert_approx(actual: Option<f64>, expected: f64, epsilon: f64) {
    let actual = actual.unwrap_or_else(|| panic!("expected {expected}, got undefined"));
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
