//! Relative Strength Index (RSI).
//!
//! Average gain and average loss are simple rolling means of the
//! close-to-close deltas over `period` bars (not exponential smoothing).
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period (the first bar has no delta).
//! Edge cases: avg_loss == 0 with avg_gain > 0 → 100; both zero → undefined.

use super::{rolling_mean, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let n = bars.len();
        let mut gains = vec![None; n];
        let mut losses = vec![None; n];
        for i in 1..n {
            let change = bars[i].close - bars[i - 1].close;
            if change.is_finite() {
                gains[i] = Some(change.max(0.0));
                losses[i] = Some((-change).max(0.0));
            }
        }

        let avg_gain = rolling_mean(&gains, self.period);
        let avg_loss = rolling_mean(&losses, self.period);

        avg_gain
            .into_iter()
            .zip(avg_loss)
            .map(|(g, l)| match (g, l) {
                (Some(g), Some(l)) => compute_rsi(g, l),
                _ => None,
            })
            .collect()
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        None // no movement
    } else if avg_loss == 0.0 {
        Some(100.0)
    } else {
        Some(100.0 - 100.0 / (1.0 + avg_gain / avg_loss))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    #[test]
    fn rsi_all_gains() {
        let bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = Rsi::new(3).compute(&bars);
        assert!(result[2].is_none());
        assert_approx(result[3], 100.0, 1e-9);
        assert_approx(result[5], 100.0, 1e-9);
    }

    #[test]
    fn rsi_all_losses() {
        let bars = make_bars(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let result = Rsi::new(3).compute(&bars);
        assert_approx(result[3], 0.0, 1e-9);
    }

    #[test]
    fn rsi_flat_is_undefined() {
        let bars = make_bars(&[100.0; 30]);
        assert!(Rsi::new(14).compute(&bars).iter().all(Option::is_none));
    }

    #[test]
    fn rsi_mixed() {
        // Changes: +0.34, -0.25, -0.48, +0.72
        // RSI[3]: gains 0.34, losses 0.73 → 100 * 0.34 / 1.07 = 31.7757...
        // RSI[4]: gains 0.72, losses 0.73 → 100 * 0.72 / 1.45 = 49.6551...
        let bars = make_bars(&[44.0, 44.34, 44.09, 43.61, 44.33]);
        let result = Rsi::new(3).compute(&bars);

        assert!(result[0].is_none());
        assert!(result[1].is_none());
        assert!(result[2].is_none());
        assert_approx(result[3], 100.0 * 0.34 / 1.07, 1e-9);
        assert_approx(result[4], 100.0 * 0.72 / 1.45, 1e-9);
    }

    #[test]
    fn rsi_bounds() {
        let bars = make_bars(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        let result = Rsi::new(3).compute(&bars);
        for (i, v) in result.iter().enumerate() {
            if let Some(v) = v {
                assert!((0.0..=100.0).contains(v), "RSI out of bounds at bar {i}: {v}");
            }
        }
    }

    #[test]
    fn rsi_nan_close_is_undefined_not_fatal() {
        let mut bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0, 107.0]);
        bars[2].close = f64::NAN;
        let result = Rsi::new(3).compute(&bars);
        // deltas 2 and 3 touch the NaN close; windows covering them are undefined
        assert!(result[3].is_none());
        assert!(result[5].is_none());
        assert_approx(result[6], 100.0, 1e-9);
    }

    #[test]
    fn rsi_lookback() {
        assert_eq!(Rsi::new(14).lookback(), 14);
        assert_eq!(Rsi::new(14).name(), "rsi_14");
    }
}
