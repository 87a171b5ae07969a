//! Stochastic crossover detector.
//!
//! A bullish cross at bar i (i >= 1) is `%K[i-1] < %D[i-1]` and `%K[i] > %D[i]`;
//! the bearish cross mirrors it. Equal values never count as a cross.
//!
//! Classification, first match wins:
//! 1. StrongBuy: bullish cross, %K <= oversold and %D <= oversold
//! 2. Buy:       bullish cross, %K <= oversold
//! 3. Sell:      bearish cross, %K >= overbought

use tracing::debug;

use super::{
    ReferencePriceMode, Signal, SignalKind, BUY_REFERENCE_FACTOR, SELL_REFERENCE_FACTOR,
};
use crate::config::StrategyParams;
use crate::domain::Bar;
use crate::indicators::IndicatorFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossover {
    /// Golden cross: %K moves above %D.
    Bullish,
    /// Dead cross: %K moves below %D.
    Bearish,
}

/// Strict crossover between two consecutive (%K, %D) observations.
pub fn crossover(k_prev: f64, d_prev: f64, k: f64, d: f64) -> Option<Crossover> {
    if k_prev < d_prev && k > d {
        Some(Crossover::Bullish)
    } else if k_prev > d_prev && k < d {
        Some(Crossover::Bearish)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalDetector {
    pub oversold: f64,
    pub overbought: f64,
    pub mode: ReferencePriceMode,
}

impl SignalDetector {
    pub fn new(oversold: f64, overbought: f64, mode: ReferencePriceMode) -> Self {
        Self {
            oversold,
            overbought,
            mode,
        }
    }

    pub fn from_params(params: &StrategyParams) -> Self {
        Self::new(params.oversold, params.overbought, params.reference_price_mode)
    }

    /// Scan the whole series and return every signal in index order.
    pub fn detect(&self, bars: &[Bar], frame: &IndicatorFrame) -> Vec<Signal> {
        let signals: Vec<Signal> = (1..bars.len())
            .filter_map(|i| self.evaluate(bars, i, &frame.k, &frame.d))
            .collect();
        debug!(
            bars = bars.len(),
            signals = signals.len(),
            "stochastic crossover scan complete"
        );
        signals
    }

    /// Classify bar `index`, given %K and %D series aligned with `bars`.
    ///
    /// Returns `None` at index 0, past the end of any input, or when any of the
    /// four %K/%D values involved is undefined.
    pub fn evaluate(
        &self,
        bars: &[Bar],
        index: usize,
        k: &[Option<f64>],
        d: &[Option<f64>],
    ) -> Option<Signal> {
        if index == 0 {
            return None;
        }
        let bar = bars.get(index)?;
        let k_cur = (*k.get(index)?)?;
        let d_cur = (*d.get(index)?)?;
        let k_prev = (*k.get(index - 1)?)?;
        let d_prev = (*d.get(index - 1)?)?;

        let kind = match crossover(k_prev, d_prev, k_cur, d_cur)? {
            Crossover::Bullish if k_cur <= self.oversold && d_cur <= self.oversold => {
                SignalKind::StrongBuy
            }
            Crossover::Bullish if k_cur <= self.oversold => SignalKind::Buy,
            Crossover::Bearish if k_cur >= self.overbought => SignalKind::Sell,
            _ => return None,
        };

        Some(Signal {
            index,
            timestamp: bar.timestamp,
            kind,
            reference_price: self.reference_price(bar, kind),
        })
    }

    fn reference_price(&self, bar: &Bar, kind: SignalKind) -> f64 {
        match (self.mode, kind.is_buy()) {
            (ReferencePriceMode::Close, _) => bar.close,
            (ReferencePriceMode::ExtremeAdjusted, true) => bar.low * BUY_REFERENCE_FACTOR,
            (ReferencePriceMode::ExtremeAdjusted, false) => bar.high * SELL_REFERENCE_FACTOR,
        }
    }
}

impl Default for SignalDetector {
    fn default() -> Self {
        Self::from_params(&StrategyParams::default())
    }
}
