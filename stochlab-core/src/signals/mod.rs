//! Signal generation: %K/%D crossovers classified into buy/sell tiers.
//!
//! Signals are portfolio-agnostic: they see bars and indicator values,
//! never the backtest account. A signal series is the ordered subsequence
//! of bar indices that carry a signal; there is at most one per index.

pub mod detector;

pub use detector::{crossover, Crossover, SignalDetector};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Buy-side markers are drawn 3% under the bar low.
pub const BUY_REFERENCE_FACTOR: f64 = 0.97;
/// Sell-side markers are drawn 3% over the bar high.
pub const SELL_REFERENCE_FACTOR: f64 = 1.03;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Buy,
    StrongBuy,
    Sell,
}

impl SignalKind {
    /// Buy or StrongBuy.
    pub fn is_buy(&self) -> bool {
        matches!(self, SignalKind::Buy | SignalKind::StrongBuy)
    }

    pub fn is_sell(&self) -> bool {
        matches!(self, SignalKind::Sell)
    }
}

/// Which price a signal reports as its reference level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencePriceMode {
    /// `low * 0.97` for buys, `high * 1.03` for sells (chart markers).
    #[default]
    ExtremeAdjusted,
    /// The bar's close (backtest tables).
    Close,
}

/// An immutable crossover event at one bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub index: usize,
    pub timestamp: NaiveDateTime,
    pub kind: SignalKind,
    pub reference_price: f64,
}

/// Per-index lookup of buy-class and sell signals over a series of `len` bars.
///
/// Indices past `len` are ignored.
pub(crate) fn signal_masks(signals: &[Signal], len: usize) -> (Vec<bool>, Vec<bool>) {
    let mut buys = vec![false; len];
    let mut sells = vec![false; len];
    for signal in signals.iter().filter(|s| s.index < len) {
        if signal.kind.is_buy() {
            buys[signal.index] = true;
        } else {
            sells[signal.index] = true;
        }
    }
    (buys, sells)
}
