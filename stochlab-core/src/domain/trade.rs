//! Trade: one fill in the single-position backtest.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeKind {
    Buy,
    Sell,
}

/// A single executed trade.
///
/// Trades come out of the simulator in chronological order and alternate
/// Buy, Sell, Buy, ... Only Sell trades carry a realized profit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub kind: TradeKind,
    pub bar_index: usize,
    pub timestamp: NaiveDateTime,
    pub price: f64,
    pub shares: f64,
    /// Realized profit in percent of the opening Buy price (Sell only).
    pub profit_pct: Option<f64>,
}

impl Trade {
    pub fn is_sell(&self) -> bool {
        self.kind == TradeKind::Sell
    }
}
