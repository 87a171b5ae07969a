//! Bar: the fundamental market data unit.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single instrument at a single timestamp.
///
/// A price series is a `&[Bar]` ordered by `timestamp` ascending with no
/// duplicate timestamps. The OHLC relationship is not enforced here: the
/// indicators treat whatever numbers arrive as ordinary inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(
        timestamp: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Returns true if any OHLCV field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        ![self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Basic OHLCV sanity check: low <= min(open, close) <= max(open, close) <= high,
    /// positive prices, non-negative volume.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.low <= self.open.min(self.close)
            && self.open.max(self.close) <= self.high
            && self.low > 0.0
            && self.volume >= 0.0
    }
}

/// True if timestamps are strictly increasing across the series.
pub fn is_strictly_ordered(bars: &[Bar]) -> bool {
    bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp)
}
