//! Bar loading for one ticker: suffix resolution, fetch, canonicalization.
//!
//! Resolution policy for a canonical code:
//! 1. Try each candidate from `resolve_candidates` in order
//! 2. A candidate that is missing or empty falls through to the next one
//! 3. Any other source error (unreadable or malformed file) fails the ticker
//! 4. If every candidate is missing → `DataError::NotFound`

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use stochlab_core::fingerprint::dataset_hash;
use stochlab_core::Bar;

use crate::source::{DataError, PriceSource};
use crate::ticker::{canonical_code, resolve_candidates};
use crate::timeframe::Timeframe;

/// What canonicalization changed or noticed in a raw series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQuality {
    /// Raw bars received from the source.
    pub raw_bars: usize,
    /// Bars dropped because an earlier bar had the same timestamp.
    pub duplicates_dropped: usize,
    /// Bars with NaN/infinite fields (kept).
    pub void_bars: usize,
    /// Finite bars violating low ≤ open/close ≤ high or with non-positive prices (kept).
    pub insane_bars: usize,
    /// True if the source delivered bars out of order.
    pub was_unsorted: bool,
}

impl DataQuality {
    pub fn warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.was_unsorted {
            out.push("bars arrived out of order and were sorted".to_string());
        }
        if self.duplicates_dropped > 0 {
            out.push(format!(
                "{} duplicate timestamp(s) dropped",
                self.duplicates_dropped
            ));
        }
        if self.void_bars > 0 {
            out.push(format!("{} bar(s) with missing values", self.void_bars));
        }
        if self.insane_bars > 0 {
            out.push(format!("{} bar(s) fail OHLC sanity checks", self.insane_bars));
        }
        out
    }
}

/// Sort ascending by timestamp and drop repeated timestamps, keeping the
/// first bar delivered for each. Nothing else is altered.
pub fn canonicalize(mut bars: Vec<Bar>) -> (Vec<Bar>, DataQuality) {
    let raw_bars = bars.len();
    let was_unsorted = !bars.windows(2).all(|w| w[0].timestamp <= w[1].timestamp);
    if was_unsorted {
        // stable: equal timestamps keep delivery order
        bars.sort_by_key(|b| b.timestamp);
    }
    bars.dedup_by(|later, earlier| later.timestamp == earlier.timestamp);

    let void_bars = bars.iter().filter(|b| b.is_void()).count();
    let insane_bars = bars.iter().filter(|b| !b.is_void() && !b.is_sane()).count();

    let quality = DataQuality {
        raw_bars,
        duplicates_dropped: raw_bars - bars.len(),
        void_bars,
        insane_bars,
        was_unsorted,
    };
    (bars, quality)
}

/// A fetched, canonical series for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedSeries {
    /// Canonical code as entered (suffix stripped, upper-case).
    pub code: String,
    /// Symbol the source actually answered for (e.g. `005930.KS`).
    pub symbol: String,
    pub timeframe: Timeframe,
    pub source: String,
    pub bars: Vec<Bar>,
    pub quality: DataQuality,
    /// BLAKE3 over the canonical bars.
    pub dataset_hash: String,
}

impl LoadedSeries {
    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.bars.first().map(|b| b.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.bars.last().map(|b| b.timestamp)
    }
}

/// Resolve `ticker` against `source` and return its canonical series.
pub fn load_series(
    source: &dyn PriceSource,
    ticker: &str,
    timeframe: Timeframe,
) -> Result<LoadedSeries, DataError> {
    let code = canonical_code(ticker);
    let candidates = resolve_candidates(&code);

    for symbol in &candidates {
        match source.fetch(symbol, timeframe) {
            Ok(raw) if raw.is_empty() => {
                debug!(%symbol, source = source.name(), "empty series, trying next candidate");
            }
            Ok(raw) => {
                let (bars, quality) = canonicalize(raw);
                for w in quality.warnings() {
                    warn!(%symbol, "{w}");
                }
                let dataset_hash = dataset_hash(&bars);
                return Ok(LoadedSeries {
                    code,
                    symbol: symbol.clone(),
                    timeframe,
                    source: source.name().to_string(),
                    bars,
                    quality,
                    dataset_hash,
                });
            }
            Err(e) if e.is_missing() => {
                debug!(%symbol, source = source.name(), error = %e, "not found, trying next candidate");
            }
            Err(e) => return Err(e),
        }
    }

    Err(DataError::NotFound {
        symbol: code,
        tried: candidates.join(", "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use chrono::NaiveDate;

    fn bar(day: u32, close: f64) -> Bar {
        Bar::new(
            NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            close,
            close + 1.0,
            close - 1.0,
            close,
            1000.0,
        )
    }

    #[test]
    fn canonicalize_sorts_and_keeps_first_duplicate() {
        let raw = vec![bar(3, 30.0), bar(2, 20.0), bar(3, 31.0), bar(4, 40.0)];
        let (bars, q) = canonicalize(raw);
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![20.0, 30.0, 40.0]);
        assert_eq!(q.raw_bars, 4);
        assert_eq!(q.duplicates_dropped, 1);
        assert!(q.was_unsorted);
        assert!(stochlab_core::domain::bar::is_strictly_ordered(&bars));
    }

    #[test]
    fn canonicalize_counts_but_keeps_bad_bars() {
        let mut broken = bar(3, 10.0);
        broken.high = 5.0;
        let mut void = bar(4, 10.0);
        void.close = f64::NAN;
        let (bars, q) = canonicalize(vec![bar(2, 10.0), broken, void]);
        assert_eq!(bars.len(), 3);
        assert_eq!(q.insane_bars, 1);
        assert_eq!(q.void_bars, 1);
        assert_eq!(q.warnings().len(), 2);
    }

    #[test]
    fn clean_series_has_no_warnings() {
        let (_, q) = canonicalize(vec![bar(2, 10.0), bar(3, 11.0)]);
        assert!(q.warnings().is_empty());
        assert!(!q.was_unsorted);
    }

    #[test]
    fn korean_code_falls_through_to_kosdaq() {
        let source = MemorySource::new().with_series("035720.KQ", vec![bar(2, 50_000.0)]);
        let loaded = load_series(&source, "035720", Timeframe::Day1).unwrap();
        assert_eq!(loaded.code, "035720");
        assert_eq!(loaded.symbol, "035720.KQ");
        assert_eq!(loaded.source, "memory");
    }

    #[test]
    fn kospi_wins_when_both_listed() {
        let source = MemorySource::new()
            .with_series("005930.KS", vec![bar(2, 1.0)])
            .with_series("005930.KQ", vec![bar(2, 2.0)]);
        let loaded = load_series(&source, "005930.kq", Timeframe::Day1).unwrap();
        assert_eq!(loaded.symbol, "005930.KS");
    }

    #[test]
    fn empty_candidate_falls_through() {
        let source = MemorySource::new()
            .with_series("000660.KS", vec![])
            .with_series("000660.KQ", vec![bar(2, 1.0)]);
        let loaded = load_series(&source, "000660", Timeframe::Day1).unwrap();
        assert_eq!(loaded.symbol, "000660.KQ");
    }

    #[test]
    fn all_candidates_missing() {
        let err = load_series(&MemorySource::new(), "042700", Timeframe::Day1).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("042700.KS"));
        assert!(msg.contains("042700.KQ"));
    }

    #[test]
    fn dataset_hash_follows_canonical_bars() {
        let a = MemorySource::new().with_series("X", vec![bar(3, 2.0), bar(2, 1.0)]);
        let b = MemorySource::new().with_series("X", vec![bar(2, 1.0), bar(3, 2.0)]);
        let la = load_series(&a, "X", Timeframe::Day1).unwrap();
        let lb = load_series(&b, "X", Timeframe::Day1).unwrap();
        assert_eq!(la.dataset_hash, lb.dataset_hash);
        assert_eq!(la.first_timestamp(), lb.first_timestamp());
    }
}
