//! Price source trait and structured error types.
//!
//! The `PriceSource` trait abstracts over where bars come from (CSV exports,
//! a synthetic random walk, in-memory fixtures) so the runner can swap
//! implementations and tests can inject fixed series.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Weekday};
use thiserror::Error;

use stochlab_core::Bar;

use crate::timeframe::Timeframe;

/// Errors from fetching and reading price data.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("no data for '{symbol}' (tried {tried})")]
    NotFound { symbol: String, tried: String },

    #[error("empty price series for '{symbol}'")]
    Empty { symbol: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}

impl DataError {
    /// True for "this symbol has nothing here", as opposed to a broken file.
    pub fn is_missing(&self) -> bool {
        matches!(self, DataError::NotFound { .. } | DataError::Empty { .. })
    }
}

/// Anything that can produce a bar series for a symbol and interval.
pub trait PriceSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch bars for an exact symbol (already resolved, e.g. `005930.KS`).
    fn fetch(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Bar>, DataError>;
}

// ─── CSV directory ──────────────────────────────────────────────────

/// Reads `<dir>/<SYMBOL>_<interval>.csv`, falling back to `<dir>/<SYMBOL>.csv`.
///
/// Headers are matched case-insensitively. The time column may be called
/// `timestamp`, `date`, `datetime` or `time`; `volume` is optional. An empty
/// price cell becomes NaN and the bar is kept as a void bar.
#[derive(Debug, Clone)]
pub struct CsvDirSource {
    dir: PathBuf,
}

impl CsvDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn candidate_paths(&self, symbol: &str, timeframe: Timeframe) -> [PathBuf; 2] {
        [
            self.dir.join(format!("{symbol}_{}.csv", timeframe.as_str())),
            self.dir.join(format!("{symbol}.csv")),
        ]
    }
}

impl PriceSource for CsvDirSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Bar>, DataError> {
        let paths = self.candidate_paths(symbol, timeframe);
        match paths.iter().find(|p| p.is_file()) {
            Some(path) => read_bars_csv(path),
            None => Err(DataError::NotFound {
                symbol: symbol.to_string(),
                tried: paths
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }
}

struct Columns {
    time: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, String> {
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_ascii_lowercase()).collect();
        let find = |wanted: &[&str]| {
            names
                .iter()
                .position(|n| wanted.iter().any(|w| n.as_str() == *w))
        };
        let require = |wanted: &[&str]| {
            find(wanted).ok_or_else(|| format!("missing column '{}'", wanted[0]))
        };

        Ok(Self {
            time: require(&["timestamp", "date", "datetime", "time"])?,
            open: require(&["open"])?,
            high: require(&["high"])?,
            low: require(&["low"])?,
            close: require(&["close"])?,
            volume: find(&["volume"]),
        })
    }
}

/// Read one CSV file into bars, in file order.
pub fn read_bars_csv(path: &Path) -> Result<Vec<Bar>, DataError> {
    let file = File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let malformed = |reason: String| DataError::Malformed {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);
    let headers = reader.headers().map_err(|e| malformed(e.to_string()))?.clone();
    let cols = Columns::from_headers(&headers).map_err(&malformed)?;

    let mut bars = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| malformed(e.to_string()))?;
        let line = row + 2;
        let field = |i: usize| record.get(i).unwrap_or("");
        let number = |i: usize| {
            parse_number(field(i)).ok_or_else(|| {
                malformed(format!("line {line}: '{}' is not a number", field(i)))
            })
        };

        let timestamp = parse_timestamp(field(cols.time))
            .ok_or_else(|| malformed(format!("line {line}: bad timestamp '{}'", field(cols.time))))?;
        let volume = match cols.volume {
            Some(i) => number(i)?,
            None => 0.0,
        };
        bars.push(Bar::new(
            timestamp,
            number(cols.open)?,
            number(cols.high)?,
            number(cols.low)?,
            number(cols.close)?,
            volume,
        ));
    }
    Ok(bars)
}

/// Empty cells are missing values; anything else must parse.
fn parse_number(s: &str) -> Option<f64> {
    if s.is_empty() {
        return Some(f64::NAN);
    }
    s.replace(',', "").parse().ok()
}

/// Accepts dates, naive datetimes and offset datetimes (offset dropped,
/// local wall-clock time kept).
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];

    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

// ─── Synthetic ──────────────────────────────────────────────────────

/// Deterministic random walk, seeded from the symbol and interval.
///
/// The series ends at a fixed anchor rather than "now" so repeated runs see
/// identical data. Weekends are skipped for daily and intraday intervals.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    end: NaiveDateTime,
}

impl SyntheticSource {
    pub fn new(end: NaiveDateTime) -> Self {
        Self { end }
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        let end = NaiveDate::from_ymd_opt(2025, 1, 3)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        Self::new(end)
    }
}

impl PriceSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Bar>, DataError> {
        let bars = generate_synthetic_bars(symbol, timeframe, self.end);
        if bars.is_empty() {
            return Err(DataError::Empty {
                symbol: symbol.to_string(),
            });
        }
        Ok(bars)
    }
}

fn generate_synthetic_bars(symbol: &str, timeframe: Timeframe, end: NaiveDateTime) -> Vec<Bar> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed_bytes = blake3::hash(format!("{symbol}:{timeframe}").as_bytes());
    let mut rng = StdRng::from_seed(*seed_bytes.as_bytes());

    let skip_weekends = timeframe.is_intraday() || timeframe == Timeframe::Day1;
    let step = timeframe.step();
    let mut current = end - timeframe.history_span();
    let mut price = 100.0_f64;
    let mut bars = Vec::with_capacity(timeframe.max_bars() + 1);

    while current <= end {
        let weekday = current.weekday();
        if skip_weekends && (weekday == Weekday::Sat || weekday == Weekday::Sun) {
            current += step;
            continue;
        }

        let ret: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + ret);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64) as f64;

        bars.push(Bar::new(current, open, high, low, close, volume));
        price = close;
        current += step;
    }

    bars
}

// ─── In-memory ──────────────────────────────────────────────────────

/// Preloaded series keyed by upper-cased symbol; the interval is ignored.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    series: HashMap<String, Vec<Bar>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.insert(symbol, bars);
        self
    }

    pub fn insert(&mut self, symbol: &str, bars: Vec<Bar>) {
        self.series.insert(symbol.to_ascii_uppercase(), bars);
    }
}

impl PriceSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch(&self, symbol: &str, _timeframe: Timeframe) -> Result<Vec<Bar>, DataError> {
        self.series
            .get(&symbol.to_ascii_uppercase())
            .cloned()
            .ok_or_else(|| DataError::NotFound {
                symbol: symbol.to_string(),
                tried: "memory".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reads_daily_csv_with_mixed_case_headers() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "AAPL_1d.csv",
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2024-01-02,100,102,99,101,101,1000\n\
             2024-01-03,101,103,100,102,102,1100\n",
        );
        let source = CsvDirSource::new(dir.path());
        let bars = source.fetch("AAPL", Timeframe::Day1).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].close, 102.0);
        assert_eq!(bars[1].volume, 1100.0);
        assert_eq!(bars[0].timestamp.to_string(), "2024-01-02 00:00:00");
    }

    #[test]
    fn falls_back_to_bare_symbol_file() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "005930.KS.csv",
            "timestamp,open,high,low,close\n2024-01-02 09:00,70000,71000,69500,70500\n",
        );
        let source = CsvDirSource::new(dir.path());
        let bars = source.fetch("005930.KS", Timeframe::Hour1).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].volume, 0.0);
        assert_eq!(bars[0].timestamp.to_string(), "2024-01-02 09:00:00");
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = CsvDirSource::new(dir.path())
            .fetch("MSFT", Timeframe::Day1)
            .unwrap_err();
        assert!(err.is_missing());
        assert!(err.to_string().contains("MSFT"));
    }

    #[test]
    fn empty_cells_become_void_bars() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "X.csv",
            "date,open,high,low,close,volume\n2024-01-02,1,2,0.5,,10\n",
        );
        let bars = CsvDirSource::new(dir.path()).fetch("X", Timeframe::Day1).unwrap();
        assert!(bars[0].close.is_nan());
        assert!(bars[0].is_void());
    }

    #[test]
    fn garbage_number_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "X.csv",
            "date,open,high,low,close\n2024-01-02,1,2,abc,1.5\n",
        );
        let err = CsvDirSource::new(dir.path())
            .fetch("X", Timeframe::Day1)
            .unwrap_err();
        assert!(matches!(err, DataError::Malformed { .. }));
        assert!(!err.is_missing());
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn missing_column_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "X.csv", "date,open,high,close\n2024-01-02,1,2,1.5\n");
        let err = CsvDirSource::new(dir.path())
            .fetch("X", Timeframe::Day1)
            .unwrap_err();
        assert!(err.to_string().contains("missing column 'low'"));
    }

    #[test]
    fn timestamp_formats() {
        assert!(parse_timestamp("2024-01-02").is_some());
        assert!(parse_timestamp("2024-01-02 09:30:00").is_some());
        assert!(parse_timestamp("2024-01-02T09:30").is_some());
        let with_offset = parse_timestamp("2024-01-02 09:30:00+09:00").unwrap();
        assert_eq!(with_offset.to_string(), "2024-01-02 09:30:00");
        assert!(parse_timestamp("02/01/2024").is_none());
    }

    #[test]
    fn synthetic_is_deterministic_per_symbol() {
        let source = SyntheticSource::default();
        let a = source.fetch("AAPL", Timeframe::Day1).unwrap();
        let b = source.fetch("AAPL", Timeframe::Day1).unwrap();
        let c = source.fetch("MSFT", Timeframe::Day1).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), c.len());
        assert_ne!(a[0].close, c[0].close);
        assert!(a.iter().all(Bar::is_sane));
        assert!(a
            .iter()
            .all(|bar| !matches!(bar.timestamp.weekday(), Weekday::Sat | Weekday::Sun)));
    }

    #[test]
    fn synthetic_weekly_keeps_every_step() {
        let bars = SyntheticSource::default()
            .fetch("SPY", Timeframe::Week1)
            .unwrap();
        assert!(bars.len() >= 520);
        assert!(bars.windows(2).all(|w| w[1].timestamp - w[0].timestamp
            == chrono::Duration::weeks(1)));
    }

    #[test]
    fn synthetic_intraday_skips_weekends_within_window() {
        let bars = SyntheticSource::default()
            .fetch("005930.KS", Timeframe::Minute30)
            .unwrap();
        assert!(bars.len() <= Timeframe::Minute30.max_bars() + 1);
        assert!(bars
            .iter()
            .all(|bar| !matches!(bar.timestamp.weekday(), Weekday::Sat | Weekday::Sun)));
        assert!(bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn memory_source_is_case_insensitive() {
        let bar = Bar::new(
            NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            1.0,
            2.0,
            0.5,
            1.5,
            10.0,
        );
        let source = MemorySource::new().with_series("aapl", vec![bar]);
        assert_eq!(source.fetch("AAPL", Timeframe::Day1).unwrap().len(), 1);
        assert!(source.fetch("MSFT", Timeframe::Day1).unwrap_err().is_missing());
    }
}
