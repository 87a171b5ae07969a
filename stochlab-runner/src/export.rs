//! Artifact export: CSV tapes and JSON results per ticker, plus a run summary.
//!
//! Layout under the output directory:
//! - `<SYMBOL>/trades.csv`: executed buys and sells
//! - `<SYMBOL>/equity.csv`: bar-by-bar account value
//! - `<SYMBOL>/signals.csv`: every detected signal
//! - `<SYMBOL>/result.json`: statistics, snapshot, data quality, fingerprint
//! - `summary.json`: ranking and per-ticker failures
//!
//! Persisted JSON carries a `schema_version`; newer versions are rejected on load.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stochlab_core::{
    AnalysisConfig, BacktestResult, Bar, RunFingerprint, Signal, SignalKind, Trade, TradeKind,
};

use crate::data_loader::DataQuality;
use crate::report::{RankedEntry, Snapshot};
use crate::runner::{TickerReport, WatchlistReport};
use crate::timeframe::Timeframe;

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported schema version {found} (max supported: {max})")]
    UnsupportedSchema { found: u32, max: u32 },
}

// ─── CSV export ─────────────────────────────────────────────────────

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let data = wtr
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value.map(|v| format!("{v:.precision$}")).unwrap_or_default()
}

/// Columns: kind, bar_index, timestamp, price, shares, profit_pct
pub fn trades_csv(trades: &[Trade]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["kind", "bar_index", "timestamp", "price", "shares", "profit_pct"])?;
    for t in trades {
        let kind = match t.kind {
            TradeKind::Buy => "buy",
            TradeKind::Sell => "sell",
        };
        wtr.write_record(&[
            kind.to_string(),
            t.bar_index.to_string(),
            t.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            format!("{:.4}", t.price),
            format!("{:.0}", t.shares),
            fmt_opt(t.profit_pct, 4),
        ])?;
    }
    finish(wtr)
}

/// Columns: bar_index, timestamp, equity
pub fn equity_csv(bars: &[Bar], equity_curve: &[f64]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["bar_index", "timestamp", "equity"])?;
    for (i, (bar, eq)) in bars.iter().zip(equity_curve).enumerate() {
        wtr.write_record(&[
            i.to_string(),
            bar.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            format!("{eq:.2}"),
        ])?;
    }
    finish(wtr)
}

/// Columns: bar_index, timestamp, kind, reference_price
pub fn signals_csv(signals: &[Signal]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["bar_index", "timestamp", "kind", "reference_price"])?;
    for s in signals {
        let kind = match s.kind {
            SignalKind::Buy => "buy",
            SignalKind::StrongBuy => "strong_buy",
            SignalKind::Sell => "sell",
        };
        wtr.write_record(&[
            s.index.to_string(),
            s.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            kind.to_string(),
            format!("{:.4}", s.reference_price),
        ])?;
    }
    finish(wtr)
}

// ─── JSON artifacts ─────────────────────────────────────────────────

/// Contents of `result.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultArtifact {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub code: String,
    pub symbol: String,
    pub timeframe: Timeframe,
    pub source: String,
    pub bar_count: usize,
    pub first_timestamp: Option<NaiveDateTime>,
    pub last_timestamp: Option<NaiveDateTime>,
    pub signal_count: usize,
    pub result: BacktestResult,
    pub snapshot: Option<Snapshot>,
    pub quality: DataQuality,
    pub fingerprint: RunFingerprint,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl ResultArtifact {
    pub fn from_report(report: &TickerReport) -> Self {
        let series = &report.series;
        Self {
            schema_version: SCHEMA_VERSION,
            code: series.code.clone(),
            symbol: series.symbol.clone(),
            timeframe: series.timeframe,
            source: series.source.clone(),
            bar_count: series.bars.len(),
            first_timestamp: series.first_timestamp(),
            last_timestamp: series.last_timestamp(),
            signal_count: report.analysis.signals.len(),
            result: report.analysis.backtest.result.clone(),
            snapshot: report.snapshot.clone(),
            quality: series.quality.clone(),
            fingerprint: report.fingerprint.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureEntry {
    pub ticker: String,
    pub error: String,
}

/// Contents of `summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub timeframe: Timeframe,
    pub config: AnalysisConfig,
    pub ranking: Vec<RankedEntry>,
    pub failures: Vec<FailureEntry>,
}

impl RunSummary {
    pub fn from_report(report: &WatchlistReport) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            timeframe: report.timeframe,
            config: report.config.clone(),
            ranking: report.ranking(),
            failures: report
                .failures()
                .map(|(ticker, e)| FailureEntry {
                    ticker: ticker.to_string(),
                    error: e.to_string(),
                })
                .collect(),
        }
    }
}

/// Parse `result.json`, rejecting unknown schema versions.
pub fn import_result_json(json: &str) -> Result<ResultArtifact, ExportError> {
    let artifact: ResultArtifact = serde_json::from_str(json)?;
    if artifact.schema_version > SCHEMA_VERSION {
        return Err(ExportError::UnsupportedSchema {
            found: artifact.schema_version,
            max: SCHEMA_VERSION,
        });
    }
    Ok(artifact)
}

// ─── Artifact bundle ────────────────────────────────────────────────

fn write_file(path: PathBuf, contents: &str) -> Result<(), ExportError> {
    std::fs::write(&path, contents).map_err(|source| ExportError::Io { path, source })
}

fn create_dir(path: &Path) -> Result<(), ExportError> {
    std::fs::create_dir_all(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the four per-ticker files and return the ticker directory.
pub fn save_ticker_artifacts(
    report: &TickerReport,
    output_dir: &Path,
) -> Result<PathBuf, ExportError> {
    let dir = output_dir.join(report.symbol());
    create_dir(&dir)?;

    let analysis = &report.analysis;
    write_file(dir.join("trades.csv"), &trades_csv(&analysis.backtest.trades)?)?;
    write_file(
        dir.join("equity.csv"),
        &equity_csv(&report.series.bars, &analysis.backtest.equity_curve)?,
    )?;
    write_file(dir.join("signals.csv"), &signals_csv(&analysis.signals)?)?;

    let json = serde_json::to_string_pretty(&ResultArtifact::from_report(report))?;
    write_file(dir.join("result.json"), &json)?;

    Ok(dir)
}

/// Write artifacts for every successful ticker plus `summary.json`.
/// Returns the summary path.
pub fn save_watchlist_artifacts(
    report: &WatchlistReport,
    output_dir: &Path,
) -> Result<PathBuf, ExportError> {
    create_dir(output_dir)?;
    for ticker in report.successes() {
        save_ticker_artifacts(ticker, output_dir)?;
    }
    let path = output_dir.join("summary.json");
    let json = serde_json::to_string_pretty(&RunSummary::from_report(report))?;
    write_file(path.clone(), &json)?;
    Ok(path)
}
