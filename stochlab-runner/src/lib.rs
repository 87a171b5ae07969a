//! StochLab Runner: price sources, watchlists and batch analysis.
//!
//! This crate builds on `stochlab-core` to provide:
//! - Price sources (CSV directory, deterministic synthetic walk, in-memory)
//! - Ticker parsing and KOSPI/KOSDAQ suffix resolution
//! - Bar canonicalization with data-quality warnings
//! - Key-value session store holding the saved watchlist
//! - TOML run configuration
//! - Parallel per-ticker analysis with snapshots and ranking
//! - CSV/JSON artifact export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod report;
pub mod runner;
pub mod source;
pub mod store;
pub mod ticker;
pub mod timeframe;
pub mod watchlist;

pub use config::{ConfigLoadError, DataConfig, RunConfig};
pub use data_loader::{canonicalize, load_series, DataQuality, LoadedSeries};
pub use export::{save_ticker_artifacts, save_watchlist_artifacts, ExportError, RunSummary};
pub use report::{rank, RankedEntry, Snapshot, Zone};
pub use runner::{Runner, TickerOutcome, TickerReport, WatchlistReport};
pub use source::{CsvDirSource, DataError, MemorySource, PriceSource, SyntheticSource};
pub use store::{JsonFileStore, MemoryStore, SessionStore, StoreError};
pub use ticker::{parse_tickers, resolve_candidates, Currency};
pub use timeframe::Timeframe;
pub use watchlist::{add_ticker, load_watchlist, remove_ticker, save_watchlist};
