//! Watchlist runner: load, analyze and snapshot every ticker independently.
//!
//! Tickers run in parallel on the rayon pool. A failed load is recorded
//! against its ticker and never aborts the batch; outcomes come back in
//! input order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

use stochlab_core::{Analysis, AnalysisConfig, ConfigError, Pipeline, RunFingerprint};

use crate::data_loader::{load_series, LoadedSeries};
use crate::report::{rank, RankedEntry, Snapshot};
use crate::source::{DataError, PriceSource};
use crate::timeframe::Timeframe;

/// Everything produced for one successfully loaded ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerReport {
    pub series: LoadedSeries,
    pub analysis: Analysis,
    pub snapshot: Option<Snapshot>,
    pub fingerprint: RunFingerprint,
}

impl TickerReport {
    pub fn symbol(&self) -> &str {
        &self.series.symbol
    }
}

#[derive(Debug)]
pub struct TickerOutcome {
    /// The ticker as entered.
    pub ticker: String,
    pub result: Result<TickerReport, DataError>,
}

/// Outcomes for a whole watchlist, in input order.
#[derive(Debug)]
pub struct WatchlistReport {
    pub timeframe: Timeframe,
    pub config: AnalysisConfig,
    pub outcomes: Vec<TickerOutcome>,
}

impl WatchlistReport {
    pub fn successes(&self) -> impl Iterator<Item = &TickerReport> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &DataError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.ticker.as_str(), e)))
    }

    /// Successful tickers ranked by total return.
    pub fn ranking(&self) -> Vec<RankedEntry> {
        rank(self.successes().map(|r| (r.symbol(), &r.analysis)))
    }
}

/// Runs one validated pipeline over many tickers.
#[derive(Debug, Clone)]
pub struct Runner {
    pipeline: Pipeline,
    timeframe: Timeframe,
    parallel: bool,
}

impl Runner {
    pub fn new(config: AnalysisConfig, timeframe: Timeframe) -> Result<Self, ConfigError> {
        Ok(Self {
            pipeline: Pipeline::new(config)?,
            timeframe,
            parallel: true,
        })
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn config(&self) -> &AnalysisConfig {
        self.pipeline.config()
    }

    pub fn analyze_ticker(
        &self,
        source: &dyn PriceSource,
        ticker: &str,
    ) -> Result<TickerReport, DataError> {
        let _span = info_span!("ticker", %ticker).entered();

        let series = load_series(source, ticker, self.timeframe)?;
        let analysis = self.pipeline.run(&series.bars);
        let snapshot = Snapshot::build(
            &series.symbol,
            &series.bars,
            &analysis,
            &self.config().strategy,
        );
        let fingerprint = RunFingerprint::new(&series.bars, self.config());

        info!(
            symbol = %series.symbol,
            bars = series.bars.len(),
            signals = analysis.signals.len(),
            trades = analysis.backtest.trades.len(),
            total_return = analysis.backtest.result.total_return,
            "analyzed"
        );

        Ok(TickerReport {
            series,
            analysis,
            snapshot,
            fingerprint,
        })
    }

    pub fn analyze_watchlist(
        &self,
        source: &dyn PriceSource,
        tickers: &[String],
    ) -> WatchlistReport {
        let run_one = |ticker: &String| {
            let result = self.analyze_ticker(source, ticker);
            if let Err(e) = &result {
                warn!(%ticker, error = %e, "ticker skipped");
            }
            TickerOutcome {
                ticker: ticker.clone(),
                result,
            }
        };

        let outcomes: Vec<TickerOutcome> = if self.parallel {
            tickers.par_iter().map(run_one).collect()
        } else {
            tickers.iter().map(run_one).collect()
        };

        WatchlistReport {
            timeframe: self.timeframe,
            config: self.config().clone(),
            outcomes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MemorySource, SyntheticSource};
    use chrono::NaiveDate;
    use stochlab_core::Bar;

    fn sine_bars(n: usize, phase: f64) -> Vec<Bar> {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        (0..n)
            .map(|i| {
                let c = 100.0 + (i as f64 * 0.2 + phase).sin() * 10.0;
                Bar::new(base + chrono::Duration::days(i as i64), c, c + 1.0, c - 1.0, c, 1e4)
            })
            .collect()
    }

    #[test]
    fn failures_do_not_abort_the_batch() {
        let source = MemorySource::new()
            .with_series("AAPL", sine_bars(200, 0.0))
            .with_series("MSFT", sine_bars(200, 1.0));
        let runner = Runner::new(AnalysisConfig::default(), Timeframe::Day1).unwrap();
        let tickers: Vec<String> = vec!["AAPL".into(), "NOPE".into(), "MSFT".into()];
        let report = runner.analyze_watchlist(&source, &tickers);

        let order: Vec<&str> = report.outcomes.iter().map(|o| o.ticker.as_str()).collect();
        assert_eq!(order, vec!["AAPL", "NOPE", "MSFT"]);
        assert_eq!(report.successes().count(), 2);
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "NOPE");
        assert_eq!(report.ranking().len(), 2);
    }

    #[test]
    fn parallel_matches_sequential() {
        let source = SyntheticSource::default();
        let tickers: Vec<String> = ["005930", "000660", "AAPL", "MSFT", "TSLA"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let runner = Runner::new(AnalysisConfig::default(), Timeframe::Day1).unwrap();

        let par = runner.analyze_watchlist(&source, &tickers);
        let seq = runner
            .clone()
            .with_parallelism(false)
            .analyze_watchlist(&source, &tickers);

        let a: Vec<&TickerReport> = par.successes().collect();
        let b: Vec<&TickerReport> = seq.successes().collect();
        assert_eq!(a.len(), 5);
        assert_eq!(a, b);
    }

    #[test]
    fn korean_codes_resolve_through_source() {
        let source = SyntheticSource::default();
        let runner = Runner::new(AnalysisConfig::default(), Timeframe::Week1).unwrap();
        let report = runner.analyze_ticker(&source, "005930").unwrap();
        assert_eq!(report.symbol(), "005930.KS");
        assert_eq!(report.series.timeframe, Timeframe::Week1);
        assert!(report.snapshot.is_some());
        assert_eq!(
            report.fingerprint.dataset_hash,
            report.series.dataset_hash
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = AnalysisConfig::default();
        config.strategy.rsi_period = 0;
        assert!(Runner::new(config, Timeframe::Day1).is_err());
    }
}
