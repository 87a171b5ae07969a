//! StochLab CLI: watchlist analysis and watchlist management.
//!
//! Commands:
//! - `analyze` runs indicators, signals and the backtest for each ticker and prints a ranking
//! - `watchlist show|set|add|remove` edits the saved watchlist in the session store

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use stochlab_core::SignalKind;
use stochlab_runner::ticker::canonical_code;
use stochlab_runner::{
    add_ticker, load_watchlist, parse_tickers, remove_ticker, save_watchlist,
    save_watchlist_artifacts, CsvDirSource, JsonFileStore, PriceSource, RunConfig, Runner,
    Snapshot, SyntheticSource, Timeframe, TickerReport, WatchlistReport,
};
use tracing::{debug, info};

#[derive(Parser)]
#[command(
    name = "stochlab",
    about = "StochLab CLI: stochastic/RSI crossover signals and backtests"
)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze tickers and rank them by backtest return.
    Analyze {
        /// Tickers (e.g., 005930 AAPL). Defaults to the saved watchlist.
        tickers: Vec<String>,

        /// Path to a TOML run config.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory of CSV price files.
        #[arg(long, conflicts_with = "synthetic")]
        data_dir: Option<PathBuf>,

        /// Use the deterministic synthetic price source.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Bar interval: 1m, 5m, 15m, 30m, 60m, 1h, 1d, 1wk, 1mo.
        #[arg(long)]
        timeframe: Option<Timeframe>,

        /// Write per-ticker CSV/JSON artifacts and summary.json here.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Session store file. Defaults to the user config directory.
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Show or edit the saved watchlist.
    Watchlist {
        #[command(subcommand)]
        action: WatchlistAction,

        /// Session store file. Defaults to the user config directory.
        #[arg(long, global = true)]
        store: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum WatchlistAction {
    /// Print the saved tickers.
    Show,
    /// Replace the watchlist with a comma-separated list.
    Set { list: String },
    /// Append one ticker.
    Add { ticker: String },
    /// Remove one ticker.
    Remove { ticker: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Analyze {
            tickers,
            config,
            data_dir,
            synthetic,
            timeframe,
            output_dir,
            store,
        } => run_analyze(AnalyzeArgs {
            tickers,
            config,
            data_dir,
            synthetic,
            timeframe,
            output_dir,
            store,
        }),
        Commands::Watchlist { action, store } => run_watchlist(action, store),
    }
}

fn setup_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn default_store_path() -> Result<PathBuf> {
    let Some(dir) = dirs::config_dir() else {
        bail!("no user config directory; pass --store");
    };
    Ok(dir.join("stochlab").join("session.json"))
}

fn open_store(path: Option<PathBuf>) -> Result<JsonFileStore> {
    let path = match path {
        Some(p) => p,
        None => default_store_path()?,
    };
    debug!(path = %path.display(), "opening session store");
    JsonFileStore::open(&path).with_context(|| format!("opening session store {}", path.display()))
}

// ─── analyze ────────────────────────────────────────────────────────

struct AnalyzeArgs {
    tickers: Vec<String>,
    config: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    synthetic: bool,
    timeframe: Option<Timeframe>,
    output_dir: Option<PathBuf>,
    store: Option<PathBuf>,
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => RunConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RunConfig::default(),
    };

    // Flags override the [data] section.
    if let Some(tf) = args.timeframe {
        config.data.timeframe = tf;
    }
    if let Some(dir) = args.data_dir {
        config.data.data_dir = Some(dir);
        config.data.synthetic = false;
    }
    if args.synthetic {
        config.data.synthetic = true;
    }

    let tickers = if args.tickers.is_empty() {
        load_watchlist(&open_store(args.store)?)
    } else {
        parse_tickers(&args.tickers.join(","))
    };
    if tickers.is_empty() {
        bail!("no tickers given and the saved watchlist is empty");
    }

    let source = build_source(&config)?;
    info!(
        source = source.name(),
        timeframe = %config.data.timeframe,
        tickers = tickers.len(),
        "starting analysis"
    );

    let runner = Runner::new(config.analysis_config(), config.data.timeframe)
        .context("invalid strategy or backtest parameters")?;
    let report = runner.analyze_watchlist(source.as_ref(), &tickers);

    print_report(&report);

    if let Some(out) = args.output_dir {
        let summary = save_watchlist_artifacts(&report, &out)
            .with_context(|| format!("writing artifacts to {}", out.display()))?;
        println!();
        println!("Artifacts written; summary at {}", summary.display());
    }

    if report.successes().next().is_none() {
        bail!("no ticker could be analyzed");
    }
    Ok(())
}

fn build_source(config: &RunConfig) -> Result<Box<dyn PriceSource>> {
    if config.data.synthetic {
        return Ok(Box::new(SyntheticSource::default()));
    }
    match &config.data.data_dir {
        Some(dir) => {
            ensure_dir(dir)?;
            Ok(Box::new(CsvDirSource::new(dir)))
        }
        None => bail!("no price source: pass --data-dir or --synthetic, or set [data] in the config"),
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        bail!("data directory {} does not exist", dir.display());
    }
    Ok(())
}

// ─── Output ─────────────────────────────────────────────────────────

fn signal_label(kind: Option<SignalKind>) -> &'static str {
    match kind {
        Some(SignalKind::StrongBuy) => "STRONG BUY",
        Some(SignalKind::Buy) => "buy",
        Some(SignalKind::Sell) => "sell",
        None => "-",
    }
}

fn timestamp_format(timeframe: Timeframe) -> &'static str {
    if timeframe.is_intraday() {
        "%Y-%m-%d %H:%M"
    } else {
        "%Y-%m-%d"
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

fn print_snapshot(snap: &Snapshot, timeframe: Timeframe) {
    let change = match (snap.change, snap.change_pct) {
        (Some(c), Some(p)) => format!("{c:+.2} ({p:+.2}%)"),
        _ => "n/a".to_string(),
    };
    println!(
        "  Last:           {} {}  {}",
        snap.close
            .map_or_else(|| "n/a".to_string(), |c| snap.currency.format_price(c)),
        change,
        snap.timestamp.format(timestamp_format(timeframe))
    );
    let mas: Vec<String> = snap
        .moving_averages
        .iter()
        .map(|(period, v)| format!("MA{period} {}", fmt_opt(*v)))
        .collect();
    println!("  Averages:       {}", mas.join("  "));
    println!(
        "  Stochastic:     %K {} / %D {}  [{}]",
        fmt_opt(snap.k),
        fmt_opt(snap.d),
        snap.stochastic_zone.map_or("n/a".to_string(), |z| z.to_string())
    );
    println!(
        "  RSI:            {}  [{}]",
        fmt_opt(snap.rsi),
        snap.rsi_zone.map_or("n/a".to_string(), |z| z.to_string())
    );
    println!("  Latest signal:  {}", signal_label(snap.signal));
    if snap.strong_buy_now {
        println!("  ** strong buy on the latest bar **");
    }
}

fn print_ticker(ticker: &TickerReport) {
    let r = &ticker.analysis.backtest.result;
    let name = ticker
        .snapshot
        .as_ref()
        .map_or(ticker.series.code.as_str(), |s| s.name.as_str());

    println!();
    println!("=== {} ({}) ===", ticker.symbol(), name);
    println!(
        "  Bars:           {} ({})",
        ticker.series.bars.len(),
        ticker.series.source
    );
    for warning in ticker.series.quality.warnings() {
        println!("  Warning:        {warning}");
    }
    if let Some(snap) = &ticker.snapshot {
        print_snapshot(snap, ticker.series.timeframe);
    }
    println!("  Signals:        {}", ticker.analysis.signals.len());
    println!("  Total return:   {:.2}%", r.total_return);
    println!("  Win rate:       {:.1}%", r.win_rate);
    println!("  Avg win/loss:   {:.2}% / {:.2}%", r.avg_win, r.avg_loss);
    println!("  P/L ratio:      {:.2}", r.profit_loss_ratio);
    println!("  Max drawdown:   {:.2}%", r.max_drawdown);
    println!("  Round trips:    {}", r.total_trades);
    println!("  Final capital:  {:.2}", r.final_capital);
}

fn print_report(report: &WatchlistReport) {
    for ticker in report.successes() {
        print_ticker(ticker);
    }

    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        println!();
        println!("=== Skipped ===");
        for (ticker, err) in failures {
            println!("  {ticker}: {err}");
        }
    }

    let ranking = report.ranking();
    if ranking.is_empty() {
        return;
    }
    println!();
    println!("=== Ranking ({}) ===", report.timeframe.history_label());
    println!(
        "  {:>4}  {:<12} {:>10} {:>8} {:>8} {:>6} {:>6}",
        "#", "Symbol", "Return%", "Win%", "MaxDD%", "P/L", "Trades"
    );
    for e in &ranking {
        println!(
            "  {:>4}  {:<12} {:>10.2} {:>8.1} {:>8.2} {:>6.2} {:>6}",
            e.rank,
            e.symbol,
            e.total_return,
            e.win_rate,
            e.max_drawdown,
            e.profit_loss_ratio,
            e.total_trades
        );
    }
}

// ─── watchlist ──────────────────────────────────────────────────────

fn run_watchlist(action: WatchlistAction, store: Option<PathBuf>) -> Result<()> {
    let mut store = open_store(store)?;
    match action {
        WatchlistAction::Show => {}
        WatchlistAction::Set { list } => {
            let tickers = parse_tickers(&list);
            if tickers.is_empty() {
                bail!("watchlist '{list}' contains no tickers");
            }
            save_watchlist(&mut store, &tickers)?;
        }
        WatchlistAction::Add { ticker } => {
            if !add_ticker(&mut store, &ticker)? {
                println!("{} is already on the watchlist", canonical_code(&ticker));
            }
        }
        WatchlistAction::Remove { ticker } => {
            if !remove_ticker(&mut store, &ticker)? {
                println!("{} is not on the watchlist", canonical_code(&ticker));
            }
        }
    }

    let tickers = load_watchlist(&store);
    println!("Watchlist ({}): {}", tickers.len(), tickers.join(", "));
    Ok(())
}
