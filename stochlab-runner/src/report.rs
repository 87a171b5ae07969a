//! Per-ticker snapshot of the latest bar, and cross-ticker ranking.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use stochlab_core::{Analysis, Bar, SignalKind, StrategyParams};

use crate::ticker::{currency_of, display_name, Currency};

/// Fixed RSI bands, independent of the stochastic thresholds.
pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Oversold,
    Neutral,
    Overbought,
}

impl Zone {
    /// Bands are inclusive on both ends.
    pub fn classify(value: f64, oversold: f64, overbought: f64) -> Self {
        if value <= oversold {
            Zone::Oversold
        } else if value >= overbought {
            Zone::Overbought
        } else {
            Zone::Neutral
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Zone::Oversold => "oversold",
            Zone::Neutral => "neutral",
            Zone::Overbought => "overbought",
        })
    }
}

/// State of one ticker at its most recent bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub symbol: String,
    pub name: String,
    pub currency: Currency,
    pub timestamp: NaiveDateTime,
    /// Last close; `None` when the last bar is void.
    pub close: Option<f64>,
    /// Close minus previous close; `None` on a single-bar series.
    pub change: Option<f64>,
    pub change_pct: Option<f64>,
    pub moving_averages: BTreeMap<usize, Option<f64>>,
    pub k: Option<f64>,
    pub d: Option<f64>,
    pub rsi: Option<f64>,
    pub stochastic_zone: Option<Zone>,
    pub rsi_zone: Option<Zone>,
    /// Signal on the last bar, if any.
    pub signal: Option<SignalKind>,
    pub strong_buy_now: bool,
}

impl Snapshot {
    pub fn build(
        symbol: &str,
        bars: &[Bar],
        analysis: &Analysis,
        params: &StrategyParams,
    ) -> Option<Self> {
        let last = bars.last()?;
        let point = analysis.frame.last()?;

        let prev_close = bars
            .len()
            .checked_sub(2)
            .map(|i| bars[i].close)
            .filter(|c| c.is_finite());
        let change = prev_close.map(|p| last.close - p).filter(|c| c.is_finite());
        let change_pct = prev_close
            .filter(|p| *p != 0.0)
            .map(|p| (last.close - p) / p * 100.0)
            .filter(|c| c.is_finite());

        let signal = analysis.latest_signal().map(|s| s.kind);

        Some(Self {
            symbol: symbol.to_string(),
            name: display_name(symbol),
            currency: currency_of(symbol),
            timestamp: last.timestamp,
            close: Some(last.close).filter(|c| c.is_finite()),
            change,
            change_pct,
            stochastic_zone: point
                .k
                .map(|k| Zone::classify(k, params.oversold, params.overbought)),
            rsi_zone: point
                .rsi
                .map(|r| Zone::classify(r, RSI_OVERSOLD, RSI_OVERBOUGHT)),
            moving_averages: point.moving_averages,
            k: point.k,
            d: point.d,
            rsi: point.rsi,
            signal,
            strong_buy_now: signal == Some(SignalKind::StrongBuy),
        })
    }
}

/// One row of the cross-ticker ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub rank: usize,
    pub symbol: String,
    pub total_return: f64,
    pub win_rate: f64,
    pub max_drawdown: f64,
    pub profit_loss_ratio: f64,
    pub total_trades: usize,
}

/// Order by total return, best first; ties broken by symbol.
pub fn rank<'a, I>(entries: I) -> Vec<RankedEntry>
where
    I: IntoIterator<Item = (&'a str, &'a Analysis)>,
{
    let mut rows: Vec<RankedEntry> = entries
        .into_iter()
        .map(|(symbol, analysis)| {
            let r = &analysis.backtest.result;
            RankedEntry {
                rank: 0,
                symbol: symbol.to_string(),
                total_return: r.total_return,
                win_rate: r.win_rate,
                max_drawdown: r.max_drawdown,
                profit_loss_ratio: r.profit_loss_ratio,
                total_trades: r.total_trades,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total_return
            .total_cmp(&a.total_return)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
    }
    rows
}
