//! Sequential cash/position state machine.
//!
//! Per bar, in order:
//! 1. Buy-class signal while flat → buy `floor(cash / close)` shares at the close.
//! 2. Otherwise, Sell signal while long → sell every share at the close.
//! 3. Append `cash + shares * close` to the equity curve.
//!
//! A position still open after the last bar is valued at the last close for
//! the final capital only: no extra trade and no extra equity point.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::stats::BacktestResult;
use crate::config::{BacktestParams, DEFAULT_INITIAL_CAPITAL};
use crate::domain::{Bar, Trade, TradeKind};
use crate::signals::{signal_masks, Signal};

/// Everything a backtest run produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub result: BacktestResult,
    pub trades: Vec<Trade>,
    /// One mark-to-market value per bar.
    pub equity_curve: Vec<f64>,
}

impl BacktestReport {
    pub fn buy_count(&self) -> usize {
        self.trades.iter().filter(|t| t.kind == TradeKind::Buy).count()
    }

    pub fn sell_count(&self) -> usize {
        self.trades.iter().filter(|t| t.is_sell()).count()
    }
}

/// Account state during the replay.
#[derive(Debug, Clone)]
struct Account {
    cash: f64,
    shares: f64,
    last_buy_price: Option<f64>,
    /// Most recent usable close, for marking the position.
    mark: Option<f64>,
}

impl Account {
    fn new(cash: f64) -> Self {
        Self {
            cash,
            shares: 0.0,
            last_buy_price: None,
            mark: None,
        }
    }

    fn is_flat(&self) -> bool {
        self.shares <= 0.0
    }

    fn equity(&self) -> f64 {
        match self.mark {
            Some(price) if !self.is_flat() => self.cash + self.shares * price,
            _ => self.cash,
        }
    }

    fn buy(&mut self, index: usize, bar: &Bar) -> Option<Trade> {
        let price = bar.close;
        let shares = (self.cash / price).floor();
        if !shares.is_finite() || shares < 1.0 {
            return None;
        }
        self.shares = shares;
        self.cash -= shares * price;
        self.last_buy_price = Some(price);
        Some(Trade {
            kind: TradeKind::Buy,
            bar_index: index,
            timestamp: bar.timestamp,
            price,
            shares,
            profit_pct: None,
        })
    }

    fn sell(&mut self, index: usize, bar: &Bar) -> Trade {
        let price = bar.close;
        let shares = self.shares;
        self.cash += shares * price;
        self.shares = 0.0;
        let profit_pct = self
            .last_buy_price
            .filter(|&entry| entry > 0.0)
            .map(|entry| (price - entry) / entry * 100.0);
        Trade {
            kind: TradeKind::Sell,
            bar_index: index,
            timestamp: bar.timestamp,
            price,
            shares,
            profit_pct,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestSimulator {
    initial_capital: f64,
}

impl BacktestSimulator {
    pub fn new(initial_capital: f64) -> Self {
        Self { initial_capital }
    }

    pub fn from_params(params: &BacktestParams) -> Self {
        Self::new(params.initial_capital)
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    /// Replay `bars` against `signals` (indices refer to `bars`).
    pub fn run(&self, bars: &[Bar], signals: &[Signal]) -> BacktestReport {
        let (buys, sells) = signal_masks(signals, bars.len());
        let mut account = Account::new(self.initial_capital);
        let mut trades = Vec::new();
        let mut equity_curve = Vec::with_capacity(bars.len());

        for (i, bar) in bars.iter().enumerate() {
            let tradable = bar.close.is_finite() && bar.close > 0.0;
            if tradable {
                account.mark = Some(bar.close);
            }

            if buys[i] && account.is_flat() {
                if tradable {
                    if let Some(trade) = account.buy(i, bar) {
                        trace!(index = i, price = trade.price, shares = trade.shares, "buy");
                        trades.push(trade);
                    }
                }
            } else if sells[i] && !account.is_flat() && tradable {
                let trade = account.sell(i, bar);
                trace!(index = i, price = trade.price, profit_pct = ?trade.profit_pct, "sell");
                trades.push(trade);
            }

            equity_curve.push(account.equity());
        }

        let final_capital = account.equity();
        let result =
            BacktestResult::compute(&trades, &equity_curve, self.initial_capital, final_capital);
        debug!(
            bars = bars.len(),
            trades = trades.len(),
            round_trips = result.total_trades,
            total_return = result.total_return,
            "backtest complete"
        );

        BacktestReport {
            result,
            trades,
            equity_curve,
        }
    }
}

impl Default for BacktestSimulator {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_CAPITAL)
    }
}
