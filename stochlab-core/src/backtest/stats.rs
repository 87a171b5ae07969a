//! Performance statistics: pure functions over trades and equity.
//!
//! All percentages are expressed in percent (10.0 = 10%), not fractions.
//! Every function returns a neutral value (0.0) on empty input.

use serde::{Deserialize, Serialize};

use crate::domain::Trade;

/// Summary of one backtest run. Always fully populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub total_return: f64,
    pub win_rate: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub profit_loss_ratio: f64,
    pub max_drawdown: f64,
    /// Completed round trips (Sell trades).
    pub total_trades: usize,
    /// Capital after force-liquidating any open position at the last close.
    pub final_capital: f64,
}

impl BacktestResult {
    pub fn compute(
        trades: &[Trade],
        equity_curve: &[f64],
        initial_capital: f64,
        final_capital: f64,
    ) -> Self {
        let sells = sell_profits(trades);
        let avg_win = average_win(&sells);
        let avg_loss = average_loss(&sells);
        Self {
            total_return: total_return(initial_capital, final_capital),
            win_rate: win_rate(&sells),
            avg_win,
            avg_loss,
            profit_loss_ratio: profit_loss_ratio(avg_win, avg_loss),
            max_drawdown: max_drawdown(equity_curve),
            total_trades: sells.len(),
            final_capital,
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Realized profit percentages of the Sell trades, in order.
pub fn sell_profits(trades: &[Trade]) -> Vec<f64> {
    trades
        .iter()
        .filter(|t| t.is_sell())
        .filter_map(|t| t.profit_pct)
        .collect()
}

/// Total return in percent of initial capital.
pub fn total_return(initial_capital: f64, final_capital: f64) -> f64 {
    if initial_capital <= 0.0 {
        return 0.0;
    }
    (final_capital - initial_capital) / initial_capital * 100.0
}

/// A closed trade wins only with strictly positive profit.
pub fn is_win(profit_pct: f64) -> bool {
    profit_pct > 0.0
}

/// Share of closed trades with strictly positive profit, in percent.
pub fn win_rate(profits: &[f64]) -> f64 {
    if profits.is_empty() {
        return 0.0;
    }
    let wins = profits.iter().filter(|&&p| is_win(p)).count();
    wins as f64 / profits.len() as f64 * 100.0
}

/// Mean profit of winning trades; 0.0 without winners.
pub fn average_win(profits: &[f64]) -> f64 {
    let wins: Vec<f64> = profits.iter().copied().filter(|&p| is_win(p)).collect();
    mean(&wins).unwrap_or(0.0)
}

/// Absolute mean profit of non-winning trades.
///
/// Floored to 1.0 when every closed trade won, so the profit/loss ratio
/// stays finite. 0.0 when there are no closed trades at all.
pub fn average_loss(profits: &[f64]) -> f64 {
    if profits.is_empty() {
        return 0.0;
    }
    let losses: Vec<f64> = profits.iter().copied().filter(|&p| !is_win(p)).collect();
    mean(&losses).map_or(1.0, f64::abs)
}

/// avg_win / avg_loss; 0.0 when avg_loss is zero.
pub fn profit_loss_ratio(avg_win: f64, avg_loss: f64) -> f64 {
    if avg_loss > 0.0 {
        avg_win / avg_loss
    } else {
        0.0
    }
}

/// Largest peak-to-trough decline of the equity curve, as a positive percent.
///
/// Returns 0.0 if equity is empty, constant or monotonically increasing.
/// Non-finite points and non-positive peaks are skipped.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let mut peak: Option<f64> = None;
    let mut max_dd = 0.0_f64;
    for &value in equity_curve.iter().filter(|v| v.is_finite()) {
        let p = match peak {
            Some(p) if p >= value => p,
            _ => {
                peak = Some(value);
                value
            }
        };
        if p > 0.0 {
            max_dd = max_dd.max((p - value) / p * 100.0);
        }
    }
    max_dd
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
