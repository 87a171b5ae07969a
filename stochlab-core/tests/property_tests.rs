//! Property tests for the analysis invariants.
//!
//! Uses proptest to verify:
//! 1. Oscillator bounds: %K, %D and RSI stay within [0, 100] when defined
//! 2. Signal ordering: never on bar 0, strictly increasing indices
//! 3. Position discipline: trades alternate Buy/Sell starting with Buy
//! 4. Equity accounting: one finite, non-negative point per bar
//! 5. Determinism: identical inputs produce identical analyses

mod common;

use common::make_bars;
use proptest::prelude::*;
use stochlab_core::indicators::{Indicator, Sma};
use stochlab_core::{AnalysisConfig, Pipeline, TradeKind};

// ── Strategies (proptest) ────────────────────────────────────────────

/// Random walk of closes, bounded away from zero.
fn arb_closes(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-0.05..0.05_f64, 0..max_len).prop_map(|returns| {
        let mut price = 100.0_f64;
        returns
            .into_iter()
            .map(|r| {
                price = (price * (1.0 + r)).max(1.0);
                (price * 100.0).round() / 100.0
            })
            .collect()
    })
}

fn arb_capital() -> impl Strategy<Value = f64> {
    (1_000.0..50_000_000.0_f64).prop_map(|c| c.round())
}

// ── 1. Oscillator bounds ─────────────────────────────────────────────

proptest! {
    #[test]
    fn oscillators_stay_in_range(closes in arb_closes(300)) {
        let bars = make_bars(&closes);
        let analysis = Pipeline::new(AnalysisConfig::default()).unwrap().run(&bars);
        let frame = &analysis.frame;

        prop_assert_eq!(frame.len(), bars.len());
        for series in [&frame.k, &frame.d, &frame.rsi] {
            prop_assert_eq!(series.len(), bars.len());
            for v in series.iter().flatten() {
                prop_assert!((0.0..=100.0).contains(v), "value {} out of range", v);
            }
        }
    }

    #[test]
    fn sma_defined_exactly_after_warmup(closes in arb_closes(80), window in 1usize..30) {
        let bars = make_bars(&closes);
        let values = Sma::new(window).compute(&bars);
        prop_assert_eq!(values.len(), bars.len());
        for (i, v) in values.iter().enumerate() {
            prop_assert_eq!(v.is_some(), i + 1 >= window, "index {}", i);
        }
    }
}

// ── 2. Signal ordering ───────────────────────────────────────────────

proptest! {
    #[test]
    fn signals_are_ordered_and_never_on_first_bar(closes in arb_closes(300)) {
        let bars = make_bars(&closes);
        let analysis = Pipeline::new(AnalysisConfig::default()).unwrap().run(&bars);

        for s in &analysis.signals {
            prop_assert!(s.index > 0);
            prop_assert!(s.index < bars.len());
            prop_assert_eq!(s.timestamp, bars[s.index].timestamp);
            // both lines defined on the bar and the one before it
            prop_assert!(analysis.frame.k[s.index - 1].is_some());
            prop_assert!(analysis.frame.d[s.index - 1].is_some());
        }
        prop_assert!(analysis.signals.windows(2).all(|w| w[0].index < w[1].index));
    }
}

// ── 3 & 4. Position discipline and equity accounting ─────────────────

proptest! {
    #[test]
    fn trades_alternate_starting_with_buy(
        closes in arb_closes(400),
        capital in arb_capital(),
    ) {
        let bars = make_bars(&closes);
        let mut config = AnalysisConfig::default();
        config.backtest.initial_capital = capital;
        let report = Pipeline::new(config).unwrap().run(&bars).backtest;

        for (i, trade) in report.trades.iter().enumerate() {
            let expected = if i % 2 == 0 { TradeKind::Buy } else { TradeKind::Sell };
            prop_assert_eq!(trade.kind, expected);
            prop_assert!(trade.shares >= 1.0);
            prop_assert_eq!(trade.shares.fract(), 0.0);
        }
        let buys = report.buy_count();
        let sells = report.sell_count();
        prop_assert!(sells == buys || sells + 1 == buys);
        prop_assert_eq!(report.result.total_trades, sells);
    }

    #[test]
    fn equity_curve_is_complete_and_solvent(
        closes in arb_closes(400),
        capital in arb_capital(),
    ) {
        let bars = make_bars(&closes);
        let mut config = AnalysisConfig::default();
        config.backtest.initial_capital = capital;
        let report = Pipeline::new(config).unwrap().run(&bars).backtest;

        prop_assert_eq!(report.equity_curve.len(), bars.len());
        for e in &report.equity_curve {
            prop_assert!(e.is_finite());
            prop_assert!(*e >= 0.0);
        }
        prop_assert!(report.result.max_drawdown >= 0.0);
        prop_assert!(report.result.max_drawdown <= 100.0);
        prop_assert!((0.0..=100.0).contains(&report.result.win_rate));
    }
}

// ── 5. Determinism ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn identical_inputs_identical_outputs(closes in arb_closes(250)) {
        let bars = make_bars(&closes);
        let pipeline = Pipeline::new(AnalysisConfig::default()).unwrap();
        prop_assert_eq!(pipeline.run(&bars), pipeline.run(&bars));
    }
}
