//! Criterion benchmarks for the analysis hot paths.
//!
//! Benchmarks:
//! 1. Indicator frame (MAs, slow stochastic, RSI)
//! 2. Signal detection over a precomputed frame
//! 3. Backtest simulation over precomputed signals
//! 4. Full pipeline at several series lengths

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use stochlab_core::{
    AnalysisConfig, Bar, BacktestSimulator, IndicatorFrame, Pipeline, SignalDetector,
    StrategyParams,
};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2020, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0 + (i as f64 * 0.013).cos() * 4.0;
            Bar::new(
                base + chrono::Duration::days(i as i64),
                close - 0.3,
                close + 1.5,
                close - 1.5,
                close,
                1_000_000.0 + (i % 500_000) as f64,
            )
        })
        .collect()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let bars = make_bars(5_000);
    let params = StrategyParams::default();
    c.bench_function("indicator_frame_5000", |b| {
        b.iter(|| IndicatorFrame::compute(black_box(&bars), &params))
    });
}

fn bench_detector(c: &mut Criterion) {
    let bars = make_bars(5_000);
    let params = StrategyParams::default();
    let frame = IndicatorFrame::compute(&bars, &params);
    let detector = SignalDetector::from_params(&params);
    c.bench_function("detect_5000", |b| {
        b.iter(|| detector.detect(black_box(&bars), black_box(&frame)))
    });
}

fn bench_backtest(c: &mut Criterion) {
    let bars = make_bars(5_000);
    let params = StrategyParams::default();
    let frame = IndicatorFrame::compute(&bars, &params);
    let signals = SignalDetector::from_params(&params).detect(&bars, &frame);
    let simulator = BacktestSimulator::default();
    c.bench_function("backtest_5000", |b| {
        b.iter(|| simulator.run(black_box(&bars), black_box(&signals)))
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let pipeline = Pipeline::new(AnalysisConfig::default()).unwrap();

    for n in [500usize, 2_000, 5_000] {
        let bars = make_bars(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &bars, |b, bars| {
            b.iter(|| pipeline.run(black_box(bars)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_indicators,
    bench_detector,
    bench_backtest,
    bench_pipeline,
);
criterion_main!(benches);
