//! Shared bar builders for integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use stochlab_core::Bar;

pub fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// open = previous close, high/low one unit outside the body.
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar::new(
                base_time() + chrono::Duration::days(i as i64),
                open,
                open.max(close) + 1.0,
                open.min(close) - 1.0,
                close,
                1000.0,
            )
        })
        .collect()
}

/// Every OHLC field equal to the close.
pub fn flat_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            Bar::new(
                base_time() + chrono::Duration::days(i as i64),
                c,
                c,
                c,
                c,
                1000.0,
            )
        })
        .collect()
}

/// Sine swing of ±20 around 100, one cycle every ~42 bars.
pub fn sine_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + (i as f64 * 0.15).sin() * 20.0)
        .collect()
}
