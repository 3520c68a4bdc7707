//! Shared helpers for unit tests.

use chrono::NaiveDate;

use crate::domain::PriceBar;

/// Create synthetic bars from close prices.
///
/// Generates plausible OHLCV: open = prev close (or close for the first bar),
/// high/low bracket open and close, volume = 1000, dates advance one day at a
/// time from 2024-01-02.
pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar {
                symbol: "TEST".to_string(),
                trade_date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: (open.min(close) - 1.0).max(0.01),
                close,
                volume: 1000,
                vwap: None,
                transactions: None,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for window tests.
pub const DEFAULT_EPSILON: f64 = 1e-10;
