//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Window correctness — rolling averages equal direct summation everywhere
//! 2. No look-ahead — an event depends only on bars up to its event date
//! 3. Resumability — prefix + resumed suffix equals one full pass
//! 4. Idempotence — re-running the pipeline writes nothing new

use proptest::prelude::*;
use std::collections::BTreeSet;

use chrono::NaiveDate;
use marketscan_core::{
    detect_crossovers, plan, windowed_points, MemoryStore, PriceBar, SeriesStore, SignalConfig,
};

fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar {
                symbol: "PROP".to_string(),
                trade_date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: (open.min(close) - 1.0).max(0.01),
                close,
                volume: 1_000_000,
                vwap: None,
                transactions: None,
            }
        })
        .collect()
}

fn event_keys(
    events: &[marketscan_core::SignalEvent],
) -> BTreeSet<(NaiveDate, marketscan_core::EventType)> {
    events.iter().map(|e| (e.event_date, e.event_type)).collect()
}

// ── Strategies ───────────────────────────────────────────────────────

fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(
        (100..20_000u32).prop_map(|cents| cents as f64 / 100.0),
        12..90,
    )
}

fn arb_windows() -> impl Strategy<Value = (usize, usize)> {
    (1usize..6).prop_flat_map(|short| (Just(short), (short + 1)..12))
}

// ── 1. Window correctness ────────────────────────────────────────────

proptest! {
    /// Every defined average equals the direct mean of the trailing window.
    #[test]
    fn rolling_averages_match_direct_summation(
        closes in arb_closes(),
        (short, long) in arb_windows(),
    ) {
        let bars = make_bars(&closes);
        let config = SignalConfig::new(short, long, 5);
        let points = windowed_points(&config, &[], &bars);

        for (i, point) in points.iter().enumerate() {
            match point.short_avg {
                Some(avg) if i + 1 >= short => {
                    let direct: f64 =
                        closes[i + 1 - short..=i].iter().sum::<f64>() / short as f64;
                    prop_assert!((avg - direct).abs() < 1e-9);
                }
                Some(_) => prop_assert!(false, "short avg defined too early at {i}"),
                None => prop_assert!(i + 1 < short),
            }
            match point.long_avg {
                Some(avg) if i + 1 >= long => {
                    let direct: f64 =
                        closes[i + 1 - long..=i].iter().sum::<f64>() / long as f64;
                    prop_assert!((avg - direct).abs() < 1e-9);
                }
                Some(_) => prop_assert!(false, "long avg defined too early at {i}"),
                None => prop_assert!(i + 1 < long),
            }
        }
    }
}

// ── 2. No look-ahead ─────────────────────────────────────────────────

proptest! {
    /// Truncating the series after a date never changes the events at or
    /// before that date.
    #[test]
    fn events_do_not_depend_on_future_bars(
        closes in arb_closes(),
        (short, long) in arb_windows(),
        cut in 2usize..80,
    ) {
        let bars = make_bars(&closes);
        prop_assume!(cut < bars.len());
        let config = SignalConfig::new(short, long, 5);

        let full_points = windowed_points(&config, &[], &bars);
        let full = detect_crossovers(&full_points, "PROP", None);

        let cut_points = windowed_points(&config, &[], &bars[..cut]);
        let truncated = detect_crossovers(&cut_points, "PROP", None);

        let cutoff_date = bars[cut - 1].trade_date;
        let expected: BTreeSet<_> = event_keys(&full)
            .into_iter()
            .filter(|(date, _)| *date <= cutoff_date)
            .collect();
        prop_assert_eq!(event_keys(&truncated), expected);
    }
}

// ── 3. Resumability ──────────────────────────────────────────────────

proptest! {
    /// Computing events for bars [0, k] then resuming over the remainder
    /// (with the scheduler's lookback) produces the same set as one pass.
    #[test]
    fn prefix_then_resume_equals_full_pass(
        closes in arb_closes(),
        (short, long) in arb_windows(),
        k in 3usize..80,
    ) {
        let bars = make_bars(&closes);
        prop_assume!(k < bars.len());
        let config = SignalConfig::new(short, long, 5);

        let full_points = windowed_points(&config, &[], &bars);
        let full = detect_crossovers(&full_points, "PROP", None);

        // First run over the prefix only.
        let prefix_points = windowed_points(&config, &[], &bars[..k]);
        let prefix_events = detect_crossovers(&prefix_points, "PROP", None);
        let latest = prefix_events.iter().map(|e| e.event_date).max();

        // Resume over the whole series, gated by the persisted state.
        let mut combined = event_keys(&prefix_events);
        if let Some(eval) = plan(&bars, latest, &config) {
            let points = windowed_points(&config, eval.lookback, eval.bars);
            let resumed = detect_crossovers(&points, "PROP", eval.emit_after);
            combined.extend(event_keys(&resumed));
        }

        prop_assert_eq!(combined, event_keys(&full));
    }
}

// ── 4. Idempotence ───────────────────────────────────────────────────

proptest! {
    /// Running the full pipeline twice over the same series persists the same
    /// event set as running it once; the second run writes zero rows.
    #[test]
    fn pipeline_rerun_writes_nothing(
        closes in arb_closes(),
        (short, long) in arb_windows(),
    ) {
        let bars = make_bars(&closes);
        let config = SignalConfig::new(short, long, 5);
        let store = MemoryStore::new();
        store.upsert_bars("PROP", &bars).unwrap();

        let mut run = || -> usize {
            let series = store.read_series("PROP", None).unwrap();
            let latest = store.read_latest_event_date("PROP").unwrap();
            let Some(eval) = plan(&series, latest, &config) else {
                return 0;
            };
            let points = windowed_points(&config, eval.lookback, eval.bars);
            let events = detect_crossovers(&points, "PROP", eval.emit_after);
            store.write_events(&events).unwrap()
        };

        let first = run();
        let second = run();
        prop_assert_eq!(second, 0);
        prop_assert_eq!(store.event_count(), first);
    }
}
