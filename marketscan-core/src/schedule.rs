//! Incremental scheduler — the minimal suffix of a series worth re-evaluating.
//!
//! Policy: locate the bar carrying the latest persisted event date, back up by
//! the window lookback so that bar's averages can be re-derived exactly, and
//! re-run the detector from there with emission gated to strictly-newer dates.
//! Re-running therefore produces no duplicate events and misses none.

use chrono::NaiveDate;

use crate::config::SignalConfig;
use crate::domain::PriceBar;

/// What to feed the window engine and detector for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalPlan<'a> {
    /// Bars that seed the engine without producing points. Empty on a first
    /// evaluation.
    pub lookback: &'a [PriceBar],
    /// Bars that produce windowed points. Starts at the bar carrying the
    /// latest persisted event date (so the detector has its `prev` point), or
    /// at the series start.
    pub bars: &'a [PriceBar],
    /// Only pairs whose current date is strictly after this emit events.
    pub emit_after: Option<NaiveDate>,
}

/// Plan the incremental evaluation of `series`.
///
/// Returns `None` when there is no work: the series has fewer than
/// `short_window` bars (not an error), or no bars newer than the latest
/// persisted event date exist.
pub fn plan<'a>(
    series: &'a [PriceBar],
    latest_event_date: Option<NaiveDate>,
    config: &SignalConfig,
) -> Option<EvalPlan<'a>> {
    if series.len() < config.short_window {
        return None;
    }

    let Some(latest) = latest_event_date else {
        return Some(EvalPlan {
            lookback: &[],
            bars: series,
            emit_after: None,
        });
    };

    // First bar strictly after the latest event date.
    let next = series.partition_point(|bar| bar.trade_date <= latest);
    if next == series.len() {
        return None;
    }
    if next == 0 {
        // All bars are newer than the recorded event, e.g. the series was
        // repaired underneath us. Evaluate everything, still gated by date.
        return Some(EvalPlan {
            lookback: &[],
            bars: series,
            emit_after: Some(latest),
        });
    }

    // The bar at `next - 1` is the detector's first `prev` point; seed the
    // engine with up to max(short, long) - 1 bars before it so its averages
    // match a full-series pass.
    let anchor = next - 1;
    let start = anchor.saturating_sub(config.max_lookback());
    Some(EvalPlan {
        lookback: &series[start..anchor],
        bars: &series[anchor..],
        emit_after: Some(latest),
    })
}
