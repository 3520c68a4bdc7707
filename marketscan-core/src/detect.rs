//! Crossover detector — turns a windowed series into discrete signal events.
//!
//! Each adjacent pair of points (prev, curr) is evaluated independently for
//! three families:
//! - short average vs long average (golden / death cross)
//! - close vs short average (price_cross_short_up / _down)
//! - close vs long average (price_cross_long_up / _down)
//!
//! Equality at the boundary counts as "not yet crossed": a flat touch followed
//! by continuation in the same direction is not a re-cross, and a single tie
//! point does not itself emit — only the next strict inequality does. A pair
//! where either point lacks a required average produces no event for that
//! family.

use chrono::NaiveDate;

use crate::domain::{EventType, SignalEvent};
use crate::window::WindowedPoint;

/// Detect crossings over adjacent pairs of `points`.
///
/// When `emit_after` is set, pairs whose current point is on or before that
/// date are evaluated for window continuity but emit nothing; this is how
/// incremental re-runs avoid duplicate emission. Output is ordered by
/// event_date ascending, then by the canonical [`EventType`] order.
pub fn detect_crossovers(
    points: &[WindowedPoint],
    symbol: &str,
    emit_after: Option<NaiveDate>,
) -> Vec<SignalEvent> {
    let mut events = Vec::new();

    for pair in points.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        if emit_after.is_some_and(|cutoff| curr.trade_date <= cutoff) {
            continue;
        }

        let mut emit = |event_type: EventType| {
            events.push(SignalEvent {
                symbol: symbol.to_string(),
                event_date: curr.trade_date,
                event_type,
                close: curr.close,
                short_avg: curr.short_avg,
                long_avg: curr.long_avg,
            });
        };

        // Moving-average crossing: needs both averages on both points.
        if let (Some(ps), Some(pl), Some(cs), Some(cl)) =
            (prev.short_avg, prev.long_avg, curr.short_avg, curr.long_avg)
        {
            if ps <= pl && cs > cl {
                emit(EventType::GoldenCross);
            } else if ps >= pl && cs < cl {
                emit(EventType::DeathCross);
            }
        }

        // Price vs short average.
        if let (Some(ps), Some(cs)) = (prev.short_avg, curr.short_avg) {
            if prev.close <= ps && curr.close > cs {
                emit(EventType::PriceCrossShortUp);
            } else if prev.close >= ps && curr.close < cs {
                emit(EventType::PriceCrossShortDown);
            }
        }

        // Price vs long average.
        if let (Some(pl), Some(cl)) = (prev.long_avg, curr.long_avg) {
            if prev.close <= pl && curr.close > cl {
                emit(EventType::PriceCrossLongUp);
            } else if prev.close >= pl && curr.close < cl {
                emit(EventType::PriceCrossLongDown);
            }
        }
    }

    // Pair iteration already ascends by date and families run in canonical
    // order, but the persisted ordering is a contract. Make it explicit.
    events.sort_by(|a, b| (a.event_date, a.event_type).cmp(&(b.event_date, b.event_type)));
    events
}
