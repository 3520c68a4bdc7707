//! Signal events — the persisted output of the crossover detector.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The six crossing families the detector can emit.
///
/// The declaration order is the canonical persisted order for events sharing a
/// date: moving-average crossings first, then price/short crossings, then
/// price/long crossings. `Ord` derives from declaration order, so sorting by
/// `(event_date, event_type)` yields deterministic insertion order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    GoldenCross,
    DeathCross,
    PriceCrossShortUp,
    PriceCrossShortDown,
    PriceCrossLongUp,
    PriceCrossLongDown,
}

impl EventType {
    pub const ALL: [EventType; 6] = [
        EventType::GoldenCross,
        EventType::DeathCross,
        EventType::PriceCrossShortUp,
        EventType::PriceCrossShortDown,
        EventType::PriceCrossLongUp,
        EventType::PriceCrossLongDown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::GoldenCross => "golden_cross",
            EventType::DeathCross => "death_cross",
            EventType::PriceCrossShortUp => "price_cross_short_up",
            EventType::PriceCrossShortDown => "price_cross_short_down",
            EventType::PriceCrossLongUp => "price_cross_long_up",
            EventType::PriceCrossLongDown => "price_cross_long_down",
        }
    }

    /// True for the two moving-average-vs-moving-average families.
    pub fn is_ma_cross(&self) -> bool {
        matches!(self, EventType::GoldenCross | EventType::DeathCross)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown event type '{s}'"))
    }
}

/// Natural uniqueness key for a signal event.
///
/// A symbol may emit more than one event type on the same date (a price cross
/// and a moving-average cross can coincide), so uniqueness is on the triple.
pub type EventKey = (String, NaiveDate, EventType);

/// A detected crossing, persisted by the store with idempotent upsert
/// semantics on [`EventKey`].
///
/// `short_avg` / `long_avg` record whichever trailing averages were defined on
/// the event date; a price/short cross before the long window fills carries no
/// long average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub symbol: String,
    pub event_date: NaiveDate,
    pub event_type: EventType,
    pub close: f64,
    pub short_avg: Option<f64>,
    pub long_avg: Option<f64>,
}

impl SignalEvent {
    pub fn key(&self) -> EventKey {
        (self.symbol.clone(), self.event_date, self.event_type)
    }
}
