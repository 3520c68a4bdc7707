//! Series store adapter — the persistence boundary.
//!
//! The real relational store is an external collaborator; this trait is the
//! surface the engine consumes. Two reference implementations ship with the
//! crate so the pipeline runs end-to-end: [`MemoryStore`] for tests and the
//! demo mode, [`CsvStore`] for a directory of plain CSV files.
//!
//! All calls are synchronous boundary calls with no internal retry; retry
//! policy belongs to the adapter behind the trait.

pub mod csv;
pub mod memory;

pub use self::csv::CsvStore;
pub use memory::MemoryStore;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{Company, PriceBar, SignalEvent};

/// Errors from a store implementation. Propagated unchanged to the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("malformed row in {path}: {reason}")]
    MalformedRow { path: String, reason: String },

    #[error("series for '{symbol}' is not ordered by trade date at {date}")]
    UnorderedSeries { symbol: String, date: NaiveDate },

    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Read/upsert access to price series, company metadata, and derived events.
///
/// Implementations must be shareable across the runner's per-symbol workers;
/// writes touch only rows keyed by the written events' symbols, so correct
/// partitioning needs no locking beyond the write boundary itself.
pub trait SeriesStore: Send + Sync {
    /// All symbols with at least one stored bar, ascending.
    fn read_symbols(&self) -> Result<Vec<String>, StoreError>;

    /// Ordered bar series for a symbol, optionally starting at `from_date`
    /// (inclusive). Unknown symbols read as an empty series.
    fn read_series(
        &self,
        symbol: &str,
        from_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, StoreError>;

    /// All stored company rows.
    fn read_companies(&self) -> Result<Vec<Company>, StoreError>;

    /// Latest persisted event date for a symbol across all event types.
    fn read_latest_event_date(&self, symbol: &str) -> Result<Option<NaiveDate>, StoreError>;

    /// All events on exactly `date`.
    fn read_events_on(&self, date: NaiveDate) -> Result<Vec<SignalEvent>, StoreError>;

    /// All events with `start <= event_date <= end`.
    fn read_events_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SignalEvent>, StoreError>;

    /// Idempotent upsert: rows already present on (symbol, event_date,
    /// event_type) are silently skipped. Returns the newly written count.
    fn write_events(&self, events: &[SignalEvent]) -> Result<usize, StoreError>;

    /// Insert-or-replace bars for a symbol, keyed by trade date.
    fn upsert_bars(&self, symbol: &str, bars: &[PriceBar]) -> Result<(), StoreError>;

    /// Insert-or-replace company rows, keyed by symbol.
    fn upsert_companies(&self, companies: &[Company]) -> Result<(), StoreError>;
}
