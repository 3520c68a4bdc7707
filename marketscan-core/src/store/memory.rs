//! In-memory series store for tests and the synthetic demo mode.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::NaiveDate;

use crate::domain::{Company, EventKey, PriceBar, SignalEvent};

use super::{SeriesStore, StoreError};

#[derive(Debug, Default)]
struct Inner {
    series: BTreeMap<String, Vec<PriceBar>>,
    companies: BTreeMap<String, Company>,
    events: BTreeMap<EventKey, SignalEvent>,
}

/// Keeps everything in sorted maps behind a single mutex. The lock is held
/// only for the duration of one boundary call, matching the store contract
/// of independent per-symbol writes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Total number of stored events, across all symbols.
    pub fn event_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.events.len()).unwrap_or(0)
    }
}

impl SeriesStore for MemoryStore {
    fn read_symbols(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.lock()?.series.keys().cloned().collect())
    }

    fn read_series(
        &self,
        symbol: &str,
        from_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, StoreError> {
        let inner = self.lock()?;
        let Some(series) = inner.series.get(symbol) else {
            return Ok(Vec::new());
        };
        let bars = match from_date {
            Some(from) => series
                .iter()
                .filter(|bar| bar.trade_date >= from)
                .cloned()
                .collect(),
            None => series.clone(),
        };
        Ok(bars)
    }

    fn read_companies(&self) -> Result<Vec<Company>, StoreError> {
        Ok(self.lock()?.companies.values().cloned().collect())
    }

    fn read_latest_event_date(&self, symbol: &str) -> Result<Option<NaiveDate>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .events
            .values()
            .filter(|event| event.symbol == symbol)
            .map(|event| event.event_date)
            .max())
    }

    fn read_events_on(&self, date: NaiveDate) -> Result<Vec<SignalEvent>, StoreError> {
        self.read_events_between(date, date)
    }

    fn read_events_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SignalEvent>, StoreError> {
        let inner = self.lock()?;
        let mut events: Vec<SignalEvent> = inner
            .events
            .values()
            .filter(|event| event.event_date >= start && event.event_date <= end)
            .cloned()
            .collect();
        events.sort_by(|a, b| {
            (a.event_date, a.event_type, &a.symbol).cmp(&(b.event_date, b.event_type, &b.symbol))
        });
        Ok(events)
    }

    fn write_events(&self, events: &[SignalEvent]) -> Result<usize, StoreError> {
        let mut inner = self.lock()?;
        let mut written = 0;
        for event in events {
            let key = event.key();
            if !inner.events.contains_key(&key) {
                inner.events.insert(key, event.clone());
                written += 1;
            }
        }
        Ok(written)
    }

    fn upsert_bars(&self, symbol: &str, bars: &[PriceBar]) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let series = inner.series.entry(symbol.to_string()).or_default();
        for bar in bars {
            match series.binary_search_by_key(&bar.trade_date, |b| b.trade_date) {
                Ok(i) => series[i] = bar.clone(),
                Err(i) => series.insert(i, bar.clone()),
            }
        }
        Ok(())
    }

    fn upsert_companies(&self, companies: &[Company]) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        for company in companies {
            inner
                .companies
                .insert(company.symbol.clone(), company.clone());
        }
        Ok(())
    }
}
