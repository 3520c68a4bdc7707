//! CSV-backed series store — one price file per symbol plus flat event and
//! company files.
//!
//! Layout under the root directory:
//! ```text
//! prices/<SYMBOL>.csv
//! companies.csv
//! events.csv
//! ```
//!
//! Event writes are read-merge-rewrite under a store-wide lock so concurrent
//! per-symbol workers serialize only at the write boundary. Price files are
//! keyed by symbol and never shared between workers.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;

use crate::domain::{Company, EventKey, PriceBar, SignalEvent};

use super::{SeriesStore, StoreError};

#[derive(Debug)]
pub struct CsvStore {
    root: PathBuf,
    events_lock: Mutex<()>,
}

impl CsvStore {
    /// Open (creating if necessary) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(root.join("prices"))?;
        Ok(Self {
            root,
            events_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn prices_path(&self, symbol: &str) -> PathBuf {
        self.root.join("prices").join(format!("{symbol}.csv"))
    }

    fn events_path(&self) -> PathBuf {
        self.root.join("events.csv")
    }

    fn companies_path(&self) -> PathBuf {
        self.root.join("companies.csv")
    }

    fn read_csv<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = ::csv::Reader::from_path(path)?;
        let mut rows = Vec::new();
        for record in reader.deserialize() {
            let row: T = record.map_err(|e| StoreError::MalformedRow {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            rows.push(row);
        }
        Ok(rows)
    }

    fn write_csv<T: serde::Serialize>(path: &Path, rows: &[T]) -> Result<(), StoreError> {
        let mut writer = ::csv::Writer::from_path(path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn read_all_events(&self) -> Result<Vec<SignalEvent>, StoreError> {
        Self::read_csv(&self.events_path())
    }
}

impl SeriesStore for CsvStore {
    fn read_symbols(&self) -> Result<Vec<String>, StoreError> {
        let mut symbols = Vec::new();
        for entry in fs::read_dir(self.root.join("prices"))? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    symbols.push(stem.to_string());
                }
            }
        }
        symbols.sort();
        Ok(symbols)
    }

    fn read_series(
        &self,
        symbol: &str,
        from_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, StoreError> {
        let path = self.prices_path(symbol);
        let bars: Vec<PriceBar> = Self::read_csv(&path)?;
        for pair in bars.windows(2) {
            if pair[1].trade_date <= pair[0].trade_date {
                return Err(StoreError::UnorderedSeries {
                    symbol: symbol.to_string(),
                    date: pair[1].trade_date,
                });
            }
        }
        Ok(match from_date {
            Some(from) => bars
                .into_iter()
                .filter(|bar| bar.trade_date >= from)
                .collect(),
            None => bars,
        })
    }

    fn read_companies(&self) -> Result<Vec<Company>, StoreError> {
        Self::read_csv(&self.companies_path())
    }

    fn read_latest_event_date(&self, symbol: &str) -> Result<Option<NaiveDate>, StoreError> {
        let _guard = self.events_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(self
            .read_all_events()?
            .iter()
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
        let _guard = self.events_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut events: Vec<SignalEvent> = self
            .read_all_events()?
            .into_iter()
            .filter(|event| event.event_date >= start && event.event_date <= end)
            .collect();
        events.sort_by(|a, b| {
            (a.event_date, a.event_type, &a.symbol).cmp(&(b.event_date, b.event_type, &b.symbol))
        });
        Ok(events)
    }

    fn write_events(&self, events: &[SignalEvent]) -> Result<usize, StoreError> {
        let _guard = self.events_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut by_key: BTreeMap<EventKey, SignalEvent> = self
            .read_all_events()?
            .into_iter()
            .map(|event| (event.key(), event))
            .collect();

        let mut written = 0;
        for event in events {
            let key = event.key();
            if !by_key.contains_key(&key) {
                by_key.insert(key, event.clone());
                written += 1;
            }
        }
        if written > 0 {
            let rows: Vec<SignalEvent> = by_key.into_values().collect();
            Self::write_csv(&self.events_path(), &rows)?;
        }
        Ok(written)
    }

    fn upsert_bars(&self, symbol: &str, bars: &[PriceBar]) -> Result<(), StoreError> {
        let path = self.prices_path(symbol);
        let mut by_date: BTreeMap<NaiveDate, PriceBar> = Self::read_csv::<PriceBar>(&path)?
            .into_iter()
            .map(|bar| (bar.trade_date, bar))
            .collect();
        for bar in bars {
            by_date.insert(bar.trade_date, bar.clone());
        }
        let rows: Vec<PriceBar> = by_date.into_values().collect();
        Self::write_csv(&path, &rows)
    }

    fn upsert_companies(&self, companies: &[Company]) -> Result<(), StoreError> {
        let mut by_symbol: BTreeMap<String, Company> = self
            .read_companies()?
            .into_iter()
            .map(|company| (company.symbol.clone(), company))
            .collect();
        for company in companies {
            by_symbol.insert(company.symbol.clone(), company.clone());
        }
        let rows: Vec<Company> = by_symbol.into_values().collect();
        Self::write_csv(&self.companies_path(), &rows)
    }
}
