//! MarketScan Core — signal engine: domain types, rolling windows, crossover
//! detection, incremental scheduling, and the series store boundary.
//!
//! This crate contains the heart of the signal pipeline:
//! - Domain types (price bars, signal events, company metadata)
//! - Window engine: trailing SMAs and volume baselines in one forward pass
//! - Crossover detector with tie-aware directional crossing rules
//! - Incremental scheduler for idempotent, resumable re-evaluation
//! - Series store trait with in-memory and CSV reference implementations
//!
//! Data flows one direction: raw series → window engine → detector (gated by
//! the scheduler) → persisted events. Report aggregation lives in
//! `marketscan-runner`.

pub mod config;
pub mod detect;
pub mod domain;
pub mod schedule;
pub mod store;
pub mod window;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{ConfigError, ReportConfig, SignalConfig};
pub use detect::detect_crossovers;
pub use domain::{Company, EventKey, EventType, PriceBar, SignalEvent};
pub use schedule::{plan, EvalPlan};
pub use store::{CsvStore, MemoryStore, SeriesStore, StoreError};
pub use window::{windowed_points, RollingMean, WindowEngine, WindowedPoint};
