//! MarketScan Runner — orchestration on top of `marketscan-core`.
//!
//! This crate provides:
//! - Per-symbol incremental update fan-out (rayon) with batched writes
//! - Daily report aggregation (gainers, crossover digest, sector/industry
//!   leaders, volume spikes)
//! - Trailing N-day report aggregation
//! - Plain-text rendering of both report shapes
//! - Deterministic synthetic universe generation for tests and the demo mode

pub mod report;
pub mod runner;
pub mod synthetic;

pub use report::{
    build_daily_report, build_trailing_report, render_daily, render_trailing, DailyReport,
    ReportError, ReportWindow, TrailingReport,
};
pub use runner::{run_incremental_update, RunError, SymbolOutcome, UpdateOptions, UpdateSummary};
pub use synthetic::{generate_universe, make_series, seed_store, SyntheticConfig};
