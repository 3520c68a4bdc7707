//! Report aggregation — pure passes over persisted bars and events.
//!
//! Two report shapes:
//! - [`daily`]: one target date — gainers, crossover digest, sector/industry
//!   leaders, volume spikes.
//! - [`trailing`]: an N-day window — top performers, golden-cross digest,
//!   industry performance.
//!
//! Every pass is pure with respect to its inputs: same date and same stored
//! data produce the same output. A report is a rendered snapshot, not a
//! source of truth. Callers sequence event computation before reporting; this
//! module provides no cross-date coordination.

pub mod daily;
pub mod render;
pub mod trailing;

pub use daily::{
    build_daily_report, CrossoverDigest, CrossoverDigestEntry, DailyReport, GainerEntry,
    GroupLeaderEntry, VolumeSpikeEntry,
};
pub use render::{render_daily, render_trailing};
pub use trailing::{
    build_trailing_report, IndustryPerformanceEntry, ReportWindow, TrailingReport,
    WindowPerformanceEntry,
};

use thiserror::Error;

use marketscan_core::config::ConfigError;
use marketscan_core::store::StoreError;

/// Errors from report construction.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
