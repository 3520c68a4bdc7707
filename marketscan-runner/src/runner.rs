//! Incremental update runner — fans the signal engine out across symbols.
//!
//! Per-symbol evaluation is embarrassingly parallel: no shared mutable state,
//! and each worker's writes touch only rows keyed by its own symbol. A unit of
//! work is one symbol's incremental update, computed fully in memory before
//! the single batched write, so a failed write never leaves another symbol's
//! state inconsistent.

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use marketscan_core::config::{ConfigError, SignalConfig};
use marketscan_core::store::{SeriesStore, StoreError};
use marketscan_core::{detect_crossovers, plan, windowed_points};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

/// Options controlling the update run.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// Worker thread cap; 0 uses rayon's default.
    pub thread_cap: usize,
}

/// Per-symbol result of one incremental update.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolOutcome {
    pub symbol: String,
    /// Bars re-evaluated, lookback included.
    pub bars_evaluated: usize,
    /// Newly persisted events (duplicates skipped by the store).
    pub events_written: usize,
}

/// Aggregate result across the whole universe.
#[derive(Debug, Default, Serialize)]
pub struct UpdateSummary {
    pub symbols_processed: usize,
    /// Symbols with no work: too few bars, or no bars newer than the latest
    /// persisted event.
    pub symbols_skipped: usize,
    pub events_written: usize,
    pub outcomes: Vec<SymbolOutcome>,
}

/// Run one incremental update for every symbol in `symbols`.
///
/// Workers process disjoint symbols concurrently; results merge only here.
/// The first store error is returned after the fan-out completes — batches
/// already written by other workers remain, which is safe because every batch
/// is idempotent and independent.
pub fn run_incremental_update<S>(
    store: &S,
    symbols: &[String],
    config: &SignalConfig,
    options: &UpdateOptions,
) -> Result<UpdateSummary, RunError>
where
    S: SeriesStore + ?Sized,
{
    config.validate()?;
    log::info!(
        "processing {} symbols (short={}, long={}, config {})",
        symbols.len(),
        config.short_window,
        config.long_window,
        &config.config_hash()[..12],
    );

    let results: Vec<(String, Result<Option<SymbolOutcome>, RunError>)> =
        if options.thread_cap > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(options.thread_cap)
                .build()
                .map_err(|e| RunError::ThreadPool(e.to_string()))?;
            pool.install(|| {
                symbols
                    .par_iter()
                    .map(|symbol| (symbol.clone(), update_symbol(store, symbol, config)))
                    .collect()
            })
        } else {
            symbols
                .par_iter()
                .map(|symbol| (symbol.clone(), update_symbol(store, symbol, config)))
                .collect()
        };

    let mut summary = UpdateSummary::default();
    for (symbol, result) in results {
        match result {
            Ok(Some(outcome)) => {
                summary.symbols_processed += 1;
                summary.events_written += outcome.events_written;
                summary.outcomes.push(outcome);
            }
            Ok(None) => summary.symbols_skipped += 1,
            Err(e) => {
                log::warn!("{symbol}: update failed: {e}");
                return Err(e);
            }
        }
    }
    summary.outcomes.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    log::info!("completed: {} new events stored", summary.events_written);
    Ok(summary)
}

/// One symbol's unit of work: plan, window, detect, write.
fn update_symbol<S>(
    store: &S,
    symbol: &str,
    config: &SignalConfig,
) -> Result<Option<SymbolOutcome>, RunError>
where
    S: SeriesStore + ?Sized,
{
    let series = store.read_series(symbol, None)?;
    let latest = store.read_latest_event_date(symbol)?;

    let Some(eval) = plan(&series, latest, config) else {
        log::debug!("{symbol}: nothing to evaluate");
        return Ok(None);
    };

    let bars_evaluated = eval.lookback.len() + eval.bars.len();
    let points = windowed_points(config, eval.lookback, eval.bars);
    let events = detect_crossovers(&points, symbol, eval.emit_after);

    let events_written = if events.is_empty() {
        0
    } else {
        store.write_events(&events)?
    };
    if events_written > 0 {
        log::info!("{symbol}: recorded {events_written} new signal events");
    } else {
        log::debug!("{symbol}: no new events detected");
    }

    Ok(Some(SymbolOutcome {
        symbol: symbol.to_string(),
        bars_evaluated,
        events_written,
    }))
}
