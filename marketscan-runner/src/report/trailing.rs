//! Trailing report — performance and crossings over an N-day window.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use marketscan_core::config::{ConfigError, ReportConfig};
use marketscan_core::domain::Company;
use marketscan_core::store::SeriesStore;
use marketscan_core::EventType;

use super::daily::CrossoverDigestEntry;
use super::ReportError;

/// Inclusive date window for a trailing report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportWindow {
    /// Window of `lookback_days` calendar days ending at `end` (inclusive).
    pub fn from_end_and_span(end: NaiveDate, lookback_days: u32) -> Result<Self, ConfigError> {
        if lookback_days < 1 {
            return Err(ConfigError::InvalidLookback(lookback_days));
        }
        Ok(Self {
            start: end - Duration::days(i64::from(lookback_days) - 1),
            end,
        })
    }

    /// Window length in calendar days.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// A symbol's percent change from its first to last close inside the window.
#[derive(Debug, Clone, Serialize)]
pub struct WindowPerformanceEntry {
    pub symbol: String,
    pub company_name: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_close: f64,
    pub end_close: f64,
    pub pct_change: f64,
}

/// Per-industry performance over the window.
#[derive(Debug, Clone, Serialize)]
pub struct IndustryPerformanceEntry {
    pub industry: String,
    pub avg_pct_change: f64,
    pub median_pct_change: f64,
    pub symbol_count: usize,
}

/// The trailing report document.
#[derive(Debug, Serialize)]
pub struct TrailingReport {
    pub window: ReportWindow,
    pub top_stocks: Vec<WindowPerformanceEntry>,
    pub golden_crosses: Vec<CrossoverDigestEntry>,
    pub top_industries: Vec<IndustryPerformanceEntry>,
}

/// Build the trailing report for `window`.
pub fn build_trailing_report<S>(
    store: &S,
    window: ReportWindow,
    report: &ReportConfig,
) -> Result<TrailingReport, ReportError>
where
    S: SeriesStore + ?Sized,
{
    report.validate()?;

    let companies: HashMap<String, Company> = store
        .read_companies()?
        .into_iter()
        .map(|company| (company.symbol.clone(), company))
        .collect();

    let mut performance = Vec::new();
    for symbol in store.read_symbols()? {
        let bars: Vec<_> = store
            .read_series(&symbol, Some(window.start))?
            .into_iter()
            .filter(|bar| bar.trade_date <= window.end)
            .collect();
        let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
            continue;
        };
        if first.close <= 0.0 {
            continue;
        }
        let company = companies.get(&symbol);
        performance.push(WindowPerformanceEntry {
            symbol: symbol.clone(),
            company_name: company.map(|c| c.company_name.clone()),
            start_date: first.trade_date,
            end_date: last.trade_date,
            start_close: first.close,
            end_close: last.close,
            pct_change: (last.close - first.close) / first.close * 100.0,
        });
    }
    performance.sort_by(|a, b| {
        b.pct_change
            .partial_cmp(&a.pct_change)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });

    let top_industries = industry_performance(&performance, &companies, report.top_group_count);

    let mut golden_crosses: Vec<CrossoverDigestEntry> = store
        .read_events_between(window.start, window.end)?
        .into_iter()
        .filter(|event| event.event_type == EventType::GoldenCross)
        .map(|event| CrossoverDigestEntry {
            company_name: companies.get(&event.symbol).map(|c| c.company_name.clone()),
            symbol: event.symbol,
            event_date: event.event_date,
            close: event.close,
            short_avg: event.short_avg,
            long_avg: event.long_avg,
        })
        .collect();
    golden_crosses.sort_by(|a, b| {
        (a.event_date, &a.symbol).cmp(&(b.event_date, &b.symbol))
    });

    performance.truncate(report.top_stock_count);

    Ok(TrailingReport {
        window,
        top_stocks: performance,
        golden_crosses,
        top_industries,
    })
}

fn industry_performance(
    performance: &[WindowPerformanceEntry],
    companies: &HashMap<String, Company>,
    top_n: usize,
) -> Vec<IndustryPerformanceEntry> {
    let mut groups: HashMap<&str, Vec<f64>> = HashMap::new();
    for entry in performance {
        let Some(industry) = companies
            .get(&entry.symbol)
            .and_then(|c| c.industry.as_deref())
        else {
            continue;
        };
        groups.entry(industry).or_default().push(entry.pct_change);
    }

    let mut entries: Vec<IndustryPerformanceEntry> = groups
        .into_iter()
        .map(|(industry, changes)| IndustryPerformanceEntry {
            industry: industry.to_string(),
            avg_pct_change: changes.iter().sum::<f64>() / changes.len() as f64,
            median_pct_change: median(&changes),
            symbol_count: changes.len(),
        })
        .collect();
    entries.sort_by(|a, b| {
        b.avg_pct_change
            .partial_cmp(&a.avg_pct_change)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.industry.cmp(&b.industry))
    });
    entries.truncate(top_n);
    entries
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}
