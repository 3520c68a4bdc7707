//! Daily report — one target date across the stored universe.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use marketscan_core::config::{ReportConfig, SignalConfig};
use marketscan_core::domain::{Company, SignalEvent};
use marketscan_core::store::SeriesStore;
use marketscan_core::{windowed_points, EventType};

use super::ReportError;

/// A security that gained at least the configured threshold day-over-day.
#[derive(Debug, Clone, Serialize)]
pub struct GainerEntry {
    pub symbol: String,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub close: f64,
    pub prev_close: f64,
    pub pct_change: f64,
}

/// A persisted moving-average crossing, enriched for display.
#[derive(Debug, Clone, Serialize)]
pub struct CrossoverDigestEntry {
    pub symbol: String,
    pub company_name: Option<String>,
    pub event_date: NaiveDate,
    pub close: f64,
    pub short_avg: Option<f64>,
    pub long_avg: Option<f64>,
}

/// Golden and death crosses on the target date, grouped by type.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrossoverDigest {
    pub golden_cross: Vec<CrossoverDigestEntry>,
    pub death_cross: Vec<CrossoverDigestEntry>,
}

/// Per-group mean performance plus the single best member.
#[derive(Debug, Clone, Serialize)]
pub struct GroupLeaderEntry {
    pub group: String,
    pub avg_pct_change: f64,
    pub symbol_count: usize,
    pub top_symbol: String,
    pub top_pct_change: f64,
    pub top_company: Option<String>,
}

/// Target-day volume at or above a multiple of the trailing baseline.
#[derive(Debug, Clone, Serialize)]
pub struct VolumeSpikeEntry {
    pub symbol: String,
    pub company_name: Option<String>,
    pub volume: u64,
    /// Rolling volume average ending the prior trading day.
    pub baseline: f64,
    pub ratio: f64,
    pub pct_change: Option<f64>,
}

/// The daily report document. Field names and grouping are the contract
/// surface other tooling may depend on.
#[derive(Debug, Serialize)]
pub struct DailyReport {
    pub report_date: NaiveDate,
    pub gainers: Vec<GainerEntry>,
    pub crossovers: CrossoverDigest,
    pub sector_leaders: Vec<GroupLeaderEntry>,
    pub industry_leaders: Vec<GroupLeaderEntry>,
    pub volume_spikes: Vec<VolumeSpikeEntry>,
}

/// One symbol's enriched state on the target date. Internal to the passes.
#[derive(Debug, Clone)]
struct DayRow {
    symbol: String,
    company_name: Option<String>,
    sector: Option<String>,
    industry: Option<String>,
    close: f64,
    prev_close: Option<f64>,
    pct_change: Option<f64>,
    volume: u64,
    /// Rolling volume average ending the prior trading day, present only
    /// when a full volume window of prior bars exists.
    volume_baseline: Option<f64>,
}

/// Build the daily report for `report_date`.
///
/// Symbols with no bar on the target date are omitted from every pass; a
/// universe with no data at all yields a valid, empty report.
pub fn build_daily_report<S>(
    store: &S,
    report_date: NaiveDate,
    signal: &SignalConfig,
    report: &ReportConfig,
) -> Result<DailyReport, ReportError>
where
    S: SeriesStore + ?Sized,
{
    signal.validate()?;
    report.validate()?;

    let companies: HashMap<String, Company> = store
        .read_companies()?
        .into_iter()
        .map(|company| (company.symbol.clone(), company))
        .collect();

    let mut rows = Vec::new();
    for symbol in store.read_symbols()? {
        let series = store.read_series(&symbol, None)?;
        let Some(row) = day_row(&symbol, &series, report_date, signal, &companies) else {
            log::debug!("{symbol}: no bar on {report_date}, skipping");
            continue;
        };
        rows.push(row);
    }

    let events = store.read_events_on(report_date)?;

    Ok(DailyReport {
        report_date,
        gainers: gainers(&rows, report.gain_threshold),
        crossovers: crossover_digest(&events, &companies),
        sector_leaders: group_leaders(&rows, |row| row.sector.as_deref()),
        industry_leaders: group_leaders(&rows, |row| row.industry.as_deref()),
        volume_spikes: volume_spikes(&rows, report.volume_spike_multiple),
    })
}

fn day_row(
    symbol: &str,
    series: &[marketscan_core::PriceBar],
    report_date: NaiveDate,
    signal: &SignalConfig,
    companies: &HashMap<String, Company>,
) -> Option<DayRow> {
    let idx = series
        .binary_search_by_key(&report_date, |bar| bar.trade_date)
        .ok()?;
    let bar = &series[idx];

    let prev_close = (idx > 0).then(|| series[idx - 1].close);
    let pct_change = prev_close
        .filter(|&prev| prev > 0.0)
        .map(|prev| (bar.close - prev) / prev * 100.0);

    // Baseline ends the prior day so the spike day never contaminates its
    // own average.
    let volume_baseline = if idx >= signal.volume_window {
        windowed_points(signal, &[], &series[..idx])
            .last()
            .and_then(|point| point.volume_avg)
    } else {
        None
    };

    let company = companies.get(symbol);
    Some(DayRow {
        symbol: symbol.to_string(),
        company_name: company.map(|c| c.company_name.clone()),
        sector: company.and_then(|c| c.sector.clone()),
        industry: company.and_then(|c| c.industry.clone()),
        close: bar.close,
        prev_close,
        pct_change,
        volume: bar.volume,
        volume_baseline,
    })
}

fn gainers(rows: &[DayRow], threshold: f64) -> Vec<GainerEntry> {
    let mut entries: Vec<GainerEntry> = rows
        .iter()
        .filter_map(|row| {
            let pct_change = row.pct_change?;
            if pct_change < threshold {
                return None;
            }
            Some(GainerEntry {
                symbol: row.symbol.clone(),
                company_name: row.company_name.clone(),
                sector: row.sector.clone(),
                industry: row.industry.clone(),
                close: row.close,
                prev_close: row.prev_close.expect("pct_change implies prev_close"),
                pct_change,
            })
        })
        .collect();
    entries.sort_by(|a, b| {
        b.pct_change
            .partial_cmp(&a.pct_change)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    entries
}

fn crossover_digest(
    events: &[SignalEvent],
    companies: &HashMap<String, Company>,
) -> CrossoverDigest {
    let mut digest = CrossoverDigest::default();
    for event in events {
        let entry = CrossoverDigestEntry {
            symbol: event.symbol.clone(),
            company_name: companies.get(&event.symbol).map(|c| c.company_name.clone()),
            event_date: event.event_date,
            close: event.close,
            short_avg: event.short_avg,
            long_avg: event.long_avg,
        };
        match event.event_type {
            EventType::GoldenCross => digest.golden_cross.push(entry),
            EventType::DeathCross => digest.death_cross.push(entry),
            _ => {}
        }
    }
    digest.golden_cross.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    digest.death_cross.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    digest
}

fn group_leaders<'a>(
    rows: &'a [DayRow],
    group_of: impl Fn(&'a DayRow) -> Option<&'a str>,
) -> Vec<GroupLeaderEntry> {
    let mut groups: HashMap<&str, Vec<&DayRow>> = HashMap::new();
    for row in rows {
        if row.pct_change.is_none() {
            continue;
        }
        if let Some(group) = group_of(row) {
            groups.entry(group).or_default().push(row);
        }
    }

    let mut entries: Vec<GroupLeaderEntry> = groups
        .into_iter()
        .map(|(group, members)| {
            let changes: Vec<f64> = members
                .iter()
                .filter_map(|row| row.pct_change)
                .collect();
            let avg = changes.iter().sum::<f64>() / changes.len() as f64;
            let top = members
                .iter()
                .max_by(|a, b| {
                    let (ac, bc) = (
                        a.pct_change.unwrap_or(f64::MIN),
                        b.pct_change.unwrap_or(f64::MIN),
                    );
                    ac.partial_cmp(&bc)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        // On a tie, prefer the lexically-smaller symbol.
                        .then_with(|| b.symbol.cmp(&a.symbol))
                })
                .expect("group has at least one member");
            GroupLeaderEntry {
                group: group.to_string(),
                avg_pct_change: avg,
                symbol_count: members.len(),
                top_symbol: top.symbol.clone(),
                top_pct_change: top.pct_change.unwrap_or(0.0),
                top_company: top.company_name.clone(),
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.avg_pct_change
            .partial_cmp(&a.avg_pct_change)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.group.cmp(&b.group))
    });
    entries
}

fn volume_spikes(rows: &[DayRow], multiple: f64) -> Vec<VolumeSpikeEntry> {
    let mut entries: Vec<VolumeSpikeEntry> = rows
        .iter()
        .filter_map(|row| {
            let baseline = row.volume_baseline.filter(|&b| b > 0.0)?;
            if (row.volume as f64) < baseline * multiple {
                return None;
            }
            Some(VolumeSpikeEntry {
                symbol: row.symbol.clone(),
                company_name: row.company_name.clone(),
                volume: row.volume,
                baseline,
                ratio: row.volume as f64 / baseline,
                pct_change: row.pct_change,
            })
        })
        .collect();
    entries.sort_by(|a, b| {
        b.volume
            .cmp(&a.volume)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketscan_core::{MemoryStore, PriceBar};

    fn bars_with_volumes(symbol: &str, closes: &[f64], volumes: &[u64]) -> Vec<PriceBar> {
        assert_eq!(closes.len(), volumes.len());
        let base_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        closes
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (&close, &volume))| PriceBar {
                symbol: symbol.to_string(),
                trade_date: base_date + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: (close - 1.0).max(0.01),
                close,
                volume,
                vwap: None,
                transactions: None,
            })
            .collect()
    }

    #[test]
    fn gainer_threshold_brackets_the_jump() {
        // 12 → 14 is +16.67%.
        let store = MemoryStore::new();
        let closes = [10.0, 10.0, 10.0, 10.0, 10.0, 12.0, 14.0];
        let volumes = [1000u64; 7];
        let bars = bars_with_volumes("JMP", &closes, &volumes);
        let target = bars.last().unwrap().trade_date;
        store.upsert_bars("JMP", &bars).unwrap();

        let signal = SignalConfig::new(2, 4, 3);

        let loose = ReportConfig {
            gain_threshold: 15.0,
            ..ReportConfig::default()
        };
        let report = build_daily_report(&store, target, &signal, &loose).unwrap();
        assert_eq!(report.gainers.len(), 1);
        assert_eq!(report.gainers[0].symbol, "JMP");
        assert!((report.gainers[0].pct_change - 16.666_666_666_666_664).abs() < 1e-9);

        let strict = ReportConfig {
            gain_threshold: 20.0,
            ..ReportConfig::default()
        };
        let report = build_daily_report(&store, target, &signal, &strict).unwrap();
        assert!(report.gainers.is_empty());
    }

    #[test]
    fn volume_spike_uses_prior_day_baseline() {
        // 30 prior bars averaging 1,000,000; the target day itself is huge
        // but must not contaminate its own baseline.
        let store = MemoryStore::new();
        let mut closes = vec![50.0; 31];
        let mut volumes = vec![1_000_000u64; 31];
        closes[30] = 51.0;
        volumes[30] = 3_200_000;
        let bars = bars_with_volumes("SPK", &closes, &volumes);
        let target = bars.last().unwrap().trade_date;
        store.upsert_bars("SPK", &bars).unwrap();

        let signal = SignalConfig::new(2, 4, 30);
        let report =
            build_daily_report(&store, target, &signal, &ReportConfig::default()).unwrap();
        assert_eq!(report.volume_spikes.len(), 1);
        let spike = &report.volume_spikes[0];
        assert_eq!(spike.volume, 3_200_000);
        assert!((spike.baseline - 1_000_000.0).abs() < 1e-6);
        assert!((spike.ratio - 3.2).abs() < 1e-9);
    }

    #[test]
    fn below_multiple_volume_is_not_a_spike() {
        let store = MemoryStore::new();
        let closes = vec![50.0; 31];
        let mut volumes = vec![1_000_000u64; 31];
        volumes[30] = 2_900_000;
        let bars = bars_with_volumes("SPK", &closes, &volumes);
        let target = bars.last().unwrap().trade_date;
        store.upsert_bars("SPK", &bars).unwrap();

        let signal = SignalConfig::new(2, 4, 30);
        let report =
            build_daily_report(&store, target, &signal, &ReportConfig::default()).unwrap();
        assert!(report.volume_spikes.is_empty());
    }

    #[test]
    fn too_few_prior_bars_is_not_a_spike() {
        // Only 10 prior bars with volume_window=30: excluded, not flagged.
        let store = MemoryStore::new();
        let closes = vec![50.0; 11];
        let mut volumes = vec![1_000_000u64; 11];
        volumes[10] = 9_000_000;
        let bars = bars_with_volumes("SPK", &closes, &volumes);
        let target = bars.last().unwrap().trade_date;
        store.upsert_bars("SPK", &bars).unwrap();

        let signal = SignalConfig::new(2, 4, 30);
        let report =
            build_daily_report(&store, target, &signal, &ReportConfig::default()).unwrap();
        assert!(report.volume_spikes.is_empty());
    }

    #[test]
    fn groups_with_no_data_are_omitted() {
        let store = MemoryStore::new();
        store
            .upsert_companies(&[
                Company {
                    symbol: "AAA".into(),
                    company_name: "Alpha".into(),
                    sector: Some("Technology".into()),
                    industry: Some("Software".into()),
                },
                Company {
                    symbol: "ZZZ".into(),
                    company_name: "Omega".into(),
                    sector: Some("Energy".into()),
                    industry: Some("Oil & Gas".into()),
                },
            ])
            .unwrap();

        // Only AAA has bars on the target date.
        let bars = bars_with_volumes("AAA", &[10.0, 11.0], &[1000, 1000]);
        let target = bars.last().unwrap().trade_date;
        store.upsert_bars("AAA", &bars).unwrap();

        let signal = SignalConfig::new(2, 4, 30);
        let report =
            build_daily_report(&store, target, &signal, &ReportConfig::default()).unwrap();
        assert_eq!(report.sector_leaders.len(), 1);
        assert_eq!(report.sector_leaders[0].group, "Technology");
        assert_eq!(report.sector_leaders[0].symbol_count, 1);
        assert_eq!(report.sector_leaders[0].top_symbol, "AAA");
    }

    #[test]
    fn gainers_tie_breaks_on_symbol() {
        let store = MemoryStore::new();
        for symbol in ["BBB", "AAA"] {
            let bars = bars_with_volumes(symbol, &[10.0, 12.0], &[1000, 1000]);
            store.upsert_bars(symbol, &bars).unwrap();
        }
        let target = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let signal = SignalConfig::new(2, 4, 30);
        let config = ReportConfig {
            gain_threshold: 10.0,
            ..ReportConfig::default()
        };
        let report = build_daily_report(&store, target, &signal, &config).unwrap();
        let symbols: Vec<_> = report.gainers.iter().map(|g| g.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAA", "BBB"]);
    }

    #[test]
    fn crossover_digest_groups_by_type() {
        let store = MemoryStore::new();
        let date = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        store
            .write_events(&[
                SignalEvent {
                    symbol: "GLD".into(),
                    event_date: date,
                    event_type: EventType::GoldenCross,
                    close: 10.0,
                    short_avg: Some(9.0),
                    long_avg: Some(8.5),
                },
                SignalEvent {
                    symbol: "DTH".into(),
                    event_date: date,
                    event_type: EventType::DeathCross,
                    close: 20.0,
                    short_avg: Some(21.0),
                    long_avg: Some(21.5),
                },
                // Price crosses are not part of the daily digest.
                SignalEvent {
                    symbol: "PRC".into(),
                    event_date: date,
                    event_type: EventType::PriceCrossLongUp,
                    close: 30.0,
                    short_avg: Some(29.0),
                    long_avg: Some(28.0),
                },
            ])
            .unwrap();

        let signal = SignalConfig::new(2, 4, 30);
        let report =
            build_daily_report(&store, date, &signal, &ReportConfig::default()).unwrap();
        assert_eq!(report.crossovers.golden_cross.len(), 1);
        assert_eq!(report.crossovers.golden_cross[0].symbol, "GLD");
        assert_eq!(report.crossovers.death_cross.len(), 1);
        assert_eq!(report.crossovers.death_cross[0].symbol, "DTH");
    }

    #[test]
    fn empty_universe_yields_empty_report() {
        let store = MemoryStore::new();
        let date = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        let report = build_daily_report(
            &store,
            date,
            &SignalConfig::default(),
            &ReportConfig::default(),
        )
        .unwrap();
        assert!(report.gainers.is_empty());
        assert!(report.sector_leaders.is_empty());
        assert!(report.volume_spikes.is_empty());
    }
}
