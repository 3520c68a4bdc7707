//! MarketScan CLI — import, update, and report commands.
//!
//! Commands:
//! - `import` — load price bars and company metadata from CSV files
//! - `update` — compute new crossover events incrementally for all symbols
//! - `report daily` — gainers, crossovers, leaders, and volume spikes for a date
//! - `report trailing` — N-day performance and golden-cross summary
//! - `demo` — seed a synthetic universe and run the full pipeline once

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use marketscan_core::{
    Company, CsvStore, PriceBar, ReportConfig, SeriesStore, SignalConfig,
};
use marketscan_runner::report::{build_daily_report, build_trailing_report, ReportWindow};
use marketscan_runner::synthetic::{seed_store, SyntheticConfig};
use marketscan_runner::{
    render_daily, render_trailing, run_incremental_update, UpdateOptions,
};

#[derive(Parser)]
#[command(
    name = "marketscan",
    about = "MarketScan CLI — incremental SMA signal engine and market reports"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import price bars (and optionally company metadata) from CSV files.
    Import {
        /// CSV files of price bars with columns
        /// symbol,trade_date,open,high,low,close,volume,vwap,transactions.
        #[arg(required = true)]
        prices: Vec<PathBuf>,

        /// CSV file of company rows (symbol,company_name,sector,industry).
        #[arg(long)]
        companies: Option<PathBuf>,

        /// Store directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
    /// Compute new crossover events incrementally for every stored symbol.
    Update {
        /// Store directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// TOML config file with [signal] and [report] sections.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Short SMA window (overrides config file).
        #[arg(long)]
        short_window: Option<usize>,

        /// Long SMA window (overrides config file).
        #[arg(long)]
        long_window: Option<usize>,

        /// Rolling volume window (overrides config file).
        #[arg(long)]
        volume_window: Option<usize>,

        /// Worker thread cap. 0 uses the rayon default.
        #[arg(long, default_value_t = 0)]
        threads: usize,
    },
    /// Generate reports from stored bars and events.
    Report {
        #[command(subcommand)]
        kind: ReportKind,
    },
    /// Seed a synthetic universe into the store and run the full pipeline.
    Demo {
        /// Store directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Trading days to generate per symbol.
        #[arg(long, default_value_t = 300)]
        days: usize,

        /// Symbols per sector.
        #[arg(long, default_value_t = 4)]
        symbols_per_sector: usize,

        /// RNG seed; same seed, same universe.
        #[arg(long, default_value_t = 7)]
        seed: u64,
    },
}

#[derive(Subcommand)]
enum ReportKind {
    /// Daily market report for a single date.
    Daily {
        /// Report date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Store directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// TOML config file with [signal] and [report] sections.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Minimum percent gain for the gainers section (overrides config).
        #[arg(long)]
        gain_threshold: Option<f64>,

        /// Volume spike multiple (overrides config).
        #[arg(long)]
        volume_spike_multiple: Option<f64>,

        /// Rolling volume window (overrides config).
        #[arg(long)]
        volume_window: Option<usize>,

        /// Directory to also write the report file into.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Emit the structured report as JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Trailing N-day summary report.
    Trailing {
        /// Report end date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Window length in calendar days.
        #[arg(long, default_value_t = 30)]
        lookback_days: u32,

        /// Store directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// TOML config file with [signal] and [report] sections.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Symbols to list (overrides config).
        #[arg(long)]
        top_stocks: Option<usize>,

        /// Industries to list (overrides config).
        #[arg(long)]
        top_industries: Option<usize>,

        /// Directory to also write the report file into.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Emit the structured report as JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

/// Optional TOML config file: `[signal]` and `[report]` sections, both with
/// full defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    signal: SignalConfig,
    report: ReportConfig,
}

fn load_file_config(path: Option<&Path>) -> Result<FileConfig> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("read config file {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parse config file {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Import {
            prices,
            companies,
            data_dir,
        } => cmd_import(&prices, companies.as_deref(), &data_dir),
        Commands::Update {
            data_dir,
            config,
            short_window,
            long_window,
            volume_window,
            threads,
        } => {
            let file = load_file_config(config.as_deref())?;
            let mut signal = file.signal;
            if let Some(short) = short_window {
                signal.short_window = short;
            }
            if let Some(long) = long_window {
                signal.long_window = long;
            }
            if let Some(volume) = volume_window {
                signal.volume_window = volume;
            }
            cmd_update(&data_dir, &signal, threads)
        }
        Commands::Report { kind } => cmd_report(kind),
        Commands::Demo {
            data_dir,
            days,
            symbols_per_sector,
            seed,
        } => cmd_demo(&data_dir, days, symbols_per_sector, seed),
    }
}

fn cmd_import(prices: &[PathBuf], companies: Option<&Path>, data_dir: &Path) -> Result<()> {
    let store = CsvStore::open(data_dir)?;

    let mut total = 0usize;
    let mut skipped = 0usize;
    for path in prices {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("open price file {}", path.display()))?;
        let mut by_symbol: BTreeMap<String, Vec<PriceBar>> = BTreeMap::new();
        for record in reader.deserialize() {
            let bar: PriceBar =
                record.with_context(|| format!("parse price row in {}", path.display()))?;
            if !bar.is_sane() {
                log::warn!(
                    "{}: skipping insane bar for {} on {}",
                    path.display(),
                    bar.symbol,
                    bar.trade_date
                );
                skipped += 1;
                continue;
            }
            by_symbol.entry(bar.symbol.clone()).or_default().push(bar);
        }
        for (symbol, bars) in by_symbol {
            total += bars.len();
            store.upsert_bars(&symbol, &bars)?;
        }
    }
    log::info!("imported {total} bars ({skipped} skipped)");

    if let Some(path) = companies {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("open company file {}", path.display()))?;
        let mut rows: Vec<Company> = Vec::new();
        for record in reader.deserialize() {
            let company: Company =
                record.with_context(|| format!("parse company row in {}", path.display()))?;
            rows.push(company);
        }
        store.upsert_companies(&rows)?;
        log::info!("imported {} company rows", rows.len());
    }
    Ok(())
}

fn cmd_update(data_dir: &Path, signal: &SignalConfig, threads: usize) -> Result<()> {
    let store = CsvStore::open(data_dir)?;
    let symbols = store.read_symbols()?;
    if symbols.is_empty() {
        log::warn!("no symbols in store at {}", data_dir.display());
        return Ok(());
    }

    let summary = run_incremental_update(
        &store,
        &symbols,
        signal,
        &UpdateOptions {
            thread_cap: threads,
        },
    )?;
    println!(
        "Processed {} symbols ({} skipped): {} new events",
        summary.symbols_processed, summary.symbols_skipped, summary.events_written
    );
    Ok(())
}

fn cmd_report(kind: ReportKind) -> Result<()> {
    match kind {
        ReportKind::Daily {
            date,
            data_dir,
            config,
            gain_threshold,
            volume_spike_multiple,
            volume_window,
            output_dir,
            json,
        } => {
            let file = load_file_config(config.as_deref())?;
            let mut signal = file.signal;
            if let Some(volume) = volume_window {
                signal.volume_window = volume;
            }
            let mut report_config = file.report;
            if let Some(threshold) = gain_threshold {
                report_config.gain_threshold = threshold;
            }
            if let Some(multiple) = volume_spike_multiple {
                report_config.volume_spike_multiple = multiple;
            }

            let report_date = date.unwrap_or_else(today);
            let store = CsvStore::open(&data_dir)?;
            let report = build_daily_report(&store, report_date, &signal, &report_config)?;

            let content = if json {
                serde_json::to_string_pretty(&report)?
            } else {
                render_daily(&report, &report_config)
            };
            println!("{content}");

            if let Some(dir) = output_dir {
                let name = format!("report_{}.txt", report_date.format("%Y%m%d"));
                write_report_file(&dir, &name, &content)?;
            }
            Ok(())
        }
        ReportKind::Trailing {
            date,
            lookback_days,
            data_dir,
            config,
            top_stocks,
            top_industries,
            output_dir,
            json,
        } => {
            let file = load_file_config(config.as_deref())?;
            let mut report_config = file.report;
            if let Some(count) = top_stocks {
                report_config.top_stock_count = count;
            }
            if let Some(count) = top_industries {
                report_config.top_group_count = count;
            }

            let end = date.unwrap_or_else(today);
            let window = ReportWindow::from_end_and_span(end, lookback_days)?;
            let store = CsvStore::open(&data_dir)?;
            let report = build_trailing_report(&store, window, &report_config)?;

            let content = if json {
                serde_json::to_string_pretty(&report)?
            } else {
                render_trailing(&report, &report_config)
            };
            println!("{content}");

            if let Some(dir) = output_dir {
                let name = format!("trailing_report_{}.txt", end.format("%Y%m%d"));
                write_report_file(&dir, &name, &content)?;
            }
            Ok(())
        }
    }
}

fn cmd_demo(data_dir: &Path, days: usize, symbols_per_sector: usize, seed: u64) -> Result<()> {
    let store = CsvStore::open(data_dir)?;
    let synth = SyntheticConfig {
        symbols_per_sector,
        days,
        seed,
        ..SyntheticConfig::default()
    };
    seed_store(&store, &synth)?;
    log::info!("seeded synthetic universe into {}", data_dir.display());

    // Short demo windows so the crossings show up without two hundred bars
    // of warmup.
    let signal = SignalConfig::new(10, 40, 30);
    let symbols = store.read_symbols()?;
    let first_symbol = symbols.first().context("synthetic store is empty")?.clone();
    let summary =
        run_incremental_update(&store, &symbols, &signal, &UpdateOptions::default())?;
    println!(
        "Demo update: {} symbols, {} events",
        summary.symbols_processed, summary.events_written
    );

    let last_date = store
        .read_series(&first_symbol, None)?
        .last()
        .map(|bar| bar.trade_date)
        .context("synthetic series is empty")?;
    let report_config = ReportConfig::default();
    let report = build_daily_report(&store, last_date, &signal, &report_config)?;
    println!("{}", render_daily(&report, &report_config));
    Ok(())
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn write_report_file(dir: &Path, name: &str, content: &str) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create output dir {}", dir.display()))?;
    let path = dir.join(name);
    fs::write(&path, format!("{content}\n"))
        .with_context(|| format!("write report to {}", path.display()))?;
    log::info!("report written to {}", path.display());
    Ok(())
}
