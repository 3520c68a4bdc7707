//! Synthetic universe generation — deterministic fixtures for tests and the
//! demo mode.
//!
//! Everything derives from a caller-supplied seed, so two runs with the same
//! seed produce byte-identical stores. Synthetic data is a developer
//! convenience; it never mixes with imported market data unless explicitly
//! seeded into the same store.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use marketscan_core::domain::{Company, PriceBar};
use marketscan_core::store::{SeriesStore, StoreError};

/// Sector → industries used by the generator.
const SECTORS: [(&str, &[&str]); 5] = [
    ("Technology", &["Software", "Semiconductors"]),
    ("Healthcare", &["Biotechnology", "Medical Devices"]),
    ("Energy", &["Oil & Gas", "Renewables"]),
    ("Financials", &["Banks", "Asset Management"]),
    ("Consumer", &["Retail", "Food & Beverage"]),
];

/// Parameters for the synthetic universe.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub symbols_per_sector: usize,
    pub days: usize,
    pub start_date: NaiveDate,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            symbols_per_sector: 4,
            days: 300,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 2).expect("valid date"),
            seed: 7,
        }
    }
}

/// One symbol's series: a drifting oscillation with seeded noise.
///
/// The oscillation guarantees the short and long averages actually cross,
/// which keeps demo reports and tests from being empty.
pub fn make_series(symbol: &str, days: usize, seed: u64) -> Vec<PriceBar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 2).expect("valid date");
    let base_price = rng.gen_range(20.0..200.0);
    let period = rng.gen_range(30.0..80.0);
    let amplitude = base_price * rng.gen_range(0.05..0.15);
    // Drift stays small relative to the wave so short/long averages keep
    // crossing instead of trending apart for good.
    let drift = rng.gen_range(-0.01..0.02);
    let base_volume = rng.gen_range(500_000..5_000_000u64);

    (0..days)
        .map(|i| {
            let wave = (i as f64 * std::f64::consts::TAU / period).sin() * amplitude;
            let noise = rng.gen_range(-0.005..0.005) * base_price;
            let close = (base_price + wave + drift * i as f64 + noise).max(1.0);
            let open = if i == 0 { close } else { close - noise };
            let volume =
                (base_volume as f64 * rng.gen_range(0.8..1.2)) as u64;
            PriceBar {
                symbol: symbol.to_string(),
                trade_date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) * 1.01,
                low: open.min(close) * 0.99,
                close,
                volume,
                vwap: Some((open + close) / 2.0),
                transactions: Some(volume / 100),
            }
        })
        .collect()
}

/// Generate a full universe of companies and series.
///
/// A few symbols get a final-day price jump or volume spike so the daily
/// report's gainer and unusual-volume sections have something to show.
pub fn generate_universe(config: &SyntheticConfig) -> Vec<(Company, Vec<PriceBar>)> {
    let mut universe = Vec::new();
    let mut index = 0usize;

    for (sector, industries) in SECTORS {
        for i in 0..config.symbols_per_sector {
            let symbol = format!("{}{:02}", &sector[..3].to_uppercase(), i + 1);
            let industry = industries[i % industries.len()];
            let company = Company {
                symbol: symbol.clone(),
                company_name: format!("{industry} Holdings {:02}", i + 1),
                sector: Some(sector.to_string()),
                industry: Some(industry.to_string()),
            };

            let mut bars = make_series(&symbol, config.days, config.seed ^ index as u64);
            for bar in &mut bars {
                bar.trade_date = config.start_date
                    + (bar.trade_date - NaiveDate::from_ymd_opt(2024, 1, 2).expect("valid date"));
            }
            if let Some(last) = bars.last_mut() {
                if index % 5 == 0 {
                    // Final-day breakout, large enough to clear the default
                    // gainer threshold even against the wave's worst drawdown.
                    last.close *= 1.25;
                    last.high = last.high.max(last.close);
                }
                if index % 7 == 0 {
                    last.volume *= 6;
                }
            }
            universe.push((company, bars));
            index += 1;
        }
    }
    universe
}

/// Upsert a generated universe into a store.
pub fn seed_store<S>(store: &S, config: &SyntheticConfig) -> Result<(), StoreError>
where
    S: SeriesStore + ?Sized,
{
    let universe = generate_universe(config);
    let companies: Vec<Company> = universe.iter().map(|(c, _)| c.clone()).collect();
    store.upsert_companies(&companies)?;
    for (company, bars) in &universe {
        store.upsert_bars(&company.symbol, bars)?;
    }
    Ok(())
}
