//! Plain-text renderers for the report documents.

use marketscan_core::config::ReportConfig;

use super::daily::DailyReport;
use super::trailing::TrailingReport;

/// Render the daily report as the canonical text layout.
pub fn render_daily(report: &DailyReport, config: &ReportConfig) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("Daily Market Report - {}", report.report_date));
    lines.push("=".repeat(60));
    lines.push(String::new());

    lines.push(format!(
        "Stocks Up More Than {:.2}%",
        config.gain_threshold
    ));
    lines.push("-".repeat(60));
    if report.gainers.is_empty() {
        lines.push("No stocks gained above the configured threshold.".into());
    } else {
        for gainer in &report.gainers {
            lines.push(format!(
                "- {}: {} | {:.2}% (Close: {:.2}, Prev Close: {:.2}) [Sector: {} | Industry: {}]",
                gainer.symbol,
                gainer.company_name.as_deref().unwrap_or("N/A"),
                gainer.pct_change,
                gainer.close,
                gainer.prev_close,
                gainer.sector.as_deref().unwrap_or("N/A"),
                gainer.industry.as_deref().unwrap_or("N/A"),
            ));
        }
    }
    lines.push(String::new());

    lines.push("SMA Crossovers".into());
    lines.push("-".repeat(60));
    if report.crossovers.golden_cross.is_empty() && report.crossovers.death_cross.is_empty() {
        lines.push("No crossover events recorded for today.".into());
    } else {
        for (label, entries) in [
            ("golden_cross", &report.crossovers.golden_cross),
            ("death_cross", &report.crossovers.death_cross),
        ] {
            for entry in entries {
                let mut details = vec![format!("Close {:.2}", entry.close)];
                if let Some(short) = entry.short_avg {
                    details.push(format!("short SMA {short:.2}"));
                }
                if let Some(long) = entry.long_avg {
                    details.push(format!("long SMA {long:.2}"));
                }
                lines.push(format!(
                    "- {}: {} ({})",
                    entry.symbol,
                    label,
                    details.join("; ")
                ));
            }
        }
    }
    lines.push(String::new());

    for (title, leaders) in [
        ("Sector Leaders (Top Average % Gain)", &report.sector_leaders),
        (
            "Industry Leaders (Top Average % Gain)",
            &report.industry_leaders,
        ),
    ] {
        lines.push(title.into());
        lines.push("-".repeat(60));
        if leaders.is_empty() {
            lines.push("No performance data available.".into());
        } else {
            for leader in leaders {
                lines.push(format!(
                    "- {}: Avg Change {:.2}% (Top: {} {:.2}% - {})",
                    leader.group,
                    leader.avg_pct_change,
                    leader.top_symbol,
                    leader.top_pct_change,
                    leader.top_company.as_deref().unwrap_or("N/A"),
                ));
            }
        }
        lines.push(String::new());
    }

    lines.push(format!(
        "Unusual Volume (>= {:.1}x rolling average)",
        config.volume_spike_multiple
    ));
    lines.push("-".repeat(60));
    if report.volume_spikes.is_empty() {
        lines.push("No volume spikes detected.".into());
    } else {
        for spike in &report.volume_spikes {
            let change = spike
                .pct_change
                .map(|pct| format!("{pct:.2}%"))
                .unwrap_or_else(|| "N/A".into());
            lines.push(format!(
                "- {}: Volume {} (~{:.2}x avg {:.0}) | Change {}",
                spike.symbol,
                group_thousands(spike.volume),
                spike.ratio,
                spike.baseline,
                change,
            ));
        }
    }

    lines.push(String::new());
    lines.push("End of report.".into());
    lines.join("\n")
}

/// Render the trailing report as the canonical text layout.
pub fn render_trailing(report: &TrailingReport, config: &ReportConfig) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!(
        "{}-Day Market Report ({} to {})",
        report.window.span_days(),
        report.window.start,
        report.window.end
    ));
    lines.push("=".repeat(70));
    lines.push(String::new());

    lines.push(format!(
        "Top {} Stocks by Percentage Gain",
        config.top_stock_count
    ));
    lines.push("-".repeat(70));
    if report.top_stocks.is_empty() {
        lines.push("No price data available for the requested window.".into());
    } else {
        for stock in &report.top_stocks {
            lines.push(format!(
                "- {}: {} | {:.2}% (Start {}: {:.2} -> {}: {:.2})",
                stock.symbol,
                stock.company_name.as_deref().unwrap_or("N/A"),
                stock.pct_change,
                stock.start_date,
                stock.start_close,
                stock.end_date,
                stock.end_close,
            ));
        }
    }
    lines.push(String::new());

    lines.push("Golden Cross Events".into());
    lines.push("-".repeat(70));
    if report.golden_crosses.is_empty() {
        lines.push("No golden cross events recorded during the window.".into());
    } else {
        for cross in &report.golden_crosses {
            lines.push(format!(
                "- {}: {} (close={:.2})",
                cross.event_date, cross.symbol, cross.close
            ));
        }
    }
    lines.push(String::new());

    lines.push(format!(
        "Top {} Industries by Average % Gain",
        config.top_group_count
    ));
    lines.push("-".repeat(70));
    if report.top_industries.is_empty() {
        lines.push("No industry performance data available.".into());
    } else {
        for industry in &report.top_industries {
            lines.push(format!(
                "- {}: {:.2}% avg (median {:.2}%, {} symbols)",
                industry.industry,
                industry.avg_pct_change,
                industry.median_pct_change,
                industry.symbol_count,
            ));
        }
    }

    lines.join("\n")
}

/// Format an integer with thousands separators (1234567 -> "1,234,567").
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
