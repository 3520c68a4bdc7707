//! Serializable engine and report configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by configuration validation, before any computation begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("window sizes must be positive (short={short}, long={long}, volume={volume})")]
    NonPositiveWindow {
        short: usize,
        long: usize,
        volume: usize,
    },

    #[error("short window ({short}) must be smaller than long window ({long})")]
    ShortNotBelowLong { short: usize, long: usize },

    #[error("gain threshold must be finite (got {0})")]
    InvalidGainThreshold(f64),

    #[error("volume spike multiple must be positive and finite (got {0})")]
    InvalidSpikeMultiple(f64),

    #[error("lookback days must be at least 1 (got {0})")]
    InvalidLookback(u32),
}

/// Window configuration for the signal engine.
///
/// Defaults match the classic 50/200-day crossover setup with a 30-day
/// volume baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Short moving-average window, in trading bars.
    pub short_window: usize,
    /// Long moving-average window, in trading bars.
    pub long_window: usize,
    /// Rolling volume baseline window, in trading bars.
    pub volume_window: usize,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            short_window: 50,
            long_window: 200,
            volume_window: 30,
        }
    }
}

impl SignalConfig {
    pub fn new(short_window: usize, long_window: usize, volume_window: usize) -> Self {
        Self {
            short_window,
            long_window,
            volume_window,
        }
    }

    /// Validate the window invariants. `short_window >= long_window` is a
    /// configuration error, not a runtime condition.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.short_window == 0 || self.long_window == 0 || self.volume_window == 0 {
            return Err(ConfigError::NonPositiveWindow {
                short: self.short_window,
                long: self.long_window,
                volume: self.volume_window,
            });
        }
        if self.short_window >= self.long_window {
            return Err(ConfigError::ShortNotBelowLong {
                short: self.short_window,
                long: self.long_window,
            });
        }
        Ok(())
    }

    /// Bars required before a resumption point so the first re-evaluated
    /// point's averages match a full-series pass.
    pub fn max_lookback(&self) -> usize {
        self.short_window.max(self.long_window).saturating_sub(1)
    }

    /// Deterministic content hash of this configuration.
    ///
    /// Two runs with identical window settings share a hash, which is what
    /// makes logged run identifiers comparable across invocations.
    pub fn config_hash(&self) -> String {
        let json = serde_json::to_string(self).expect("SignalConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

/// Thresholds and list sizes for report aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Minimum day-over-day percent change for the gainers section.
    pub gain_threshold: f64,
    /// Target-day volume must be at least this multiple of the rolling
    /// baseline to count as a spike.
    pub volume_spike_multiple: f64,
    /// Symbols listed in the trailing report's top-performers section.
    pub top_stock_count: usize,
    /// Groups listed in the trailing report's industry section.
    pub top_group_count: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            gain_threshold: 10.0,
            volume_spike_multiple: 3.0,
            top_stock_count: 20,
            top_group_count: 10,
        }
    }
}

impl ReportConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gain_threshold.is_finite() {
            return Err(ConfigError::InvalidGainThreshold(self.gain_threshold));
        }
        if !self.volume_spike_multiple.is_finite() || self.volume_spike_multiple <= 0.0 {
            return Err(ConfigError::InvalidSpikeMultiple(self.volume_spike_multiple));
        }
        Ok(())
    }
}
