//! Rolling window engine — trailing simple moving averages and volume baselines.
//!
//! Single forward pass over a bar series, maintaining fixed-size ring buffers
//! so each bar costs O(1) amortized instead of O(window). Averages are `None`
//! until their window fills, which is what gates the detector's families.

use std::collections::VecDeque;

use chrono::NaiveDate;

use crate::config::SignalConfig;
use crate::domain::PriceBar;

/// One derived point per input bar. Never persisted; recomputed
/// deterministically from the bar series.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedPoint {
    pub trade_date: NaiveDate,
    pub close: f64,
    pub volume: u64,
    /// Mean close over the trailing short window; `None` for the first
    /// `short_window - 1` bars seen.
    pub short_avg: Option<f64>,
    /// Mean close over the trailing long window.
    pub long_avg: Option<f64>,
    /// Mean volume over the trailing volume window. Consumed only by the
    /// report aggregator's spike pass, not the detector.
    pub volume_avg: Option<f64>,
}

/// Trailing arithmetic mean over a fixed window.
///
/// Keeps a running sum and evicts the oldest sample once the buffer is full.
#[derive(Debug, Clone)]
pub struct RollingMean {
    window: usize,
    buf: VecDeque<f64>,
    sum: f64,
}

impl RollingMean {
    pub fn new(window: usize) -> Self {
        assert!(window >= 1, "rolling window must be >= 1");
        Self {
            window,
            buf: VecDeque::with_capacity(window + 1),
            sum: 0.0,
        }
    }

    /// Push a sample and return the mean of the trailing window, or `None`
    /// while fewer than `window` samples have been seen.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        self.buf.push_back(value);
        self.sum += value;
        if self.buf.len() > self.window {
            let leaving = self
                .buf
                .pop_front()
                .expect("ring buffer is non-empty after push");
            self.sum -= leaving;
        }
        (self.buf.len() == self.window).then(|| self.sum / self.window as f64)
    }

    /// Number of samples currently buffered.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// Streaming window engine: one [`WindowedPoint`] per pushed bar, in input
/// order.
///
/// To resume from an in-series offset, [`seed`](WindowEngine::seed) the engine
/// with at least `max(short, long) - 1` bars immediately preceding the suffix;
/// the first pushed point's averages then match a full-series pass. Windows
/// cannot be computed from a truncated suffix alone.
#[derive(Debug, Clone)]
pub struct WindowEngine {
    short: RollingMean,
    long: RollingMean,
    volume: RollingMean,
}

impl WindowEngine {
    pub fn new(config: &SignalConfig) -> Self {
        Self {
            short: RollingMean::new(config.short_window),
            long: RollingMean::new(config.long_window),
            volume: RollingMean::new(config.volume_window),
        }
    }

    /// Consume a lookback buffer without producing points.
    pub fn seed(&mut self, lookback: &[PriceBar]) {
        for bar in lookback {
            self.push(bar);
        }
    }

    /// Advance the windows by one bar.
    pub fn push(&mut self, bar: &PriceBar) -> WindowedPoint {
        WindowedPoint {
            trade_date: bar.trade_date,
            close: bar.close,
            volume: bar.volume,
            short_avg: self.short.push(bar.close),
            long_avg: self.long.push(bar.close),
            volume_avg: self.volume.push(bar.volume as f64),
        }
    }
}

/// Full pass: seed with `lookback`, then emit one point per bar in `bars`.
///
/// Pass an empty lookback to evaluate a series from its start.
pub fn windowed_points(
    config: &SignalConfig,
    lookback: &[PriceBar],
    bars: &[PriceBar],
) -> Vec<WindowedPoint> {
    let mut engine = WindowEngine::new(config);
    engine.seed(lookback);
    bars.iter().map(|bar| engine.push(bar)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assert_approx, make_bars, DEFAULT_EPSILON};

    fn config(short: usize, long: usize, volume: usize) -> SignalConfig {
        SignalConfig::new(short, long, volume)
    }

    #[test]
    fn rolling_mean_fills_then_rolls() {
        let mut mean = RollingMean::new(3);
        assert_eq!(mean.push(10.0), None);
        assert_eq!(mean.push(11.0), None);
        assert_approx(mean.push(12.0).unwrap(), 11.0, DEFAULT_EPSILON);
        // Window rolls: [11, 12, 13]
        assert_approx(mean.push(13.0).unwrap(), 12.0, DEFAULT_EPSILON);
        assert_eq!(mean.len(), 3);
    }

    #[test]
    fn rolling_mean_window_one_is_identity() {
        let mut mean = RollingMean::new(1);
        assert_approx(mean.push(42.0).unwrap(), 42.0, DEFAULT_EPSILON);
        assert_approx(mean.push(7.0).unwrap(), 7.0, DEFAULT_EPSILON);
    }

    #[test]
    fn short_and_long_fill_at_their_own_windows() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        let points = windowed_points(&config(2, 4, 3), &[], &bars);

        assert_eq!(points.len(), 6);
        assert!(points[0].short_avg.is_none());
        assert_approx(points[1].short_avg.unwrap(), 10.5, DEFAULT_EPSILON);
        assert!(points[2].long_avg.is_none());
        // long_avg[3] = mean(10,11,12,13) = 11.5
        assert_approx(points[3].long_avg.unwrap(), 11.5, DEFAULT_EPSILON);
        // long_avg[5] = mean(12,13,14,15) = 13.5
        assert_approx(points[5].long_avg.unwrap(), 13.5, DEFAULT_EPSILON);
    }

    #[test]
    fn averages_match_direct_summation_at_last_point() {
        let closes: Vec<f64> = (0..250).map(|i| 100.0 + (i as f64 * 0.37).sin() * 8.0).collect();
        let bars = make_bars(&closes);
        let cfg = config(50, 200, 30);
        let points = windowed_points(&cfg, &[], &bars);

        let last = points.last().unwrap();
        let n = closes.len();
        let direct_short: f64 = closes[n - 50..].iter().sum::<f64>() / 50.0;
        let direct_long: f64 = closes[n - 200..].iter().sum::<f64>() / 200.0;
        assert_approx(last.short_avg.unwrap(), direct_short, 1e-9);
        assert_approx(last.long_avg.unwrap(), direct_long, 1e-9);
    }

    #[test]
    fn volume_average_tracks_volume_window() {
        let mut bars = make_bars(&[10.0; 5]);
        for (i, bar) in bars.iter_mut().enumerate() {
            bar.volume = 1000 * (i as u64 + 1);
        }
        let points = windowed_points(&config(2, 4, 3), &[], &bars);
        assert!(points[1].volume_avg.is_none());
        // mean(1000, 2000, 3000) = 2000
        assert_approx(points[2].volume_avg.unwrap(), 2000.0, DEFAULT_EPSILON);
        // mean(3000, 4000, 5000) = 4000
        assert_approx(points[4].volume_avg.unwrap(), 4000.0, DEFAULT_EPSILON);
    }

    #[test]
    fn seeded_resume_matches_full_pass() {
        let closes: Vec<f64> = (0..40).map(|i| 50.0 + (i as f64 * 0.9).cos() * 5.0).collect();
        let bars = make_bars(&closes);
        let cfg = config(5, 12, 7);

        let full = windowed_points(&cfg, &[], &bars);

        // Resume at an arbitrary offset with a full lookback buffer.
        let split = 23;
        let lookback_start = split - cfg.max_lookback();
        let resumed = windowed_points(&cfg, &bars[lookback_start..split], &bars[split..]);

        assert_eq!(resumed.as_slice(), &full[split..]);
    }

    #[test]
    fn truncated_suffix_alone_loses_averages() {
        let bars = make_bars(&(0..30).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        let cfg = config(5, 12, 7);
        let full = windowed_points(&cfg, &[], &bars);
        let bare = windowed_points(&cfg, &[], &bars[20..]);
        // Without the lookback buffer, the early suffix points are wrongly absent.
        assert!(bare[0].long_avg.is_none());
        assert!(full[20].long_avg.is_some());
    }
}
