use std::time::{Duration, Instant};
/// Rate assumed before the first full measurement window.
pub const DEFAULT_DATA_RATE_HZ: f64 = 24.0;
/// Samples-per-second counter, recomputed once per period.
///
/// Only used for display and time-axis labels.
#[derive(Debug, Clone)]
pub struct RateEstimator {
    period: Duration,
    window_start: Instant,
    count: u64,
    rate_hz: f64,
}
impl RateEstimator {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            window_start: now,
            count: 0,
            rate_hz: DEFAULT_DATA_RATE_HZ,
        }
    }
    pub fn record(&mut self, samples: u64) {
        self.count += samples;
    }
    /// Closes the window when a full period has elapsed and returns the new
    /// rate. An empty window keeps the previous rate.
    pub fn tick(&mut self, now: Instant) -> Option<f64> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.period {
            return None;
        }
        let seconds = elapsed.as_secs_f64();
        if seconds > 0.0 && self.count > 0 {
            self.rate_hz = self.count as f64 / seconds;
        }
        self.window_start = now;
        self.count = 0;
        Some(self.rate_hz)
    }
    /// Samples counted in the window that is still open.
    pub fn window_count(&self) -> u64 {
        self.count
    }
    pub fn rate_hz(&self) -> f64 {
        self.rate_hz
    }
    pub fn set_period(&mut self, period: Duration) {
        self.period = period;
    }
    /// Drops the samples counted so far in the current window.
    pub fn restart(&mut self, now: Instant) {
        self.window_start = now;
        self.count = 0;
    }
}
