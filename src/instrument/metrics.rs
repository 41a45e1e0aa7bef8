//! Operation timing samples and summary statistics

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;

/// Samples kept per operation before the oldest is dropped
pub const DEFAULT_MAX_SAMPLES: usize = 100;

/// Receives one duration per timed engine call
pub trait MetricsSink {
    fn record(&self, operation: &str, duration: Duration);
}

/// Discards every sample
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn record(&self, _operation: &str, _duration: Duration) {}
}

/// Summary of the retained samples for one operation, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceStats {
    pub avg: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    pub count: usize,
}

/// Rolling window of recent durations per operation
#[derive(Debug)]
pub struct InMemoryMetrics {
    max_samples: usize,
    samples: Mutex<HashMap<String, VecDeque<f64>>>,
}

impl Default for InMemoryMetrics {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SAMPLES)
    }
}

impl InMemoryMetrics {
    pub fn new(max_samples: usize) -> Self {
        Self {
            max_samples: max_samples.max(1),
            samples: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, VecDeque<f64>>> {
        self.samples.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// `None` until the operation has at least one sample
    pub fn stats(&self, operation: &str) -> Option<PerformanceStats> {
        let samples = self.lock();
        let window = samples.get(operation).filter(|w| !w.is_empty())?;

        let mut sorted: Vec<f64> = window.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);
        let count = sorted.len();

        Some(PerformanceStats {
            avg: sorted.iter().sum::<f64>() / count as f64,
            p50: nearest_rank(&sorted, 50.0),
            p95: nearest_rank(&sorted, 95.0),
            p99: nearest_rank(&sorted, 99.0),
            count,
        })
    }

    pub fn operations(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl MetricsSink for InMemoryMetrics {
    fn record(&self, operation: &str, duration: Duration) {
        let mut samples = self.lock();
        let window = samples.entry(operation.to_string()).or_default();
        window.push_back(duration.as_secs_f64() * 1000.0);
        while window.len() > self.max_samples {
            window.pop_front();
        }
    }
}

/// Nearest-rank percentile of an ascending, non-empty slice
fn nearest_rank(sorted: &[f64], p: f64) -> f64 {
    let rank = (sorted.len() as f64 * p / 100.0).ceil() as usize;
    sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
}

/// Traffic-light rating of a single duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceBadge {
    Good,
    Warning,
    Slow,
}

impl PerformanceBadge {
    pub fn for_duration(duration: Duration) -> Self {
        let ms = duration.as_secs_f64() * 1000.0;
        if ms < 50.0 {
            PerformanceBadge::Good
        } else if ms < 100.0 {
            PerformanceBadge::Warning
        } else {
            PerformanceBadge::Slow
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            PerformanceBadge::Good => "green",
            PerformanceBadge::Warning => "yellow",
            PerformanceBadge::Slow => "red",
        }
    }

    /// Duration rounded to whole milliseconds, e.g. "42ms"
    pub fn label(duration: Duration) -> String {
        format!("{:.0}ms", duration.as_secs_f64() * 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_stats_nearest_rank() {
        let metrics = InMemoryMetrics::default();
        for v in 1..=10 {
            metrics.record("pepm", ms(v));
        }
        let stats = metrics.stats("pepm").unwrap();
        assert_eq!(stats.count, 10);
        assert_abs_diff_eq!(stats.avg, 5.5, epsilon = 1e-9);
        assert_abs_diff_eq!(stats.p50, 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(stats.p95, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(stats.p99, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_single_sample() {
        let metrics = InMemoryMetrics::default();
        metrics.record("rank", ms(7));
        let stats = metrics.stats("rank").unwrap();
        assert_abs_diff_eq!(stats.p50, 7.0, epsilon = 1e-9);
        assert!(metrics.stats("unknown").is_none());
    }

    #[test]
    fn test_window_drops_oldest() {
        let metrics = InMemoryMetrics::new(3);
        for v in [100, 1, 2, 3] {
            metrics.record("grid", ms(v));
        }
        let stats = metrics.stats("grid").unwrap();
        assert_eq!(stats.count, 3);
        assert_abs_diff_eq!(stats.avg, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_operations_and_clear() {
        let metrics = InMemoryMetrics::default();
        metrics.record("b", ms(1));
        metrics.record("a", ms(1));
        assert_eq!(metrics.operations(), vec!["a", "b"]);
        metrics.clear();
        assert!(metrics.operations().is_empty());
    }

    #[test]
    fn test_badge_thresholds() {
        assert_eq!(PerformanceBadge::for_duration(ms(49)), PerformanceBadge::Good);
        assert_eq!(PerformanceBadge::for_duration(ms(50)), PerformanceBadge::Warning);
        assert_eq!(PerformanceBadge::for_duration(ms(99)), PerformanceBadge::Warning);
        assert_eq!(PerformanceBadge::for_duration(ms(100)), PerformanceBadge::Slow);
        assert_eq!(PerformanceBadge::Slow.color(), "red");
        assert_eq!(PerformanceBadge::label(ms(42)), "42ms");
    }
}
