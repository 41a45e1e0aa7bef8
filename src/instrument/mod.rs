//! Instrumentation seams around the engines
//!
//! Neither seam is required for correctness: the engines are pure and the
//! no-op implementations are the defaults.

mod metrics;
mod cache;

pub use metrics::{InMemoryMetrics, MetricsSink, NoopMetrics, PerformanceBadge, PerformanceStats, DEFAULT_MAX_SAMPLES};
pub use cache::{get_or_compute, CacheProvider, Cached, MemoryCache, NoopCache};
