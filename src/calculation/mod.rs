//! Calculation engine: PEPM, variance against target, and savings trend
//!
//! Pure functions with no side effects. Everything else in the crate builds
//! on these formulas.

mod rounding;
mod pepm;
mod variance;
mod trend;

pub use rounding::round2;
pub use pepm::{calculate_pepm, PepmInput, PepmResult, PepmBreakdown, ZERO_MEMBER_MONTHS_ERROR};
pub use pepm::{MEDICAL_RATIO, RX_RATIO};
pub use variance::{calculate_variance, percent_diff, VarianceDirection, VarianceResult, ZERO_TARGET_WARNING};
pub use trend::{calculate_trend, sanitize_amount, Trend, TrendDirection};
