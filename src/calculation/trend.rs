//! Savings trend between two successive meter readings

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Neutral,
}

/// Magnitudes are absolute; the sign lives in `direction`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub direction: TrendDirection,
    pub percentage: f64,
    pub difference: f64,
}

/// Coerce a displayed amount to a usable value (NaN and negatives become 0)
pub fn sanitize_amount(value: f64) -> f64 {
    if value.is_nan() || value < 0.0 {
        0.0
    } else {
        value
    }
}

/// Trend of `value` relative to `previous`
///
/// `None` when there is no usable previous reading (absent, zero, negative
/// or NaN).
pub fn calculate_trend(value: f64, previous: Option<f64>) -> Option<Trend> {
    let previous = previous.map(sanitize_amount).filter(|p| *p != 0.0)?;
    let value = sanitize_amount(value);

    let difference = value - previous;
    let direction = if difference > 0.0 {
        TrendDirection::Up
    } else if difference < 0.0 {
        TrendDirection::Down
    } else {
        TrendDirection::Neutral
    };

    Some(Trend {
        direction,
        percentage: (difference / previous * 100.0).abs(),
        difference: difference.abs(),
    })
}
