//! Variance of an actual metric against its target

use log::warn;
use serde::{Deserialize, Serialize};

use super::rounding::round2;

/// Warning carried by a variance computed against a zero target
pub const ZERO_TARGET_WARNING: &str = "Target is zero";

/// Sign convention: spending above target is unfavorable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarianceDirection {
    Favorable,
    Unfavorable,
    Neutral,
}

impl VarianceDirection {
    pub fn from_variance(variance: f64) -> Self {
        if variance > 0.0 {
            VarianceDirection::Unfavorable
        } else if variance < 0.0 {
            VarianceDirection::Favorable
        } else {
            VarianceDirection::Neutral
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VarianceResult {
    pub variance: f64,
    /// `f64::INFINITY` when the target is zero
    pub variance_percent: f64,
    pub direction: VarianceDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Calculate `actual - target` with percent and direction
pub fn calculate_variance(actual: f64, target: f64) -> VarianceResult {
    let variance = round2(actual - target);

    let (variance_percent, warning) = if target == 0.0 {
        warn!("variance requested against a zero target (actual {})", actual);
        (f64::INFINITY, Some(ZERO_TARGET_WARNING.to_string()))
    } else {
        (round2(variance / target * 100.0), None)
    };

    VarianceResult {
        variance,
        variance_percent,
        direction: VarianceDirection::from_variance(variance),
        warning,
    }
}

/// Percent difference shown in the reporting grid
///
/// Unlike [`calculate_variance`], a zero target reports 0 rather than
/// infinity.
pub fn percent_diff(actual: f64, target: f64) -> f64 {
    if target == 0.0 {
        return 0.0;
    }
    (actual - target) / target * 100.0
}
