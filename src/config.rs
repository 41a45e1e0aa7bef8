//! Analytics configuration
//!
//! Every field has a default, so `{}` is a complete configuration:
//!
//! ```json
//! {
//!   "ranking": { "topK": 5, "sizeTolerance": 0.2, "defaultDimensions": ["size", "industry", "planType"] },
//!   "grid": { "rowHeight": 48, "viewportHeight": 600, "bufferRows": 5 },
//!   "whatIf": { "minAdjustment": -5, "maxAdjustment": 5, "step": 0.1 },
//!   "performance": { "budgetMs": 50, "maxSamples": 100 },
//!   "cache": { "ttlSecs": 300 }
//! }
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::grid::GridLayout;
use crate::instrument::DEFAULT_MAX_SAMPLES;
use crate::peers::{DimensionSet, RankOptions, DEFAULT_SIZE_TOLERANCE, DEFAULT_TOP_K};
use crate::whatif::AdjustmentBounds;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsConfig {
    pub ranking: RankingConfig,
    pub grid: GridLayout,
    pub what_if: WhatIfConfig,
    pub performance: PerformanceConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RankingConfig {
    pub top_k: usize,
    pub size_tolerance: f64,
    pub default_dimensions: DimensionSet,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            size_tolerance: DEFAULT_SIZE_TOLERANCE,
            default_dimensions: DimensionSet::default_active(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WhatIfConfig {
    pub min_adjustment: f64,
    pub max_adjustment: f64,
    pub step: f64,
}

impl Default for WhatIfConfig {
    fn default() -> Self {
        let bounds = AdjustmentBounds::default();
        Self {
            min_adjustment: bounds.min,
            max_adjustment: bounds.max,
            step: bounds.step,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformanceConfig {
    pub budget_ms: f64,
    pub max_samples: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            budget_ms: 50.0,
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

impl AnalyticsConfig {
    /// Parse and validate a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        let config: AnalyticsConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        let w = &self.what_if;
        if !(w.min_adjustment.is_finite() && w.max_adjustment.is_finite()) || w.min_adjustment > w.max_adjustment {
            return Err(LoadError::InvalidConfig(format!(
                "whatIf range [{}, {}] is empty",
                w.min_adjustment, w.max_adjustment
            )));
        }
        if !w.step.is_finite() || w.step < 0.0 {
            return Err(LoadError::InvalidConfig(format!("whatIf step {} must be >= 0", w.step)));
        }
        if !self.grid.row_height.is_finite() || self.grid.row_height <= 0.0 {
            return Err(LoadError::InvalidConfig(format!(
                "grid rowHeight {} must be positive",
                self.grid.row_height
            )));
        }
        if !self.ranking.size_tolerance.is_finite() || self.ranking.size_tolerance < 0.0 {
            return Err(LoadError::InvalidConfig(format!(
                "ranking sizeTolerance {} must be >= 0",
                self.ranking.size_tolerance
            )));
        }
        if !self.performance.budget_ms.is_finite() || self.performance.budget_ms < 0.0 {
            return Err(LoadError::InvalidConfig(format!(
                "performance budgetMs {} must be >= 0",
                self.performance.budget_ms
            )));
        }
        Ok(())
    }

    pub fn adjustment_bounds(&self) -> AdjustmentBounds {
        AdjustmentBounds {
            min: self.what_if.min_adjustment,
            max: self.what_if.max_adjustment,
            step: self.what_if.step,
        }
    }

    pub fn rank_options(&self) -> RankOptions {
        RankOptions {
            top_k: self.ranking.top_k,
            expanded: false,
            size_tolerance: self.ranking.size_tolerance,
        }
    }

    pub fn grid_layout(&self) -> GridLayout {
        self.grid
    }

    pub fn budget(&self) -> Duration {
        Duration::try_from_secs_f64(self.performance.budget_ms / 1000.0).unwrap_or(Duration::ZERO)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peers::Dimension;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AnalyticsConfig::from_json_str("{}").unwrap();
        assert_eq!(config, AnalyticsConfig::default());
        assert_eq!(config.rank_options(), RankOptions::default());
        assert_eq!(config.adjustment_bounds(), AdjustmentBounds::default());
        assert_eq!(config.grid_layout(), GridLayout::default());
        assert_eq!(config.budget(), Duration::from_millis(50));
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
    }

    #[test]
    fn test_partial_override() {
        let config = AnalyticsConfig::from_json_str(
            r#"{"ranking": {"topK": 10, "defaultDimensions": ["carrier", "network"]}, "grid": {"rowHeight": 32}}"#,
        )
        .unwrap();
        assert_eq!(config.ranking.top_k, 10);
        assert_eq!(config.ranking.size_tolerance, DEFAULT_SIZE_TOLERANCE);
        assert!(config.ranking.default_dimensions.contains(Dimension::Carrier));
        assert!(!config.ranking.default_dimensions.contains(Dimension::Size));
        assert_eq!(config.grid.row_height, 32.0);
        assert_eq!(config.grid.viewport_height, 600.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        for json in [
            r#"{"whatIf": {"minAdjustment": 5, "maxAdjustment": -5}}"#,
            r#"{"whatIf": {"step": -0.1}}"#,
            r#"{"grid": {"rowHeight": 0}}"#,
            r#"{"ranking": {"sizeTolerance": -1}}"#,
        ] {
            assert!(matches!(
                AnalyticsConfig::from_json_str(json),
                Err(LoadError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(AnalyticsConfig::from_json_str("{"), Err(LoadError::Json(_))));
    }
}
