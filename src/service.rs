//! Engine boundary: configuration, timing and caching around the pure engines
//!
//! The engines themselves never see a metrics sink or a cache. Callers that
//! want neither can use the free functions directly.

use std::time::Instant;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::calculation::{calculate_pepm, calculate_variance, PepmInput, PepmResult, VarianceResult};
use crate::config::AnalyticsConfig;
use crate::error::{CalcError, GridError};
use crate::grid::{build_rows, GridModel, PeriodRecord};
use crate::instrument::{get_or_compute, CacheProvider, Cached, MetricsSink, NoopCache, NoopMetrics};
use crate::peers::{cohort_stats, rank, CohortStats, DimensionSet, PeerOrganization, RankedPeer, RankingBadge, ReferenceOrganization};
use crate::whatif::{project, shift_rebates, AdjustedValues, RebateSchedule, RebateShift, ShiftMode, WhatIfScenario, WhatIfSession};

/// One what-if evaluation for an organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatIfRequest {
    pub org_id: String,
    pub scenario: WhatIfScenario,
    /// Months to move each quarterly rebate receipt
    #[serde(default)]
    pub rebate_offset: i32,
    #[serde(default)]
    pub rebates: Option<RebateSchedule>,
    #[serde(default)]
    pub shift_mode: ShiftMode,
    #[serde(default)]
    pub member_months: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatIfOutcome {
    /// Scenario as evaluated, with the adjustment clamped onto the step grid
    pub scenario: WhatIfScenario,
    pub adjusted: AdjustedValues,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rebate_shift: Option<RebateShift>,
}

/// Ranked cohort plus its statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerRanking<'a> {
    pub peers: Vec<RankedPeer<'a>>,
    pub stats: Option<CohortStats>,
    pub badge: Option<RankingBadge>,
}

/// Cache key for a what-if result
pub fn what_if_cache_key(org_id: &str, adjustment: f64, rebate_offset: i32) -> String {
    format!("whatif:{}:{}:{}", org_id, adjustment, rebate_offset)
}

pub struct AnalyticsService<M = NoopMetrics, C = NoopCache> {
    config: AnalyticsConfig,
    metrics: M,
    cache: C,
}

impl AnalyticsService {
    /// Service with no metrics and no caching
    pub fn new(config: AnalyticsConfig) -> Self {
        Self::with_instruments(config, NoopMetrics, NoopCache)
    }
}

impl<M: MetricsSink, C: CacheProvider> AnalyticsService<M, C> {
    pub fn with_instruments(config: AnalyticsConfig, metrics: M, cache: C) -> Self {
        Self { config, metrics, cache }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn metrics(&self) -> &M {
        &self.metrics
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    fn timed<T>(&self, operation: &str, f: impl FnOnce() -> T) -> T {
        let started = Instant::now();
        let result = f();
        let elapsed = started.elapsed();

        self.metrics.record(operation, elapsed);
        if elapsed > self.config.budget() {
            warn!(
                "{} took {:?}, over the {}ms budget",
                operation, elapsed, self.config.performance.budget_ms
            );
        }
        result
    }

    pub fn pepm(&self, input: &PepmInput) -> Result<PepmResult, CalcError> {
        self.timed("pepm", || calculate_pepm(input))
    }

    pub fn variance(&self, actual: f64, target: f64) -> VarianceResult {
        self.timed("variance", || calculate_variance(actual, target))
    }

    /// Start an interactive session bounded by the configured adjustment range
    pub fn what_if_session(&self, scenario: WhatIfScenario) -> WhatIfSession {
        WhatIfSession::with_bounds(scenario, self.config.adjustment_bounds())
    }

    /// Evaluate a what-if request, served from cache when possible
    ///
    /// Only the projected values are cached. The key covers organization,
    /// adjustment and rebate offset, so a changed baseline for the same
    /// organization is seen after the TTL. The rebate shift is recomputed on
    /// every call from the request's own schedule and mode.
    pub fn what_if(&self, request: &WhatIfRequest) -> Cached<WhatIfOutcome> {
        let bounds = self.config.adjustment_bounds();
        let scenario = request
            .scenario
            .with_adjustment(bounds.normalize(request.scenario.employee_adjustment));
        let key = what_if_cache_key(&request.org_id, scenario.employee_adjustment, request.rebate_offset);

        self.timed("what_if", || {
            let projected = get_or_compute(&self.cache, &key, self.config.cache_ttl(), || project(&scenario));
            let rebate_shift = request.rebates.as_ref().map(|schedule| {
                shift_rebates(schedule, request.rebate_offset, request.shift_mode, request.member_months)
            });
            Cached {
                data: WhatIfOutcome {
                    scenario,
                    adjusted: projected.data,
                    rebate_shift,
                },
                from_cache: projected.from_cache,
                compute_time: projected.compute_time,
            }
        })
    }

    /// Rank candidates and summarise the cohort
    ///
    /// `dimensions` falls back to the configured defaults.
    pub fn rank_peers<'a>(
        &self,
        reference: &ReferenceOrganization,
        candidates: &'a [PeerOrganization],
        dimensions: Option<DimensionSet>,
        expanded: bool,
    ) -> PeerRanking<'a> {
        let dimensions = dimensions.unwrap_or(self.config.ranking.default_dimensions);
        let options = self.config.rank_options().expanded(expanded);

        self.timed("rank_peers", || {
            let peers = rank(reference, candidates, dimensions, &options);
            let stats = cohort_stats(reference, &peers);
            let badge = stats.as_ref().and_then(CohortStats::badge);
            PeerRanking { peers, stats, badge }
        })
    }

    /// Build rows from period records and wrap them in a grid model
    pub fn build_grid(&self, records: &[PeriodRecord]) -> Result<GridModel, GridError> {
        let rows = self.timed("build_grid", || build_rows(records))?;
        debug!("grid model ready with {} root rows", rows.len());
        Ok(GridModel::with_layout(rows, self.config.grid_layout()))
    }
}
