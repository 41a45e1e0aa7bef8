//! Cohort statistics derived from a ranked peer set

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::organization::ReferenceOrganization;
use super::ranker::RankedPeer;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortStats {
    pub avg_pepm: f64,
    pub avg_savings: f64,
    /// 1-based; 0 when the reference has no PEPM
    pub current_rank: usize,
    pub total_peers: usize,
    pub percentile: i64,
}

impl CohortStats {
    pub fn badge(&self) -> Option<RankingBadge> {
        RankingBadge::for_stats(self)
    }
}

/// Summarise the ranked cohort relative to the reference
///
/// Returns `None` for an empty cohort. Must be recomputed whenever the
/// ranked set or the active dimensions change.
pub fn cohort_stats(reference: &ReferenceOrganization, ranked: &[RankedPeer<'_>]) -> Option<CohortStats> {
    if ranked.is_empty() {
        return None;
    }

    let total = ranked.len();
    let avg_pepm = ranked.iter().map(|p| p.organization.pepm_actual).sum::<f64>() / total as f64;
    let avg_savings = ranked.iter().map(|p| p.organization.savings).sum::<f64>() / total as f64;

    let current_rank = match reference.pepm_actual {
        Some(pepm) if pepm != 0.0 && !pepm.is_nan() => {
            ranked.iter().filter(|p| p.organization.pepm_actual < pepm).count() + 1
        }
        _ => 0,
    };

    let percentile = if current_rank > 0 {
        // rounds half up, so -12.5 becomes -12
        ((1.0 - current_rank as f64 / total as f64) * 100.0 + 0.5).floor() as i64
    } else {
        0
    };

    Some(CohortStats {
        avg_pepm,
        avg_savings,
        current_rank,
        total_peers: total,
        percentile,
    })
}

/// Standing of the reference within its cohort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankingBadge {
    TopPerformer,
    AboveAverage,
    Average,
    BelowAverage,
}

impl RankingBadge {
    pub fn for_stats(stats: &CohortStats) -> Option<Self> {
        if stats.current_rank == 0 {
            return None;
        }
        Some(match stats.percentile {
            p if p >= 75 => RankingBadge::TopPerformer,
            p if p >= 50 => RankingBadge::AboveAverage,
            p if p >= 25 => RankingBadge::Average,
            _ => RankingBadge::BelowAverage,
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            RankingBadge::TopPerformer => "Top Performer",
            RankingBadge::AboveAverage => "Above Average",
            RankingBadge::Average => "Average",
            RankingBadge::BelowAverage => "Below Average",
        }
    }
}

/// Organization ids of a ranked cohort, applied back to the reporting grid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CohortFilter {
    ids: HashSet<String>,
}

impl CohortFilter {
    pub fn from_ranked(ranked: &[RankedPeer<'_>]) -> Self {
        Self {
            ids: ranked.iter().map(|p| p.organization.id.clone()).collect(),
        }
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
