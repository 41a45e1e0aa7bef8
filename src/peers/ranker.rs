//! Weighted multi-dimensional similarity scoring and ranking

use log::{debug, warn};
use rayon::prelude::*;
use serde::Serialize;

use super::dimension::{Dimension, DimensionSet};
use super::organization::{PeerOrganization, ReferenceOrganization};

/// Cohort size when the list is not expanded
pub const DEFAULT_TOP_K: usize = 5;

/// Relative headcount difference still considered "similar size"
pub const DEFAULT_SIZE_TOLERANCE: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankOptions {
    pub top_k: usize,
    /// Return the full ranked list instead of the top-K
    pub expanded: bool,
    pub size_tolerance: f64,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            expanded: false,
            size_tolerance: DEFAULT_SIZE_TOLERANCE,
        }
    }
}

impl RankOptions {
    pub fn expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

/// Score of one candidate and the reasons behind it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Similarity {
    pub score: u32,
    /// Matched dimensions, in evaluation order
    pub match_factors: Vec<&'static str>,
}

/// A candidate with its score for the current ranking pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedPeer<'a> {
    #[serde(flatten)]
    pub organization: &'a PeerOrganization,
    pub similarity_score: u32,
    pub match_factors: Vec<&'static str>,
}

fn matches_text(reference: &Option<String>, candidate: &str) -> bool {
    reference.as_deref() == Some(candidate)
}

fn matches_size(reference: Option<u32>, candidate: u32, tolerance: f64) -> bool {
    match reference {
        Some(size) if size > 0 => {
            let size = f64::from(size);
            (f64::from(candidate) - size).abs() / size <= tolerance
        }
        _ => false,
    }
}

/// Score one candidate against the reference on the active dimensions
pub fn similarity(
    reference: &ReferenceOrganization,
    candidate: &PeerOrganization,
    dimensions: DimensionSet,
    size_tolerance: f64,
) -> Similarity {
    let mut score = 0;
    let mut match_factors = Vec::new();

    for dimension in dimensions.iter() {
        let matched = match dimension {
            Dimension::Size => matches_size(reference.size, candidate.size, size_tolerance),
            Dimension::Industry => matches_text(&reference.industry, &candidate.industry),
            Dimension::PlanType => matches_text(&reference.plan_type, &candidate.plan_type),
            Dimension::Carrier => matches_text(&reference.carrier, &candidate.carrier),
            Dimension::Network => matches_text(&reference.network, &candidate.network),
        };
        if matched {
            score += dimension.weight();
            match_factors.push(dimension.match_factor());
        }
    }

    Similarity { score, match_factors }
}

/// Rank candidates by similarity to the reference
///
/// Sorted by descending score; equal scores keep their input order. The
/// list is cut to `top_k` unless `expanded` is set.
pub fn rank<'a>(
    reference: &ReferenceOrganization,
    candidates: &'a [PeerOrganization],
    dimensions: DimensionSet,
    options: &RankOptions,
) -> Vec<RankedPeer<'a>> {
    if candidates.is_empty() {
        warn!("peer ranking requested with no candidates");
        return Vec::new();
    }

    // indexed collect keeps input order, which the stable sort relies on
    let mut ranked: Vec<RankedPeer<'a>> = candidates
        .par_iter()
        .map(|candidate| {
            let Similarity { score, match_factors } =
                similarity(reference, candidate, dimensions, options.size_tolerance);
            RankedPeer {
                organization: candidate,
                similarity_score: score,
                match_factors,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.similarity_score.cmp(&a.similarity_score));

    if !options.expanded {
        ranked.truncate(options.top_k);
    }

    debug!(
        "ranked {} candidates on {:?}, returning {}",
        candidates.len(),
        dimensions,
        ranked.len()
    );

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org(id: &str, industry: &str, size: u32, plan: &str, carrier: &str, network: &str) -> PeerOrganization {
        PeerOrganization {
            id: id.to_string(),
            name: format!("Org {}", id),
            industry: industry.to_string(),
            size,
            funding_type: "Self-Funded".to_string(),
            carrier: carrier.to_string(),
            plan_type: plan.to_string(),
            network: network.to_string(),
            pepm_actual: 500.0,
            pepm_target: 450.0,
            savings: 100_000.0,
            sparkline_data: None,
        }
    }

    fn reference() -> ReferenceOrganization {
        ReferenceOrganization::from(&org("me", "Technology", 1000, "PPO", "Aetna", "Broad"))
    }

    #[test]
    fn test_full_match_scores_100() {
        let candidate = org("a", "Technology", 1100, "PPO", "Aetna", "Broad");
        let result = similarity(&reference(), &candidate, DimensionSet::all(), DEFAULT_SIZE_TOLERANCE);
        assert_eq!(result.score, 100);
        assert_eq!(
            result.match_factors,
            vec!["Similar size", "Same industry", "Same plan type", "Same carrier", "Same network"]
        );
    }

    #[test]
    fn test_no_match_scores_0() {
        let candidate = org("b", "Retail", 5000, "HMO", "Cigna", "Narrow");
        let result = similarity(&reference(), &candidate, DimensionSet::all(), DEFAULT_SIZE_TOLERANCE);
        assert_eq!(result.score, 0);
        assert!(result.match_factors.is_empty());
    }

    #[test]
    fn test_size_tolerance_boundary() {
        let at_edge = org("c", "Retail", 1200, "HMO", "Cigna", "Narrow");
        let beyond = org("d", "Retail", 1201, "HMO", "Cigna", "Narrow");
        let dims: DimensionSet = [Dimension::Size].into_iter().collect();
        assert_eq!(similarity(&reference(), &at_edge, dims, 0.2).score, 25);
        assert_eq!(similarity(&reference(), &beyond, dims, 0.2).score, 0);
    }

    #[test]
    fn test_inactive_dimensions_ignored() {
        let candidate = org("a", "Technology", 1100, "PPO", "Aetna", "Broad");
        let result = similarity(&reference(), &candidate, DimensionSet::default_active(), 0.2);
        assert_eq!(result.score, 70);
    }

    #[test]
    fn test_missing_reference_size_never_matches() {
        let mut reference = reference();
        reference.size = None;
        let candidate = org("a", "Technology", 1000, "PPO", "Aetna", "Broad");
        let dims: DimensionSet = [Dimension::Size].into_iter().collect();
        assert_eq!(similarity(&reference, &candidate, dims, 0.2).score, 0);
        reference.size = Some(0);
        assert_eq!(similarity(&reference, &candidate, dims, 0.2).score, 0);
    }

    #[test]
    fn test_rank_orders_by_score_with_stable_ties() {
        let candidates = vec![
            org("low", "Retail", 5000, "HMO", "Cigna", "Narrow"),
            org("tie-1", "Technology", 5000, "HMO", "Cigna", "Narrow"),
            org("best", "Technology", 1000, "PPO", "Aetna", "Broad"),
            org("tie-2", "Technology", 5000, "HMO", "Cigna", "Narrow"),
        ];
        let ranked = rank(&reference(), &candidates, DimensionSet::all(), &RankOptions::default());
        let ids: Vec<_> = ranked.iter().map(|r| r.organization.id.as_str()).collect();
        assert_eq!(ids, vec!["best", "tie-1", "tie-2", "low"]);
    }

    #[test]
    fn test_top_k_truncation_and_expanded() {
        let candidates: Vec<_> = (0..12)
            .map(|i| org(&format!("p{}", i), "Technology", 900 + i * 10, "PPO", "Aetna", "Broad"))
            .collect();

        let ranked = rank(&reference(), &candidates, DimensionSet::all(), &RankOptions::default());
        assert_eq!(ranked.len(), DEFAULT_TOP_K);

        let ranked = rank(&reference(), &candidates, DimensionSet::all(), &RankOptions::default().top_k(3));
        assert_eq!(ranked.len(), 3);

        let expanded = RankOptions::default().expanded(true);
        let ranked = rank(&reference(), &candidates, DimensionSet::all(), &expanded);
        assert_eq!(ranked.len(), 12);
    }

    #[test]
    fn test_rank_is_deterministic() {
        let candidates: Vec<_> = (0..40)
            .map(|i| {
                let industry = if i % 3 == 0 { "Technology" } else { "Retail" };
                let plan = if i % 2 == 0 { "PPO" } else { "HMO" };
                org(&format!("p{}", i), industry, 700 + i * 25, plan, "Aetna", "Broad")
            })
            .collect();
        let options = RankOptions::default().expanded(true);
        let first = rank(&reference(), &candidates, DimensionSet::all(), &options);
        let second = rank(&reference(), &candidates, DimensionSet::all(), &options);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_candidates() {
        let ranked = rank(&reference(), &[], DimensionSet::all(), &RankOptions::default());
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_serializes_flattened_with_score() {
        let candidates = vec![org("a", "Technology", 1000, "PPO", "Aetna", "Broad")];
        let ranked = rank(&reference(), &candidates, DimensionSet::default_active(), &RankOptions::default());
        let value = serde_json::to_value(&ranked[0]).unwrap();
        assert_eq!(value["id"], "a");
        assert_eq!(value["similarityScore"], 70);
        assert_eq!(value["matchFactors"][0], "Similar size");
    }
}
