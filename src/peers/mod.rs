//! Peer similarity ranking
//!
//! Candidates are scored against a reference organization on independently
//! weighted dimensions, ranked, truncated to a cohort, and summarised into
//! cohort statistics. Scores are recomputed on every pass and never stored
//! on the organization records.

mod organization;
mod dimension;
mod ranker;
mod cohort;
mod sparkline;

pub use organization::{PeerOrganization, ReferenceOrganization};
pub use dimension::{Dimension, DimensionSet, ParseDimensionError};
pub use ranker::{rank, similarity, RankOptions, RankedPeer, Similarity, DEFAULT_SIZE_TOLERANCE, DEFAULT_TOP_K};
pub use cohort::{cohort_stats, CohortFilter, CohortStats, RankingBadge};
pub use sparkline::sparkline_points;
