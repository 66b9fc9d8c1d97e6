//! mofgen-ranker — Multi-criteria ranking of generated MOF candidates.
//!
//! Candidates are ranked per property under that property's polarity, passed
//! through a percentile filter on ground-state energy and CO2 uptake, then
//! ordered by a weighted rank sum. Too few survivors trigger a weighted-rank
//! fallback over every candidate.

pub mod normalise;
pub mod scorer;
pub mod weights;

pub use scorer::{rank_candidates, RankedCandidate, RankingConfig, RankingOutcome, SelectionStage};
pub use weights::PropertyWeights;
