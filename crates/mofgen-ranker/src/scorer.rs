//! Two-stage candidate ranking with a weighted-rank fallback.
//!
//! 1. Rank every candidate per property under its polarity (0 = best).
//! 2. Primary filter: keep candidates whose ground-state energy rank and CO2
//!    uptake rank are both at or below the configured percentile of the rank
//!    distribution.
//! 3. With at least `min_primary` survivors, order them by the secondary
//!    weighted rank; otherwise order every candidate by the fallback weighted
//!    rank. Keep the first `final_count`.
//!
//! A display score (weighted percentile scores) is attached to every ranked
//! candidate but never used for selection.

use mofgen_common::{MofgenError, PerProperty, Property};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::normalise::{ordinal_ranks, percentile, percentile_score};
use crate::weights::PropertyWeights;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Percentile of the rank distribution used as the primary cut (default: 30)
    #[serde(default = "default_primary_percentile")]
    pub primary_percentile: f64,

    /// Survivors needed to use the secondary stage (default: 10)
    #[serde(default = "default_min_primary")]
    pub min_primary: usize,

    /// Candidates returned (default: 10)
    #[serde(default = "default_final_count")]
    pub final_count: usize,

    #[serde(default = "PropertyWeights::secondary")]
    pub secondary_weights: PropertyWeights,

    #[serde(default = "PropertyWeights::fallback")]
    pub fallback_weights: PropertyWeights,

    #[serde(default = "PropertyWeights::display")]
    pub display_weights: PropertyWeights,
}

fn default_primary_percentile() -> f64 { 30.0 }
fn default_min_primary() -> usize { 10 }
fn default_final_count() -> usize { 10 }

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            primary_percentile: default_primary_percentile(),
            min_primary: default_min_primary(),
            final_count: default_final_count(),
            secondary_weights: PropertyWeights::secondary(),
            fallback_weights: PropertyWeights::fallback(),
            display_weights: PropertyWeights::display(),
        }
    }
}

impl RankingConfig {
    pub fn validate(&self) -> Result<(), MofgenError> {
        if !(0.0..=100.0).contains(&self.primary_percentile) {
            return Err(MofgenError::Config(format!(
                "ranking.primary_percentile must be within 0..=100, got {}",
                self.primary_percentile
            )));
        }
        for (name, w) in [
            ("secondary_weights", &self.secondary_weights),
            ("fallback_weights", &self.fallback_weights),
            ("display_weights", &self.display_weights),
        ] {
            if !w.validate() {
                return Err(MofgenError::Config(format!(
                    "ranking.{name} must be non-negative and sum to 1.0, got {:?}",
                    w.as_array()
                )));
            }
        }
        Ok(())
    }
}

/// Which stage produced the final ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStage {
    Primary,
    WeightedFallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    /// Final position, 0 = best.
    pub position: usize,
    /// Index into the slice passed to [`rank_candidates`].
    pub index: usize,
    pub predictions: PerProperty<f64>,
    pub ranks: PerProperty<usize>,
    pub percentiles: PerProperty<f64>,
    /// Weighted rank that ordered this candidate (lower is better).
    pub selection_score: f64,
    pub display_score: f64,
    pub stage: SelectionStage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingOutcome {
    pub stage: SelectionStage,
    pub ranked: Vec<RankedCandidate>,
    /// Candidates with all-finite predictions; `N` for ranks and percentiles.
    pub evaluated: usize,
    /// Input indices dropped for non-finite predictions.
    pub excluded: Vec<usize>,
    /// Input indices that passed the primary filter.
    pub primary_indices: Vec<usize>,
    pub ground_state_threshold: Option<f64>,
    pub co2_uptake_threshold: Option<f64>,
}

/// Rank candidates by their four predictions.
pub fn rank_candidates(predictions: &[PerProperty<f64>], config: &RankingConfig) -> RankingOutcome {
    let (finite, excluded): (Vec<usize>, Vec<usize>) =
        (0..predictions.len()).partition(|&i| predictions[i].all_finite());
    if !excluded.is_empty() {
        warn!(
            excluded = excluded.len(),
            total = predictions.len(),
            "Excluding candidates with non-finite predictions"
        );
    }
    let n = finite.len();

    let ranks: PerProperty<Vec<usize>> = PerProperty::from_fn(|p| {
        let column: Vec<f64> = finite.iter().map(|&i| predictions[i][p]).collect();
        ordinal_ranks(&column, p.polarity())
    });
    let threshold = |p: Property| {
        let as_f64: Vec<f64> = ranks[p].iter().map(|&r| r as f64).collect();
        percentile(&as_f64, config.primary_percentile)
    };
    let gs_threshold = threshold(Property::GroundStateEnergy);
    let co2_threshold = threshold(Property::Co2Uptake);

    let ranks_at = |j: usize| PerProperty::from_fn(|p| ranks[p][j]);

    let primary: Vec<usize> = match (gs_threshold, co2_threshold) {
        (Some(gs_t), Some(co2_t)) => (0..n)
            .filter(|&j| {
                ranks[Property::GroundStateEnergy][j] as f64 <= gs_t
                    && ranks[Property::Co2Uptake][j] as f64 <= co2_t
            })
            .collect(),
        _ => Vec::new(),
    };
    info!(
        evaluated = n,
        primary = primary.len(),
        gs_threshold = gs_threshold.unwrap_or(f64::NAN),
        co2_threshold = co2_threshold.unwrap_or(f64::NAN),
        "Primary filter applied"
    );

    let (stage, pool, weights) = if n > 0 && primary.len() >= config.min_primary {
        (SelectionStage::Primary, primary.clone(), &config.secondary_weights)
    } else {
        warn!(
            primary = primary.len(),
            required = config.min_primary,
            "Too few primary candidates, using weighted-rank fallback over all candidates"
        );
        (SelectionStage::WeightedFallback, (0..n).collect(), &config.fallback_weights)
    };

    let mut scored: Vec<(usize, f64)> = pool
        .into_iter()
        .map(|j| {
            let r = ranks_at(j).map(|_, &r| r as f64);
            (j, weights.combine(&r))
        })
        .collect();
    scored.sort_by(|a, b| a.1.total_cmp(&b.1));
    scored.truncate(config.final_count);

    let ranked = scored
        .into_iter()
        .enumerate()
        .map(|(position, (j, selection_score))| {
            let r = ranks_at(j);
            let percentiles = r.map(|_, &rank| percentile_score(rank, n));
            RankedCandidate {
                position,
                index: finite[j],
                predictions: predictions[finite[j]],
                ranks: r,
                display_score: config.display_weights.combine(&percentiles),
                percentiles,
                selection_score,
                stage,
            }
        })
        .collect();

    RankingOutcome {
        stage,
        ranked,
        evaluated: n,
        excluded,
        primary_indices: primary.into_iter().map(|j| finite[j]).collect(),
        ground_state_threshold: gs_threshold,
        co2_uptake_threshold: co2_threshold,
    }
}
