//! Choice of real high-performing training rows that anchor generation.

use mofgen_common::MofgenError;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Share of rows forming each top set (default: 0.2)
    #[serde(default = "default_top_fraction")]
    pub top_fraction: f64,

    /// Smallest acceptable intersection before falling back to the union (default: 10)
    #[serde(default = "default_min_intersection")]
    pub min_intersection: usize,

    /// Upper bound on the union fallback (default: 100)
    #[serde(default = "default_max_union")]
    pub max_union: usize,
}

fn default_top_fraction() -> f64 { 0.2 }
fn default_min_intersection() -> usize { 10 }
fn default_max_union() -> usize { 100 }

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            top_fraction: default_top_fraction(),
            min_intersection: default_min_intersection(),
            max_union: default_max_union(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedPath {
    /// Rows in both top sets.
    Intersection,
    /// Rows in either top set.
    Union,
    /// The union, cut to `max_union` rows.
    TruncatedUnion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedSelection {
    /// Training row indices, ascending.
    pub indices: Vec<usize>,
    pub path: SeedPath,
    /// Size of each top set.
    pub top_k: usize,
    pub intersection_size: usize,
}

/// Pick seeds from the ground-state energy (lower is better) and CO2 uptake
/// (higher is better) columns of the training rows.
///
/// The top sets come from stable ascending sorts: the first `k` rows by
/// energy and the last `k` rows by uptake, `k = floor(n · top_fraction)`.
pub fn select_seeds(
    ground_state: &[f64],
    co2_uptake: &[f64],
    policy: &SeedPolicy,
) -> Result<SeedSelection, MofgenError> {
    if ground_state.len() != co2_uptake.len() {
        return Err(MofgenError::InvalidInput(format!(
            "{} ground-state values but {} CO2 uptake values",
            ground_state.len(),
            co2_uptake.len()
        )));
    }
    if !(0.0..=1.0).contains(&policy.top_fraction) {
        return Err(MofgenError::InvalidInput(format!(
            "top_fraction must be within 0..=1, got {}",
            policy.top_fraction
        )));
    }

    let n = ground_state.len();
    let k = (n as f64 * policy.top_fraction).floor() as usize;
    if k == 0 {
        return Err(MofgenError::EmptySeedSet(format!(
            "top set of {n} rows at fraction {} is empty",
            policy.top_fraction
        )));
    }

    let mut low_energy = ascending_order(ground_state);
    low_energy.truncate(k);
    let high_uptake = ascending_order(co2_uptake).split_off(n - k);

    let mut in_a = vec![false; n];
    let mut in_b = vec![false; n];
    for &i in &low_energy {
        in_a[i] = true;
    }
    for &i in &high_uptake {
        in_b[i] = true;
    }

    let intersection: Vec<usize> = (0..n).filter(|&i| in_a[i] && in_b[i]).collect();
    let intersection_size = intersection.len();

    let (indices, path) = if intersection_size >= policy.min_intersection {
        (intersection, SeedPath::Intersection)
    } else {
        let mut union: Vec<usize> = (0..n).filter(|&i| in_a[i] || in_b[i]).collect();
        warn!(
            intersection = intersection_size,
            required = policy.min_intersection,
            union = union.len(),
            "Too few rows in both top sets, seeding from their union"
        );
        if union.len() > policy.max_union {
            union.truncate(policy.max_union);
            (union, SeedPath::TruncatedUnion)
        } else {
            (union, SeedPath::Union)
        }
    };

    if indices.is_empty() {
        return Err(MofgenError::EmptySeedSet("seed selection produced no rows".to_string()));
    }
    info!(seeds = indices.len(), top_k = k, path = ?path, "Selected generation seeds");

    Ok(SeedSelection {
        indices,
        path,
        top_k: k,
        intersection_size,
    })
}

fn ascending_order(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    order
}
