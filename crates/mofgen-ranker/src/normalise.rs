//! Rank and percentile helpers.

use mofgen_common::Polarity;

/// Ordinal rank of every value under `polarity`, 0 = best.
///
/// Ties keep input order (stable double argsort), so the result is always a
/// permutation of `0..values.len()`.
pub fn ordinal_ranks(values: &[f64], polarity: Polarity) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    match polarity {
        Polarity::LowerIsBetter => order.sort_by(|&a, &b| values[a].total_cmp(&values[b])),
        Polarity::HigherIsBetter => order.sort_by(|&a, &b| values[b].total_cmp(&values[a])),
    }

    let mut ranks = vec![0usize; values.len()];
    for (rank, idx) in order.into_iter().enumerate() {
        ranks[idx] = rank;
    }
    ranks
}

/// `q`-th percentile (0–100) with linear interpolation between closest ranks.
/// Returns `None` for an empty slice.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let pos = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// 0–100 rescaling of a rank among `n`: rank 0 → 100.
pub fn percentile_score(rank: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    100.0 * (1.0 - rank as f64 / n as f64)
}
