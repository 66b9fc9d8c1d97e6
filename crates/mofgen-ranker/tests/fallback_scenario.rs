//! 50 candidates of which a chosen number pass the primary filter.

use mofgen_common::PerProperty;
use mofgen_ranker::{rank_candidates, RankingConfig, SelectionStage};

const N: usize = 50;

/// Order of candidate indices from best to worst CO2 uptake. `0..joint` and
/// enough rows from `15..` fill the top 15 slots, so only `0..joint` are also
/// in the ground-state top 15.
fn co2_order(joint: usize) -> Vec<usize> {
    let filler = 15 + (15 - joint);
    let mut order: Vec<usize> = (0..joint).chain(15..filler).collect();
    order.extend((joint..15).chain(filler..N));
    order
}

fn candidates(joint: usize) -> Vec<PerProperty<f64>> {
    let order = co2_order(joint);
    (0..N)
        .map(|i| {
            let co2_pos = order.iter().position(|&j| j == i).unwrap();
            PerProperty::new(
                i as f64,                     // ground-state rank = i
                1000.0 - co2_pos as f64,      // co2 rank = co2_pos
                ((i * 7) % N) as f64,         // selectivity rank = 49 - value
                ((i * 11) % N) as f64,        // heat rank = 49 - value
            )
        })
        .collect()
}

fn hand_scores(joint: usize) -> Vec<(usize, f64)> {
    let order = co2_order(joint);
    (0..N)
        .map(|i| {
            let gs = i as f64;
            let co2 = order.iter().position(|&j| j == i).unwrap() as f64;
            let sel = (N - 1 - (i * 7) % N) as f64;
            let heat = (N - 1 - (i * 11) % N) as f64;
            (i, 0.35 * gs + 0.35 * co2 + 0.15 * sel + 0.15 * heat)
        })
        .collect()
}

#[test]
fn test_four_primary_triggers_weighted_fallback() {
    let outcome = rank_candidates(&candidates(4), &RankingConfig::default());

    // threshold = 0.3 · 49 = 14.7 → ranks 0..=14 pass on each axis
    let threshold = outcome.ground_state_threshold.unwrap();
    assert!((threshold - 14.7).abs() < 1e-9);
    assert_eq!(outcome.primary_indices, vec![0, 1, 2, 3]);
    assert_eq!(outcome.stage, SelectionStage::WeightedFallback);
    assert_eq!(outcome.evaluated, N);

    let mut expected = hand_scores(4);
    expected.sort_by(|a, b| a.1.total_cmp(&b.1));
    expected.truncate(10);

    let got: Vec<usize> = outcome.ranked.iter().map(|c| c.index).collect();
    let want: Vec<usize> = expected.iter().map(|(i, _)| *i).collect();
    assert_eq!(got, want);
    for (c, (_, score)) in outcome.ranked.iter().zip(&expected) {
        assert!((c.selection_score - score).abs() < 1e-9);
        assert_eq!(c.stage, SelectionStage::WeightedFallback);
    }
}

#[test]
fn test_lower_minimum_keeps_primary_stage() {
    let config = RankingConfig {
        min_primary: 4,
        ..RankingConfig::default()
    };
    let outcome = rank_candidates(&candidates(4), &config);
    assert_eq!(outcome.stage, SelectionStage::Primary);
    let mut got: Vec<usize> = outcome.ranked.iter().map(|c| c.index).collect();
    got.sort_unstable();
    assert_eq!(got, vec![0, 1, 2, 3]);
}

#[test]
fn test_exactly_min_primary_stays_primary() {
    let config = RankingConfig::default();
    let outcome = rank_candidates(&candidates(config.min_primary), &config);
    assert_eq!(outcome.primary_indices, (0..10).collect::<Vec<_>>());
    assert_eq!(outcome.stage, SelectionStage::Primary);
    assert_eq!(outcome.ranked.len(), 10);
    assert!(outcome.ranked.iter().all(|c| c.stage == SelectionStage::Primary && c.index < 10));
}

#[test]
fn test_one_below_min_primary_falls_back() {
    let outcome = rank_candidates(&candidates(9), &RankingConfig::default());
    assert_eq!(outcome.primary_indices.len(), 9);
    assert_eq!(outcome.stage, SelectionStage::WeightedFallback);
}
