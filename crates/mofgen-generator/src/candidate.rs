//! Decoding sampled latents into scored candidates and turning the ranked
//! ones back into MOF records.

use mofgen_codec::FeatureCodec;
use mofgen_common::{MofRecord, PerProperty, Property};
use mofgen_models::{LatentModel, PropertyModel};
use mofgen_ranker::{RankedCandidate, SelectionStage};
use serde::Serialize;
use tracing::{debug, warn};

/// One decoded feature vector with its four predictions.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub features: Vec<f32>,
    pub predictions: PerProperty<f64>,
}

/// A ranked candidate expressed as a MOF record in original units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedMof {
    pub mof_id: String,
    pub record: MofRecord,
    pub predictions: PerProperty<f64>,
    pub percentiles: PerProperty<f64>,
    pub performance_score: f64,
    pub selection_score: f64,
    pub stage: SelectionStage,
}

/// A ranked candidate that could not be mapped back to a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterializationFailure {
    /// Position in the final ranking.
    pub position: usize,
    /// Index into the generated batch.
    pub candidate_index: usize,
    pub reason: String,
}

/// Decode every latent vector and score it with all four predictors.
/// Nothing is discarded here.
pub fn generate_candidates<L, P>(
    latent_model: &L,
    predictors: &PerProperty<P>,
    latents: &[Vec<f32>],
) -> anyhow::Result<Vec<Candidate>>
where
    L: LatentModel + ?Sized,
    P: PropertyModel,
{
    let features = latent_model.decode(latents)?;
    let predicted: PerProperty<Vec<f64>> = PerProperty::try_from_fn(|p| predictors[p].predict_batch(&features))?;
    for p in Property::ALL {
        if predicted[p].len() != features.len() {
            anyhow::bail!(
                "{} predictor returned {} values for {} candidates",
                p.key(),
                predicted[p].len(),
                features.len()
            );
        }
    }
    debug!(candidates = features.len(), "Decoded and scored candidates");

    Ok(features
        .into_iter()
        .enumerate()
        .map(|(i, features)| Candidate {
            features,
            predictions: predicted.map(|_, v| v[i]),
        })
        .collect())
}

/// `GEN-MOF-{n}` identifier for the `position`-th ranked candidate (0-based).
pub fn mof_id(position: usize) -> String {
    format!("GEN-MOF-{}", position + 1)
}

/// Inverse-apply the codec to every ranked candidate. A candidate that fails
/// is recorded and the rest continue.
pub fn materialize(
    ranked: &[RankedCandidate],
    candidates: &[Candidate],
    codec: &FeatureCodec,
) -> (Vec<GeneratedMof>, Vec<MaterializationFailure>) {
    let mut generated = Vec::with_capacity(ranked.len());
    let mut failures = Vec::new();

    for r in ranked {
        let decoded = candidates
            .get(r.index)
            .ok_or_else(|| format!("no candidate at index {}", r.index))
            .and_then(|c| codec.inverse(&c.features).map_err(|e| e.to_string()));

        match decoded {
            Ok(mut record) => {
                let id = mof_id(r.position);
                record.name = Some(id.clone());
                generated.push(GeneratedMof {
                    mof_id: id,
                    record,
                    predictions: r.predictions,
                    percentiles: r.percentiles,
                    performance_score: r.display_score,
                    selection_score: r.selection_score,
                    stage: r.stage,
                });
            }
            Err(reason) => {
                warn!(
                    position = r.position,
                    candidate = r.index,
                    "Could not map ranked candidate back to a record: {}",
                    reason
                );
                failures.push(MaterializationFailure {
                    position: r.position,
                    candidate_index: r.index,
                    reason,
                });
            }
        }
    }
    (generated, failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mofgen_codec::FeatureSchema;
    use mofgen_models::Result as ModelResult;
    use mofgen_ranker::{rank_candidates, RankingConfig};

    /// Decodes a latent `[a, b]` to features `[a, b, 1 - b, b]`.
    struct Mirror;

    impl LatentModel for Mirror {
        fn latent_dim(&self) -> usize {
            2
        }
        fn feature_dim(&self) -> usize {
            4
        }
        fn encode(&self, rows: &[Vec<f32>]) -> ModelResult<Vec<Vec<f32>>> {
            Ok(rows.iter().map(|r| r[..2].to_vec()).collect())
        }
        fn decode(&self, latents: &[Vec<f32>]) -> ModelResult<Vec<Vec<f32>>> {
            Ok(latents.iter().map(|z| vec![z[0], z[1], 1.0 - z[1], z[1]]).collect())
        }
    }

    /// Prediction = weight · first feature.
    struct Linear(Property, f64);

    impl PropertyModel for Linear {
        fn property(&self) -> Property {
            self.0
        }
        fn predict_batch(&self, rows: &[Vec<f32>]) -> ModelResult<Vec<f64>> {
            Ok(rows.iter().map(|r| self.1 * r[0] as f64).collect())
        }
    }

    fn predictors() -> PerProperty<Linear> {
        PerProperty::from_fn(|p| Linear(p, if p == Property::GroundStateEnergy { -1.0 } else { 1.0 }))
    }

    fn codec() -> FeatureCodec {
        let schema = FeatureSchema {
            numeric: vec!["x".to_string()],
            categorical: vec!["topology".to_string()],
        };
        let records = vec![
            MofRecord::default().with_numeric("x", 0.0).with_categorical("topology", "dia"),
            MofRecord::default().with_numeric("x", 2.0).with_categorical("topology", "pcu"),
        ];
        FeatureCodec::fit(&records, &schema).unwrap()
    }

    #[test]
    fn test_every_latent_becomes_a_candidate() {
        let latents: Vec<Vec<f32>> = (0..5).map(|i| vec![i as f32, 0.0]).collect();
        let candidates = generate_candidates(&Mirror, &predictors(), &latents).unwrap();
        assert_eq!(candidates.len(), 5);
        assert_eq!(candidates[3].predictions.co2_uptake, 3.0);
        assert_eq!(candidates[3].predictions.ground_state_energy, -3.0);
        assert_eq!(candidates[3].features, vec![3.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_materialize_ids_and_failures() {
        let codec = codec();
        assert_eq!(codec.width(), 3);
        // Mirror emits 4 features but the codec expects 3: every candidate
        // fails except the one we patch to the right width.
        let latents: Vec<Vec<f32>> = (0..3).map(|i| vec![i as f32, 0.8]).collect();
        let mut candidates = generate_candidates(&Mirror, &predictors(), &latents).unwrap();
        candidates[2].features.truncate(3);

        let preds: Vec<_> = candidates.iter().map(|c| c.predictions).collect();
        let outcome = rank_candidates(&preds, &RankingConfig::default());
        let (generated, failures) = materialize(&outcome.ranked, &candidates, &codec);

        assert_eq!(generated.len(), 1);
        assert_eq!(generated[0].mof_id, "GEN-MOF-1");
        assert_eq!(generated[0].record.name.as_deref(), Some("GEN-MOF-1"));
        // [2.0, 0.8, 0.2] → x = 2·1 + 1, topology = "dia"
        assert!((generated[0].record.numeric["x"] - 3.0).abs() < 1e-6);
        assert_eq!(generated[0].record.categorical["topology"], "dia");

        assert_eq!(failures.len(), 2);
        assert_eq!(failures.iter().map(|f| f.position).collect::<Vec<_>>(), vec![1, 2]);
        assert!(failures[0].reason.contains("codec expects 3"));
    }

    #[test]
    fn test_mof_id_is_one_based() {
        assert_eq!(mof_id(0), "GEN-MOF-1");
        assert_eq!(mof_id(9), "GEN-MOF-10");
    }
}
