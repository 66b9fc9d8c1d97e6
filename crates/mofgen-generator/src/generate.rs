//! Seeds → latent sampling → decoding → scoring → ranking → records.

use anyhow::Context;
use mofgen_codec::FeatureCodec;
use mofgen_common::{PerProperty, Property};
use mofgen_models::{LatentModel, PropertyModel};
use mofgen_ranker::{rank_candidates, RankingConfig, RankingOutcome};
use rand::Rng;
use tracing::info;

use crate::candidate::{generate_candidates, materialize, Candidate, GeneratedMof, MaterializationFailure};
use crate::sampler::LatentSampler;
use crate::seeds::{select_seeds, SeedPolicy, SeedSelection};

/// Everything one generation run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub seeds: SeedSelection,
    pub sampler: LatentSampler,
    pub candidates: Vec<Candidate>,
    pub ranking: RankingOutcome,
    pub top: Vec<GeneratedMof>,
    pub failures: Vec<MaterializationFailure>,
}

/// Borrowed view of trained models and training data needed to generate.
pub struct Generator<'a, L: ?Sized, P> {
    pub codec: &'a FeatureCodec,
    pub latent_model: &'a L,
    pub predictors: &'a PerProperty<P>,
    /// Normalized training vectors, row-aligned with `targets`.
    pub features: &'a [Vec<f32>],
    pub targets: &'a [PerProperty<f64>],
    pub ranking: &'a RankingConfig,
}

impl<'a, L, P> Generator<'a, L, P>
where
    L: LatentModel + ?Sized,
    P: PropertyModel,
{
    pub fn run<R: Rng + ?Sized>(
        &self,
        policy: &SeedPolicy,
        num_samples: usize,
        rng: &mut R,
    ) -> anyhow::Result<GenerationOutcome> {
        if self.features.len() != self.targets.len() {
            anyhow::bail!(
                "{} training vectors but {} target rows",
                self.features.len(),
                self.targets.len()
            );
        }

        let column = |p: Property| self.targets.iter().map(|t| t[p]).collect::<Vec<f64>>();
        let seeds = select_seeds(
            &column(Property::GroundStateEnergy),
            &column(Property::Co2Uptake),
            policy,
        )?;

        let seed_rows: Vec<Vec<f32>> = seeds.indices.iter().map(|&i| self.features[i].clone()).collect();
        let encodings = self.latent_model.encode(&seed_rows).context("encoding seeds")?;
        let sampler = LatentSampler::fit(&encodings)?;
        let latents = sampler.sample(num_samples, rng);

        let candidates =
            generate_candidates(self.latent_model, self.predictors, &latents).context("scoring candidates")?;
        let predictions: Vec<PerProperty<f64>> = candidates.iter().map(|c| c.predictions).collect();
        let ranking = rank_candidates(&predictions, self.ranking);
        let (top, failures) = materialize(&ranking.ranked, &candidates, self.codec);

        info!(
            seeds = seeds.indices.len(),
            samples = num_samples,
            stage = ?ranking.stage,
            ranked = top.len(),
            failed = failures.len(),
            "Generation complete"
        );

        Ok(GenerationOutcome {
            seeds,
            sampler,
            candidates,
            ranking,
            top,
            failures,
        })
    }
}
