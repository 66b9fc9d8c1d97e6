//! Training orchestration: split, fit the codec, train the autoencoder and
//! the four property predictors, keep everything needed to generate.

use anyhow::Context;
use mofgen_codec::{train_test_split, Dataset, DatasetSummary, FeatureCodec, FeatureSchema};
use mofgen_common::{MofRecord, PerProperty, Property};
use mofgen_models::{
    Autoencoder, AutoencoderConfig, EpochObserver, PredictorConfig, PropertyPredictor, RegressionMetrics,
    TrainingHistory, TrainingRngs,
};
use mofgen_ranker::RankingConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::generate::{GenerationOutcome, Generator};
use crate::seeds::SeedPolicy;

/// Seeds for the four independent random streams of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngSeeds {
    /// Train/test split shuffle (default: 42)
    #[serde(default = "default_split_seed")]
    pub split: u64,

    /// Parameter initialization and dropout masks (default: 43)
    #[serde(default = "default_init_seed")]
    pub init: u64,

    /// Mini-batch order (default: 44)
    #[serde(default = "default_shuffle_seed")]
    pub shuffle: u64,

    /// Latent sampling (default: 45)
    #[serde(default = "default_sampling_seed")]
    pub sampling: u64,
}

fn default_split_seed() -> u64 { 42 }
fn default_init_seed() -> u64 { 43 }
fn default_shuffle_seed() -> u64 { 44 }
fn default_sampling_seed() -> u64 { 45 }

impl Default for RngSeeds {
    fn default() -> Self {
        Self {
            split: default_split_seed(),
            init: default_init_seed(),
            shuffle: default_shuffle_seed(),
            sampling: default_sampling_seed(),
        }
    }
}

impl RngSeeds {
    pub fn sampling_rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.sampling)
    }
}

/// Everything training needs besides the data.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub features: FeatureSchema,
    pub test_fraction: f64,
    pub autoencoder: AutoencoderConfig,
    pub predictor: PredictorConfig,
    pub ranking: RankingConfig,
    pub seeds: RngSeeds,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            features: FeatureSchema::default(),
            test_fraction: 0.2,
            autoencoder: AutoencoderConfig::default(),
            predictor: PredictorConfig::default(),
            ranking: RankingConfig::default(),
            seeds: RngSeeds::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictorReport {
    pub property: Property,
    pub history: TrainingHistory,
    /// `None` when the split left no test rows.
    pub test: Option<RegressionMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub dataset: DatasetSummary,
    pub target_ranges: PerProperty<(f64, f64)>,
    pub autoencoder: TrainingHistory,
    pub autoencoder_test_loss: Option<f64>,
    pub predictors: Vec<PredictorReport>,
}

/// Trained models plus the normalized training set. Immutable; `generate`
/// can be called any number of times with different RNGs.
#[derive(Debug, Clone)]
pub struct TrainedPipeline {
    codec: FeatureCodec,
    autoencoder: Autoencoder,
    predictors: PerProperty<PropertyPredictor>,
    train_features: Vec<Vec<f32>>,
    train_targets: Vec<PerProperty<f64>>,
    ranking: RankingConfig,
    report: TrainingReport,
}

impl TrainedPipeline {
    pub fn train(dataset: Dataset, settings: &PipelineSettings) -> anyhow::Result<Self> {
        Self::train_with_observer(dataset, settings, None)
    }

    pub fn train_with_observer(
        dataset: Dataset,
        settings: &PipelineSettings,
        mut observer: Option<&mut dyn EpochObserver>,
    ) -> anyhow::Result<Self> {
        settings.ranking.validate()?;

        let target_ranges = dataset.target_ranges();
        for (p, (lo, hi)) in target_ranges.iter() {
            info!("{} range: {:.4} to {:.4} {}", p, lo, hi, p.unit());
        }

        let rows_read = dataset.rows_read;
        let rows_dropped = dataset.rows_dropped;
        let mut split_rng = StdRng::seed_from_u64(settings.seeds.split);
        let (train, test) = train_test_split(dataset.records, settings.test_fraction, &mut split_rng);
        info!(train = train.len(), test = test.len(), "Split dataset");
        if test.is_empty() {
            warn!("No test rows, held-out metrics will be skipped");
        }

        let train_raw: Vec<MofRecord> = train.iter().map(|r| r.record.clone()).collect();
        let codec = FeatureCodec::fit(&train_raw, &settings.features).context("fitting feature codec")?;
        let train_features = codec.apply_all(&train_raw);
        let test_features: Vec<Vec<f32>> = test.iter().map(|r| codec.apply(&r.record)).collect();
        info!(width = codec.width(), "Feature codec fitted");

        let mut rngs = TrainingRngs::from_seeds(settings.seeds.init, settings.seeds.shuffle);

        let (autoencoder, ae_history) = Autoencoder::train(
            &train_features,
            &settings.autoencoder,
            &mut rngs,
            reborrow(&mut observer),
        )
        .context("training autoencoder")?;
        let autoencoder_test_loss = if test_features.is_empty() {
            None
        } else {
            Some(autoencoder.reconstruction_error(&test_features)?)
        };

        let mut reports = Vec::with_capacity(Property::ALL.len());
        let predictors = PerProperty::try_from_fn(|p| -> anyhow::Result<PropertyPredictor> {
            let targets: Vec<f64> = train.iter().map(|r| r.targets[p]).collect();
            let (model, history) = PropertyPredictor::train(
                p,
                &train_features,
                &targets,
                &settings.predictor,
                &mut rngs,
                reborrow(&mut observer),
            )
            .with_context(|| format!("training {} predictor", p.key()))?;

            let test_metrics = if test_features.is_empty() {
                None
            } else {
                let actual: Vec<f64> = test.iter().map(|r| r.targets[p]).collect();
                Some(model.evaluate(&test_features, &actual)?)
            };
            reports.push(PredictorReport {
                property: p,
                history,
                test: test_metrics,
            });
            Ok(model)
        })?;

        let report = TrainingReport {
            dataset: DatasetSummary {
                rows_read,
                rows_dropped,
                rows_kept: train.len() + test.len(),
                train_rows: train.len(),
                test_rows: test.len(),
            },
            target_ranges,
            autoencoder: ae_history,
            autoencoder_test_loss,
            predictors: reports,
        };

        Ok(Self {
            codec,
            autoencoder,
            predictors,
            train_features,
            train_targets: train.into_iter().map(|r| r.targets).collect(),
            ranking: settings.ranking.clone(),
            report,
        })
    }

    /// Sample `num_samples` candidates around the seeds chosen by `policy`
    /// and rank them.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        policy: &SeedPolicy,
        num_samples: usize,
        rng: &mut R,
    ) -> anyhow::Result<GenerationOutcome> {
        Generator {
            codec: &self.codec,
            latent_model: &self.autoencoder,
            predictors: &self.predictors,
            features: &self.train_features,
            targets: &self.train_targets,
            ranking: &self.ranking,
        }
        .run(policy, num_samples, rng)
    }

    pub fn codec(&self) -> &FeatureCodec {
        &self.codec
    }

    pub fn autoencoder(&self) -> &Autoencoder {
        &self.autoencoder
    }

    pub fn predictors(&self) -> &PerProperty<PropertyPredictor> {
        &self.predictors
    }

    pub fn report(&self) -> &TrainingReport {
        &self.report
    }

    pub fn train_rows(&self) -> usize {
        self.train_features.len()
    }
}

fn reborrow<'s>(observer: &'s mut Option<&mut dyn EpochObserver>) -> Option<&'s mut dyn EpochObserver> {
    match observer {
        Some(obs) => Some(&mut **obs),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mofgen_codec::{parse_dataset, DatasetSchema};
    use mofgen_models::{EpochControl, LatentModel};
    use mofgen_test_utils::{synthetic_records, to_csv};

    fn dataset(n: usize) -> Dataset {
        parse_dataset(&to_csv(&synthetic_records(n, 21)).unwrap(), &DatasetSchema::default()).unwrap()
    }

    fn quick_settings() -> PipelineSettings {
        PipelineSettings {
            autoencoder: AutoencoderConfig::default().with_epochs(2),
            predictor: PredictorConfig::default().with_epochs(2),
            ..PipelineSettings::default()
        }
    }

    #[test]
    fn test_train_reports_every_stage() {
        let pipeline = TrainedPipeline::train(dataset(120), &quick_settings()).unwrap();
        let report = pipeline.report();
        assert_eq!(report.dataset.rows_kept, 120);
        assert_eq!(report.dataset.test_rows, 24);
        assert_eq!(pipeline.train_rows(), 96);
        assert_eq!(report.autoencoder.epoch_losses.len(), 2);
        assert!(report.autoencoder_test_loss.is_some());
        let props: Vec<_> = report.predictors.iter().map(|r| r.property).collect();
        assert_eq!(props, Property::ALL.to_vec());
        assert!(report.predictors.iter().all(|r| r.test.is_some()));
        assert_eq!(pipeline.autoencoder().feature_dim(), pipeline.codec().width());
    }

    #[test]
    fn test_zero_test_fraction_skips_held_out_metrics() {
        let settings = PipelineSettings {
            test_fraction: 0.0,
            ..quick_settings()
        };
        let pipeline = TrainedPipeline::train(dataset(40), &settings).unwrap();
        let report = pipeline.report();
        assert_eq!(report.dataset.test_rows, 0);
        assert_eq!(pipeline.train_rows(), 40);
        assert!(report.autoencoder_test_loss.is_none());
        assert!(report.predictors.iter().all(|r| r.test.is_none()));
    }

    #[test]
    fn test_observer_sees_all_five_networks() {
        let mut models = Vec::new();
        let mut observer = |model: &str, _: usize, _: f32| {
            if !models.iter().any(|m: &String| m == model) {
                models.push(model.to_string());
            }
            EpochControl::Continue
        };
        TrainedPipeline::train_with_observer(dataset(60), &quick_settings(), Some(&mut observer)).unwrap();
        assert_eq!(
            models,
            vec!["autoencoder", "ground_state_energy", "co2_uptake", "selectivity", "heat_adsorption"]
        );
    }

    #[test]
    fn test_invalid_ranking_config_is_rejected() {
        let mut settings = quick_settings();
        settings.ranking.primary_percentile = 150.0;
        assert!(TrainedPipeline::train(dataset(30), &settings).is_err());
    }
}
