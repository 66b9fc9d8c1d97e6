//! Scalar property regressor, instantiated once per [`Property`].

use mofgen_common::Property;
use tracing::{info, warn};

use crate::config::PredictorConfig;
use crate::error::{ModelError, Result};
use crate::metrics::RegressionMetrics;
use crate::mlp::{chain, Activation, LayerSpec, MlpParams};
use crate::traits::PropertyModel;
use crate::train::{fit_mlp, EpochObserver, FitOptions, TrainingHistory, TrainingRngs};

/// `in → hidden… → 1` ReLU regressor. Targets are standardized during
/// training; predictions and the returned loss history are in original units.
#[derive(Debug, Clone)]
pub struct PropertyPredictor {
    property: Property,
    params: MlpParams,
    target_mean: f64,
    target_scale: f64,
}

impl PropertyPredictor {
    pub fn layer_specs(input_dim: usize, config: &PredictorConfig) -> Vec<LayerSpec> {
        let mut dims = vec![input_dim];
        dims.extend(&config.hidden);
        dims.push(1);
        let mut specs = chain(&dims, Activation::Relu, Activation::Identity);
        if specs.len() > 1 {
            specs[0] = specs[0].with_dropout(config.dropout);
        }
        specs
    }

    pub fn train(
        property: Property,
        rows: &[Vec<f32>],
        targets: &[f64],
        config: &PredictorConfig,
        rngs: &mut TrainingRngs,
        observer: Option<&mut dyn EpochObserver>,
    ) -> Result<(Self, TrainingHistory)> {
        let input_dim = rows
            .first()
            .map(Vec::len)
            .ok_or_else(|| ModelError::EmptyTrainingSet(property.key().to_string()))?;
        if rows.len() != targets.len() {
            return Err(ModelError::InvalidInput(format!(
                "{}: {} rows but {} targets",
                property.key(),
                rows.len(),
                targets.len()
            )));
        }
        if !(0.0..1.0).contains(&config.dropout) {
            return Err(ModelError::InvalidInput(format!(
                "dropout must be in [0, 1), got {}",
                config.dropout
            )));
        }

        let n = targets.len() as f64;
        let target_mean = targets.iter().sum::<f64>() / n;
        let std = (targets.iter().map(|t| (t - target_mean).powi(2)).sum::<f64>() / n).sqrt();
        let target_scale = if std > f64::EPSILON { std } else { 1.0 };
        let scaled: Vec<Vec<f32>> = targets
            .iter()
            .map(|t| vec![((t - target_mean) / target_scale) as f32])
            .collect();

        let options = FitOptions {
            epochs: config.epochs,
            batch_size: config.batch_size,
            learning_rate: config.learning_rate,
            shuffle: true,
        };
        let specs = Self::layer_specs(input_dim, config);
        let (params, mut history) = fit_mlp(property.key(), &specs, rows, &scaled, &options, rngs, observer)?;
        // Report training loss in target units, like `evaluate`.
        let unit_factor = (target_scale * target_scale) as f32;
        history.epoch_losses.iter_mut().for_each(|l| *l *= unit_factor);

        info!(
            property = property.key(),
            final_loss = history.final_loss().unwrap_or(f32::NAN),
            "Property predictor trained"
        );
        Ok((
            Self {
                property,
                params,
                target_mean,
                target_scale,
            },
            history,
        ))
    }

    /// Held-out metrics in original target units.
    pub fn evaluate(&self, rows: &[Vec<f32>], actual: &[f64]) -> Result<RegressionMetrics> {
        let predicted = self.predict_batch(rows)?;
        let metrics = RegressionMetrics::compute(actual, &predicted).ok_or_else(|| {
            ModelError::InvalidInput(format!(
                "{}: cannot evaluate {} predictions against {} targets",
                self.property.key(),
                predicted.len(),
                actual.len()
            ))
        })?;
        if !metrics.mse.is_finite() {
            warn!(property = self.property.key(), "Non-finite test loss");
        }
        info!(
            property = self.property.key(),
            mse = metrics.mse,
            rmse = metrics.rmse,
            r2 = metrics.r2,
            "Predictor evaluated"
        );
        Ok(metrics)
    }
}

impl PropertyModel for PropertyPredictor {
    fn property(&self) -> Property {
        self.property
    }

    fn predict_batch(&self, rows: &[Vec<f32>]) -> Result<Vec<f64>> {
        Ok(self
            .params
            .forward_rows(rows)?
            .into_iter()
            .map(|out| out[0] as f64 * self.target_scale + self.target_mean)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(n: usize) -> (Vec<Vec<f32>>, Vec<f64>) {
        let rows: Vec<Vec<f32>> = (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                vec![t, (t * 3.0).sin(), 1.0 - t]
            })
            .collect();
        // Large offset checks that predictions are mapped back to raw units.
        let targets = rows.iter().map(|r| 500.0 + 40.0 * r[0] as f64 - 10.0 * r[1] as f64).collect();
        (rows, targets)
    }

    #[test]
    fn test_layer_specs() {
        let specs = PropertyPredictor::layer_specs(14, &PredictorConfig::default());
        let shape: Vec<_> = specs.iter().map(|s| (s.input, s.output)).collect();
        assert_eq!(shape, vec![(14, 64), (64, 32), (32, 1)]);
        assert_eq!(specs[0].dropout, 0.2);
        assert_eq!(specs[1].dropout, 0.0);
        assert_eq!(specs[2].activation, Activation::Identity);
    }

    #[test]
    fn test_predictions_in_target_units() {
        let (rows, targets) = data(200);
        let config = PredictorConfig::default().with_epochs(150).with_batch_size(32);
        let mut rngs = TrainingRngs::from_seeds(11, 12);
        let (model, history) =
            PropertyPredictor::train(Property::Co2Uptake, &rows, &targets, &config, &mut rngs, None).unwrap();
        assert_eq!(model.property(), Property::Co2Uptake);
        assert!(history.final_loss().unwrap() < history.epoch_losses[0]);

        let preds = model.predict_batch(&rows).unwrap();
        assert_eq!(preds.len(), rows.len());
        let mean = preds.iter().sum::<f64>() / preds.len() as f64;
        assert!((mean - 500.0).abs() < 30.0, "mean prediction {mean}");

        let metrics = model.evaluate(&rows, &targets).unwrap();
        assert!(metrics.r2 > 0.5, "r2 {}", metrics.r2);
    }

    #[test]
    fn test_training_loss_and_test_mse_share_units() {
        // Targets spread over hundreds of units: a standardized loss would be
        // orders of magnitude below the raw-unit evaluation.
        let (rows, targets) = data(120);
        let targets: Vec<f64> = targets.iter().map(|t| t * 25.0).collect();
        let config = PredictorConfig {
            dropout: 0.0,
            ..PredictorConfig::default().with_epochs(30)
        };
        let mut rngs = TrainingRngs::from_seeds(21, 22);
        let (model, history) =
            PropertyPredictor::train(Property::Selectivity, &rows, &targets, &config, &mut rngs, None).unwrap();

        let train_loss = history.final_loss().unwrap() as f64;
        let eval_mse = model.evaluate(&rows, &targets).unwrap().mse;
        let ratio = train_loss / eval_mse;
        assert!((0.5..2.0).contains(&ratio), "train {train_loss} vs eval {eval_mse}");
    }

    #[test]
    fn test_full_batch_is_deterministic() {
        let (rows, targets) = data(40);
        let config = PredictorConfig::default().with_epochs(5);
        let run = || {
            let mut rngs = TrainingRngs::from_seeds(3, 4);
            let (m, h) =
                PropertyPredictor::train(Property::Selectivity, &rows, &targets, &config, &mut rngs, None).unwrap();
            (m.predict_batch(&rows).unwrap(), h)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_rejects_misaligned_targets() {
        let (rows, _) = data(10);
        let mut rngs = TrainingRngs::from_seeds(0, 0);
        let err = PropertyPredictor::train(
            Property::GroundStateEnergy,
            &rows,
            &[1.0, 2.0],
            &PredictorConfig::default(),
            &mut rngs,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::InvalidInput(_)));
    }

    #[test]
    fn test_evaluate_rejects_wrong_length() {
        let (rows, targets) = data(20);
        let mut rngs = TrainingRngs::from_seeds(0, 0);
        let (model, _) = PropertyPredictor::train(
            Property::HeatOfAdsorption,
            &rows,
            &targets,
            &PredictorConfig::default().with_epochs(1),
            &mut rngs,
            None,
        )
        .unwrap();
        assert!(model.evaluate(&rows, &targets[..5]).is_err());
    }
}
