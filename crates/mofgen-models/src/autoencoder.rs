//! Representation autoencoder over normalized MOF feature vectors.

use tracing::info;

use crate::config::AutoencoderConfig;
use crate::error::{ModelError, Result};
use crate::mlp::{chain, Activation, LayerSpec, MlpParams};
use crate::traits::LatentModel;
use crate::train::{fit_mlp, EpochObserver, FitOptions, TrainingHistory, TrainingRngs};

/// Trained encoder/decoder pair. Immutable after training.
#[derive(Debug, Clone)]
pub struct Autoencoder {
    encoder: MlpParams,
    decoder: MlpParams,
}

impl Autoencoder {
    /// Layer shapes for a feature width of `input_dim`: the encoder applies
    /// ReLU after every layer including the latent one, the decoder mirrors
    /// the hidden widths and ends in a sigmoid.
    pub fn layer_specs(input_dim: usize, config: &AutoencoderConfig) -> (Vec<LayerSpec>, Vec<LayerSpec>) {
        let mut enc_dims = vec![input_dim];
        enc_dims.extend(&config.hidden);
        enc_dims.push(config.latent_dim);

        let dec_dims: Vec<usize> = enc_dims.iter().rev().copied().collect();

        (
            chain(&enc_dims, Activation::Relu, Activation::Relu),
            chain(&dec_dims, Activation::Relu, Activation::Sigmoid),
        )
    }

    /// Minimize reconstruction MSE of `rows` with mini-batch Adam.
    pub fn train(
        rows: &[Vec<f32>],
        config: &AutoencoderConfig,
        rngs: &mut TrainingRngs,
        observer: Option<&mut dyn EpochObserver>,
    ) -> Result<(Self, TrainingHistory)> {
        let input_dim = rows
            .first()
            .map(Vec::len)
            .ok_or_else(|| ModelError::EmptyTrainingSet("autoencoder".to_string()))?;
        if config.latent_dim == 0 || config.batch_size == 0 {
            return Err(ModelError::InvalidInput(
                "latent_dim and batch_size must be positive".to_string(),
            ));
        }

        let (enc_specs, dec_specs) = Self::layer_specs(input_dim, config);
        let split = enc_specs.len();
        let specs: Vec<LayerSpec> = enc_specs.into_iter().chain(dec_specs).collect();

        let options = FitOptions {
            epochs: config.epochs,
            batch_size: Some(config.batch_size),
            learning_rate: config.learning_rate,
            shuffle: config.shuffle,
        };
        let (params, history) = fit_mlp("autoencoder", &specs, rows, rows, &options, rngs, observer)?;
        let (encoder, decoder) = params.split_at(split)?;

        info!(
            input_dim,
            latent_dim = config.latent_dim,
            final_loss = history.final_loss().unwrap_or(f32::NAN),
            "Autoencoder trained"
        );
        Ok((Self { encoder, decoder }, history))
    }

    pub fn encoder(&self) -> &MlpParams {
        &self.encoder
    }

    pub fn decoder(&self) -> &MlpParams {
        &self.decoder
    }

    /// Mean squared reconstruction error over `rows`.
    pub fn reconstruction_error(&self, rows: &[Vec<f32>]) -> Result<f64> {
        if rows.is_empty() {
            return Ok(0.0);
        }
        let recon = self.decode(&self.encode(rows)?)?;
        let mut total = 0.0f64;
        let mut count = 0usize;
        for (x, y) in rows.iter().zip(&recon) {
            for (a, b) in x.iter().zip(y) {
                total += ((a - b) as f64).powi(2);
                count += 1;
            }
        }
        Ok(total / count.max(1) as f64)
    }
}

impl LatentModel for Autoencoder {
    fn latent_dim(&self) -> usize {
        self.encoder.output_dim()
    }

    fn feature_dim(&self) -> usize {
        self.encoder.input_dim()
    }

    fn encode(&self, rows: &[Vec<f32>]) -> Result<Vec<Vec<f32>>> {
        self.encoder.forward_rows(rows)
    }

    fn decode(&self, latents: &[Vec<f32>]) -> Result<Vec<Vec<f32>>> {
        self.decoder.forward_rows(latents)
    }
}
