//! Hyperparameters for the autoencoder and the property regressors.

use serde::{Deserialize, Serialize};

/// Configuration for the representation autoencoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoencoderConfig {
    /// Latent vector length (default: 16)
    #[serde(default = "default_latent_dim")]
    pub latent_dim: usize,

    /// Encoder hidden widths; the decoder mirrors them (default: [64, 32])
    #[serde(default = "default_hidden")]
    pub hidden: Vec<usize>,

    /// Passes over the training set (default: 50)
    #[serde(default = "default_epochs")]
    pub epochs: usize,

    /// Mini-batch size (default: 32)
    #[serde(default = "default_ae_batch_size")]
    pub batch_size: usize,

    /// Adam learning rate (default: 1e-3)
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// Reshuffle the training set every epoch (default: true)
    #[serde(default = "default_true")]
    pub shuffle: bool,
}

fn default_latent_dim() -> usize { 16 }
fn default_hidden() -> Vec<usize> { vec![64, 32] }
fn default_epochs() -> usize { 50 }
fn default_ae_batch_size() -> usize { 32 }
fn default_learning_rate() -> f64 { 1e-3 }
fn default_dropout() -> f32 { 0.2 }
fn default_true() -> bool { true }

impl Default for AutoencoderConfig {
    fn default() -> Self {
        Self {
            latent_dim: default_latent_dim(),
            hidden: default_hidden(),
            epochs: default_epochs(),
            batch_size: default_ae_batch_size(),
            learning_rate: default_learning_rate(),
            shuffle: true,
        }
    }
}

impl AutoencoderConfig {
    pub fn with_latent_dim(mut self, dim: usize) -> Self {
        self.latent_dim = dim;
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }
}

/// Configuration shared by the four property regressors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Hidden widths (default: [64, 32])
    #[serde(default = "default_hidden")]
    pub hidden: Vec<usize>,

    /// Dropout after the first hidden layer during training (default: 0.2)
    #[serde(default = "default_dropout")]
    pub dropout: f32,

    /// Optimizer steps over the training set (default: 50)
    #[serde(default = "default_epochs")]
    pub epochs: usize,

    /// Adam learning rate (default: 1e-3)
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// Mini-batch size; `None` trains full-batch, one step per epoch (default)
    #[serde(default)]
    pub batch_size: Option<usize>,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            hidden: default_hidden(),
            dropout: default_dropout(),
            epochs: default_epochs(),
            learning_rate: default_learning_rate(),
            batch_size: None,
        }
    }
}

impl PredictorConfig {
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }
}
