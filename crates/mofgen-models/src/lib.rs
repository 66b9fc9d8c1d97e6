//! mofgen-models — Autoencoder and property regressors built on Candle.
//!
//! Networks are plain [`MlpParams`] plus pure forward passes; training runs an
//! explicit Adam loop over candle `Var`s and freezes the result. All
//! randomness comes from caller-supplied seeded RNGs ([`TrainingRngs`]).

pub mod autoencoder;
pub mod config;
pub mod error;
pub mod metrics;
pub mod mlp;
pub mod predictor;
pub mod traits;
pub mod train;

pub use autoencoder::Autoencoder;
pub use config::{AutoencoderConfig, PredictorConfig};
pub use error::{ModelError, Result};
pub use metrics::RegressionMetrics;
pub use mlp::{Activation, MlpParams};
pub use predictor::PropertyPredictor;
pub use traits::{LatentModel, PropertyModel};
pub use train::{EpochControl, EpochObserver, TrainingHistory, TrainingRngs};
