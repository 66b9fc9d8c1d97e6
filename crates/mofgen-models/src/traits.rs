//! Seams between trained models and the generation pipeline.

use mofgen_common::Property;

use crate::error::Result;

/// Scalar regressor for one [`Property`] over normalized feature vectors.
pub trait PropertyModel: Send + Sync {
    fn property(&self) -> Property;

    /// Predictions in original target units, one per row.
    fn predict_batch(&self, rows: &[Vec<f32>]) -> Result<Vec<f64>>;
}

/// Encoder/decoder pair over normalized feature vectors.
pub trait LatentModel: Send + Sync {
    fn latent_dim(&self) -> usize;

    fn feature_dim(&self) -> usize;

    fn encode(&self, rows: &[Vec<f32>]) -> Result<Vec<Vec<f32>>>;

    fn decode(&self, latents: &[Vec<f32>]) -> Result<Vec<Vec<f32>>>;
}
