//! Diagonal Gaussian over seed encodings.

use mofgen_common::MofgenError;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::Serialize;
use tracing::debug;

/// Per-dimension mean and sample standard deviation of the seed encodings.
/// Dimensions are treated as independent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatentSampler {
    pub mean: Vec<f32>,
    pub std: Vec<f32>,
}

impl LatentSampler {
    /// Fit on latent vectors of equal length. One vector gives zero spread.
    pub fn fit(latents: &[Vec<f32>]) -> Result<Self, MofgenError> {
        let dim = latents
            .first()
            .map(Vec::len)
            .ok_or_else(|| MofgenError::EmptySeedSet("no seed encodings to fit".to_string()))?;
        if let Some(bad) = latents.iter().position(|z| z.len() != dim) {
            return Err(MofgenError::InvalidInput(format!(
                "seed encoding {bad} has length {}, expected {dim}",
                latents[bad].len()
            )));
        }

        let n = latents.len() as f64;
        let mut mean = vec![0.0f64; dim];
        for z in latents {
            for (m, v) in mean.iter_mut().zip(z) {
                *m += *v as f64;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let std: Vec<f32> = if latents.len() < 2 {
            vec![0.0; dim]
        } else {
            (0..dim)
                .map(|d| {
                    let ss: f64 = latents.iter().map(|z| (z[d] as f64 - mean[d]).powi(2)).sum();
                    (ss / (n - 1.0)).sqrt() as f32
                })
                .collect()
        };

        debug!(seeds = latents.len(), dim, "Latent sampler fitted");
        Ok(Self {
            mean: mean.into_iter().map(|m| m as f32).collect(),
            std,
        })
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Draw `n` vectors `mean + std ⊙ ε`, `ε ~ N(0, I)`.
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<Vec<f32>> {
        (0..n)
            .map(|_| {
                self.mean
                    .iter()
                    .zip(&self.std)
                    .map(|(m, s)| {
                        let eps: f32 = rng.sample(StandardNormal);
                        m + s * eps
                    })
                    .collect()
            })
            .collect()
    }
}
