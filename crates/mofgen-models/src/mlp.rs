//! Dense feed-forward networks as plain parameter data plus pure forward passes.
//!
//! A trained network is an immutable [`MlpParams`]; training (see `train.rs`)
//! works on a separate set of candle `Var`s and freezes them into a new
//! `MlpParams` when done.

use candle_core::{Device, Tensor};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Elementwise non-linearity applied after a dense layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    Identity,
    Relu,
    Sigmoid,
}

impl Activation {
    pub fn apply(self, x: &Tensor) -> candle_core::Result<Tensor> {
        match self {
            Activation::Identity => Ok(x.clone()),
            Activation::Relu => x.relu(),
            Activation::Sigmoid => candle_nn::ops::sigmoid(x),
        }
    }
}

/// Shape and behaviour of one dense layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerSpec {
    pub input: usize,
    pub output: usize,
    pub activation: Activation,
    /// Dropout probability applied after the activation, training only.
    pub dropout: f32,
}

impl LayerSpec {
    pub fn new(input: usize, output: usize, activation: Activation) -> Self {
        Self {
            input,
            output,
            activation,
            dropout: 0.0,
        }
    }

    pub fn with_dropout(mut self, p: f32) -> Self {
        self.dropout = p;
        self
    }
}

/// Chain `dims[0] → dims[1] → … → dims[n]` with `hidden` activations on every
/// layer but the last, which gets `output`.
pub fn chain(dims: &[usize], hidden: Activation, output: Activation) -> Vec<LayerSpec> {
    let last = dims.len().saturating_sub(2);
    dims.windows(2)
        .enumerate()
        .map(|(i, w)| LayerSpec::new(w[0], w[1], if i == last { output } else { hidden }))
        .collect()
}

/// PyTorch-style uniform init: weight and bias in `±1/sqrt(fan_in)`.
/// Returns row-major `(output, input)` weights and the bias.
pub(crate) fn init_layer<R: Rng + ?Sized>(spec: &LayerSpec, rng: &mut R) -> (Vec<f32>, Vec<f32>) {
    let bound = 1.0 / (spec.input.max(1) as f32).sqrt();
    let weight = (0..spec.output * spec.input)
        .map(|_| rng.gen_range(-bound..=bound))
        .collect();
    let bias = (0..spec.output).map(|_| rng.gen_range(-bound..=bound)).collect();
    (weight, bias)
}

/// `activation(x · Wᵀ + b)`.
pub(crate) fn dense(x: &Tensor, weight: &Tensor, bias: &Tensor, activation: Activation) -> candle_core::Result<Tensor> {
    let y = x.matmul(&weight.t()?)?.broadcast_add(bias)?;
    activation.apply(&y)
}

#[derive(Debug, Clone)]
pub struct DenseLayer {
    pub weight: Tensor,
    pub bias: Tensor,
    pub activation: Activation,
}

/// Frozen network parameters.
#[derive(Debug, Clone)]
pub struct MlpParams {
    layers: Vec<DenseLayer>,
}

impl MlpParams {
    pub fn new(layers: Vec<DenseLayer>) -> Result<Self> {
        if layers.is_empty() {
            return Err(ModelError::InvalidInput("network needs at least one layer".to_string()));
        }
        Ok(Self { layers })
    }

    pub fn input_dim(&self) -> usize {
        self.layers[0].weight.dims()[1]
    }

    pub fn output_dim(&self) -> usize {
        self.layers[self.layers.len() - 1].weight.dims()[0]
    }

    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    /// Split into the first `n` layers and the rest.
    pub fn split_at(self, n: usize) -> Result<(MlpParams, MlpParams)> {
        if n == 0 || n >= self.layers.len() {
            return Err(ModelError::InvalidInput(format!(
                "cannot split a {}-layer network at {}",
                self.layers.len(),
                n
            )));
        }
        let mut head = self.layers;
        let tail = head.split_off(n);
        Ok((MlpParams { layers: head }, MlpParams { layers: tail }))
    }

    pub fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let mut h = x.clone();
        for layer in &self.layers {
            h = dense(&h, &layer.weight, &layer.bias, layer.activation)?;
        }
        Ok(h)
    }

    /// Row-wise inference over plain vectors.
    pub fn forward_rows(&self, rows: &[Vec<f32>]) -> Result<Vec<Vec<f32>>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let x = rows_to_tensor(rows, self.input_dim(), self.layers[0].weight.device())?;
        Ok(self.forward(&x)?.to_vec2::<f32>()?)
    }
}

/// Stack equally sized rows into a `(rows, width)` tensor.
pub fn rows_to_tensor(rows: &[Vec<f32>], width: usize, device: &Device) -> Result<Tensor> {
    let mut data = Vec::with_capacity(rows.len() * width);
    for (i, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(ModelError::InvalidInput(format!(
                "row {} has length {}, expected {}",
                i,
                row.len(),
                width
            )));
        }
        data.extend_from_slice(row);
    }
    Ok(Tensor::from_vec(data, (rows.len(), width), device)?)
}
