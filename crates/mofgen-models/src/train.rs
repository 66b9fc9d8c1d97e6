//! Explicit Adam training loop shared by the autoencoder and the regressors.

use candle_core::{Device, Tensor, Var};
use candle_nn::{AdamW, Optimizer, ParamsAdamW};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ModelError, Result};
use crate::mlp::{dense, init_layer, DenseLayer, LayerSpec, MlpParams};

/// Random streams consumed by training: one for parameter init and dropout
/// masks, one for mini-batch order.
#[derive(Debug, Clone)]
pub struct TrainingRngs {
    pub init: StdRng,
    pub shuffle: StdRng,
}

impl TrainingRngs {
    pub fn from_seeds(init: u64, shuffle: u64) -> Self {
        Self {
            init: StdRng::seed_from_u64(init),
            shuffle: StdRng::seed_from_u64(shuffle),
        }
    }
}

/// What an [`EpochObserver`] wants the loop to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochControl {
    Continue,
    Stop,
}

/// Called after every epoch with the network label, the 1-based epoch number
/// and the epoch's mean training loss.
pub trait EpochObserver {
    fn on_epoch(&mut self, model: &str, epoch: usize, loss: f32) -> EpochControl;
}

impl<F> EpochObserver for F
where
    F: FnMut(&str, usize, f32) -> EpochControl,
{
    fn on_epoch(&mut self, model: &str, epoch: usize, loss: f32) -> EpochControl {
        self(model, epoch, loss)
    }
}

/// Per-epoch mean loss of one training run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub epoch_losses: Vec<f32>,
    pub stopped_early: bool,
}

impl TrainingHistory {
    pub fn final_loss(&self) -> Option<f32> {
        self.epoch_losses.last().copied()
    }
}

/// Loop settings independent of the network shape.
#[derive(Debug, Clone)]
pub(crate) struct FitOptions {
    pub epochs: usize,
    /// `None` means full batch.
    pub batch_size: Option<usize>,
    pub learning_rate: f64,
    pub shuffle: bool,
}

struct TrainableLayer {
    weight: Var,
    bias: Var,
    spec: LayerSpec,
}

/// Train a fresh network of shape `specs` to map `inputs` onto `targets`
/// under mean squared error.
pub(crate) fn fit_mlp(
    label: &str,
    specs: &[LayerSpec],
    inputs: &[Vec<f32>],
    targets: &[Vec<f32>],
    options: &FitOptions,
    rngs: &mut TrainingRngs,
    mut observer: Option<&mut dyn EpochObserver>,
) -> Result<(MlpParams, TrainingHistory)> {
    let (first, last) = match (specs.first(), specs.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return Err(ModelError::InvalidInput(format!("{label}: no layers"))),
    };
    if inputs.is_empty() {
        return Err(ModelError::EmptyTrainingSet(label.to_string()));
    }
    if inputs.len() != targets.len() {
        return Err(ModelError::InvalidInput(format!(
            "{label}: {} inputs but {} targets",
            inputs.len(),
            targets.len()
        )));
    }

    let device = Device::Cpu;
    let x_all = flatten(inputs, first.input, &device)?;
    let y_all = flatten(targets, last.output, &device)?;

    let mut layers = Vec::with_capacity(specs.len());
    for spec in specs {
        let (w, b) = init_layer(spec, &mut rngs.init);
        layers.push(TrainableLayer {
            weight: Var::from_vec(w, (spec.output, spec.input), &device)?,
            bias: Var::from_vec(b, spec.output, &device)?,
            spec: *spec,
        });
    }
    let vars: Vec<Var> = layers
        .iter()
        .flat_map(|l| [l.weight.clone(), l.bias.clone()])
        .collect();
    let mut optimizer = AdamW::new(
        vars,
        ParamsAdamW {
            lr: options.learning_rate,
            weight_decay: 0.0,
            ..Default::default()
        },
    )?;

    let n = inputs.len();
    let batch_size = options.batch_size.unwrap_or(n).clamp(1, n);
    let mut order: Vec<u32> = (0..n as u32).collect();
    let mut history = TrainingHistory::default();

    info!(
        model = label,
        rows = n,
        epochs = options.epochs,
        batch_size,
        "Training network"
    );

    for epoch in 1..=options.epochs {
        if options.shuffle && batch_size < n {
            order.shuffle(&mut rngs.shuffle);
        }

        let mut weighted_loss = 0.0f64;
        for chunk in order.chunks(batch_size) {
            let idx = Tensor::from_slice(chunk, chunk.len(), &device)?;
            let x = x_all.index_select(&idx, 0)?;
            let y = y_all.index_select(&idx, 0)?;

            let pred = forward_train(&layers, &x, &mut rngs.init)?;
            let loss = candle_nn::loss::mse(&pred, &y)?;
            optimizer.backward_step(&loss)?;
            weighted_loss += loss.to_scalar::<f32>()? as f64 * chunk.len() as f64;
        }

        let epoch_loss = (weighted_loss / n as f64) as f32;
        if !epoch_loss.is_finite() {
            warn!(model = label, epoch, "Non-finite training loss");
        }
        history.epoch_losses.push(epoch_loss);
        debug!(model = label, epoch, loss = epoch_loss, "Epoch complete");
        if epoch % 10 == 0 {
            info!(model = label, epoch, loss = epoch_loss, "Training progress");
        }

        if let Some(obs) = observer.as_mut() {
            if obs.on_epoch(label, epoch, epoch_loss) == EpochControl::Stop {
                info!(model = label, epoch, "Training stopped by observer");
                history.stopped_early = true;
                break;
            }
        }
    }

    let frozen = layers
        .iter()
        .map(|l| {
            Ok(DenseLayer {
                weight: freeze(l.weight.as_tensor(), &device)?,
                bias: freeze(l.bias.as_tensor(), &device)?,
                activation: l.spec.activation,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((MlpParams::new(frozen)?, history))
}

/// Forward pass over trainable vars with inverted dropout masks.
fn forward_train(layers: &[TrainableLayer], x: &Tensor, rng: &mut StdRng) -> Result<Tensor> {
    let mut h = x.clone();
    for layer in layers {
        h = dense(&h, layer.weight.as_tensor(), layer.bias.as_tensor(), layer.spec.activation)?;
        let p = layer.spec.dropout;
        if p > 0.0 {
            let (rows, cols) = h.dims2()?;
            let keep = 1.0 / (1.0 - p);
            let mask: Vec<f32> = (0..rows * cols)
                .map(|_| if rng.gen::<f32>() < p { 0.0 } else { keep })
                .collect();
            h = h.mul(&Tensor::from_vec(mask, (rows, cols), h.device())?)?;
        }
    }
    Ok(h)
}

fn flatten(rows: &[Vec<f32>], width: usize, device: &Device) -> Result<Tensor> {
    crate::mlp::rows_to_tensor(rows, width, device)
}

/// Copy a var's current value into a tensor detached from the graph.
fn freeze(t: &Tensor, device: &Device) -> Result<Tensor> {
    let data = t.flatten_all()?.to_vec1::<f32>()?;
    Ok(Tensor::from_vec(data, t.dims().to_vec(), device)?)
}
