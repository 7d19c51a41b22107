//! Model training and evaluation.
//!
//! The trainer owns a compiled [`SequentialModel`] together with one
//! optimizer state per parameter tensor. Training is synchronous and
//! blocking; each call to [`Trainer::fit`] runs the full epoch loop and
//! streams per-epoch progress through `tracing`.
//!
//! Updates are derivative-free: each step estimates a gradient for a
//! sampled coordinate subset of one parameter tensor with central finite
//! differences, clips it, and feeds it through the configured optimizer.

use stockcast_layers::Tensor;
use stockcast_optimizer::{create_optimizer, OptimizerConfig, OptimizerDyn};

use crate::error::{ForecastError, ForecastResult};
use crate::loss::Loss;
use crate::metrics::{exact_match_accuracy, Metrics};
use crate::model::SequentialModel;
use crate::options::ForecastOptions;

/// Gradient clip applied to every finite-difference estimate.
const GRAD_CLIP: f32 = 1.0;
/// Coordinates sampled per update step.
const FD_NUM_COORDS: usize = 256;
/// Lower and upper bounds for the adaptive perturbation size.
const FD_EPSILON_MIN: f32 = 1e-6;
const FD_EPSILON_MAX: f32 = 1e-2;

/// A compiled model plus its training state.
pub struct Trainer {
    model: SequentialModel,
    options: ForecastOptions,
    loss: Loss,
    optimizers: Vec<Box<dyn OptimizerDyn>>,
    fd_epsilon: f32,
    global_step: usize,
}

impl std::fmt::Debug for Trainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trainer")
            .field("model", &self.model)
            .field("options", &self.options)
            .field("loss", &self.loss)
            .field("fd_epsilon", &self.fd_epsilon)
            .field("global_step", &self.global_step)
            .finish()
    }
}

impl Trainer {
    /// Compiles a built model: resolves the optimizer and loss names and
    /// attaches one optimizer state per parameter tensor.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::UnknownOptimizer`] or
    /// [`ForecastError::UnknownLoss`] when a name token fails to resolve.
    pub fn compile(mut model: SequentialModel, options: &ForecastOptions) -> ForecastResult<Self> {
        let loss = Loss::for_name(&options.loss)?;
        let config = OptimizerConfig::for_name(&options.optimizer, options.learning_rate)
            .map_err(|_| ForecastError::UnknownOptimizer {
                name: options.optimizer.clone(),
            })?;

        let optimizers: Vec<Box<dyn OptimizerDyn>> = model
            .parameters_mut()
            .iter()
            .map(|_| create_optimizer(config.clone()))
            .collect();

        Ok(Self {
            model,
            options: options.clone(),
            loss,
            optimizers,
            fd_epsilon: 1e-3,
            global_step: 0,
        })
    }

    /// Returns the compiled model.
    pub fn model(&self) -> &SequentialModel {
        &self.model
    }

    /// Returns the resolved loss function.
    pub fn loss(&self) -> Loss {
        self.loss
    }

    /// Trains the model for the configured number of epochs.
    ///
    /// `train_x` is `[samples, timesteps, features]`; `train_y` is
    /// `[samples]` or `[samples, 1]`. Returns the per-epoch metrics.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::Configuration`] for empty or mismatched
    /// arrays; layer failures propagate unchanged.
    pub fn fit(&mut self, train_x: &Tensor, train_y: &Tensor) -> ForecastResult<Vec<Metrics>> {
        let (samples, window_len) = check_window_batch(train_x, "train_x")?;
        let targets = as_column(train_y, samples, "train_y")?;
        let batch_size = self.options.resolved_batch_size(window_len).max(1);

        self.model.set_training(true);
        let mut history = Vec::with_capacity(self.options.epochs);

        for epoch in 1..=self.options.epochs {
            let mut epoch_loss = 0.0f64;
            let mut epoch_preds: Vec<f32> = Vec::with_capacity(samples);

            let mut start = 0;
            while start < samples {
                let end = (start + batch_size).min(samples);
                let x_batch = slice_windows(train_x, start, end);
                let y_batch = slice_column(&targets, start, end);

                let predictions = self.model.forward(&x_batch)?;
                let batch_loss = self.loss.compute(&predictions, &y_batch);
                epoch_loss += batch_loss as f64 * (end - start) as f64;
                epoch_preds.extend_from_slice(predictions.data());

                self.finite_difference_step(&x_batch, &y_batch)?;
                self.global_step += 1;

                tracing::debug!(
                    step = self.global_step,
                    batch_loss,
                    "processed batch {}..{}",
                    start,
                    end
                );
                start = end;
            }

            let mean_loss = epoch_loss / samples as f64;
            let accuracy = exact_match_accuracy(&epoch_preds, targets.data());
            tracing::info!(
                "Epoch {}/{} - loss: {:.6} - accuracy: {:.4}",
                epoch,
                self.options.epochs,
                mean_loss,
                accuracy
            );
            history.push(Metrics::new(mean_loss, epoch).with_accuracy(accuracy));
        }

        self.model.set_training(false);
        Ok(history)
    }

    /// Runs the model on held-out data and scores it.
    ///
    /// Returns the raw predictions `[samples, 1]` together with the
    /// evaluation metrics.
    pub fn evaluate(&mut self, test_x: &Tensor, test_y: &Tensor) -> ForecastResult<(Tensor, Metrics)> {
        let (samples, _) = check_window_batch(test_x, "test_x")?;
        let targets = as_column(test_y, samples, "test_y")?;

        self.model.set_training(false);
        let predictions = self.model.forward(test_x)?;
        let loss = self.loss.compute(&predictions, &targets) as f64;
        let accuracy = exact_match_accuracy(predictions.data(), targets.data());

        tracing::info!("Evaluation complete: loss = {:.6}", loss);
        Ok((predictions, Metrics::new(loss, 0).with_accuracy(accuracy)))
    }

    /// Loss of the current model on a batch, without updating anything.
    fn batch_loss(&self, x: &Tensor, y: &Tensor) -> ForecastResult<f32> {
        let predictions = self.model.forward(x)?;
        Ok(self.loss.compute(&predictions, y))
    }

    /// One derivative-free update: estimate the gradient along a sampled
    /// coordinate subset of one parameter tensor and apply it through that
    /// tensor's optimizer.
    fn finite_difference_step(&mut self, x: &Tensor, y: &Tensor) -> ForecastResult<()> {
        let num_params = {
            let params = self.model.parameters_mut();
            params.len()
        };
        if num_params == 0 {
            return Ok(());
        }
        let param_idx = self.global_step % num_params;

        let param_len = {
            let mut params = self.model.parameters_mut();
            params[param_idx].data_mut().len()
        };
        if param_len == 0 {
            return Ok(());
        }

        let coord_count = FD_NUM_COORDS.min(param_len);
        let mut coord_indices = Vec::with_capacity(coord_count);
        let mut coord_deltas = Vec::with_capacity(coord_count);
        for j in 0..coord_count {
            let h = (self.global_step as u64)
                .wrapping_mul(1_000_003)
                .wrapping_add(param_idx as u64 * 97)
                .wrapping_add(j as u64 * 1_009);
            coord_indices.push((h as usize) % param_len);
            coord_deltas.push(if (h >> 11) & 1 == 0 { 1.0f32 } else { -1.0f32 });
        }

        let eps = self.fd_epsilon;

        // Perturb +eps along the sampled direction
        self.nudge(param_idx, &coord_indices, &coord_deltas, eps);
        let loss_plus = self.batch_loss(x, y)?;

        // Cross to the -eps side
        self.nudge(param_idx, &coord_indices, &coord_deltas, -2.0 * eps);
        let loss_minus = self.batch_loss(x, y)?;

        // Restore original weights
        self.nudge(param_idx, &coord_indices, &coord_deltas, eps);

        let coeff = (loss_plus - loss_minus) / (2.0 * eps);

        let mut gradients = vec![0.0f32; param_len];
        for (&idx, &delta) in coord_indices.iter().zip(coord_deltas.iter()) {
            gradients[idx] = (coeff * delta).clamp(-GRAD_CLIP, GRAD_CLIP);
        }

        {
            let mut params = self.model.parameters_mut();
            self.optimizers[param_idx].apply_gradients(params[param_idx].data_mut(), &gradients);
        }

        // Adapt the perturbation size: shrink on overflow, grow when the
        // probe no longer separates the two sides.
        if !loss_plus.is_finite() || !loss_minus.is_finite() {
            self.fd_epsilon = (self.fd_epsilon * 0.5).max(FD_EPSILON_MIN);
        } else if (loss_plus - loss_minus).abs() < 1e-6 {
            self.fd_epsilon = (self.fd_epsilon * 1.05).min(FD_EPSILON_MAX);
        }

        Ok(())
    }

    /// Adds `amount * delta_j` to the sampled coordinates of one parameter
    /// tensor.
    fn nudge(&mut self, param_idx: usize, indices: &[usize], deltas: &[f32], amount: f32) {
        let mut params = self.model.parameters_mut();
        let data = params[param_idx].data_mut();
        for (&idx, &delta) in indices.iter().zip(deltas.iter()) {
            data[idx] += amount * delta;
        }
    }
}

/// Validates a `[samples, timesteps, features]` batch and returns
/// `(samples, timesteps)`.
fn check_window_batch(x: &Tensor, what: &str) -> ForecastResult<(usize, usize)> {
    if x.ndim() != 3 {
        return Err(ForecastError::Configuration {
            message: format!(
                "{} must be [samples, timesteps, features], got shape {:?}",
                what,
                x.shape()
            ),
        });
    }
    let samples = x.shape()[0];
    if samples == 0 {
        return Err(ForecastError::Configuration {
            message: format!("{} is empty", what),
        });
    }
    Ok((samples, x.shape()[1]))
}

/// Accepts `[n]` or `[n, 1]` targets and reshapes to a `[n, 1]` column.
fn as_column(y: &Tensor, samples: usize, what: &str) -> ForecastResult<Tensor> {
    let ok = match y.ndim() {
        1 => y.shape()[0] == samples,
        2 => y.shape()[0] == samples && y.shape()[1] == 1,
        _ => false,
    };
    if !ok {
        return Err(ForecastError::Configuration {
            message: format!(
                "{} must hold one target per sample ({}), got shape {:?}",
                what,
                samples,
                y.shape()
            ),
        });
    }
    Ok(y.reshape(&[samples, 1]))
}

/// Copies window rows `start..end` out of a `[n, t, f]` tensor.
fn slice_windows(x: &Tensor, start: usize, end: usize) -> Tensor {
    let t = x.shape()[1];
    let f = x.shape()[2];
    let row = t * f;
    let data = x.data()[start * row..end * row].to_vec();
    Tensor::from_data(&[end - start, t, f], data)
}

/// Copies rows `start..end` out of a `[n, 1]` column tensor.
fn slice_column(y: &Tensor, start: usize, end: usize) -> Tensor {
    let data = y.data()[start..end].to_vec();
    Tensor::from_data(&[end - start, 1], data)
}
