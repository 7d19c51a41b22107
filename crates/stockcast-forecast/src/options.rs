//! Forecast model configuration.

use serde::{Deserialize, Serialize};
use stockcast_layers::Activation;

/// Fraction of the training window length used to derive a batch size when
/// none is configured.
const BATCH_SIZE_FRACTION: f32 = 0.025;

/// Shape of one input window: time steps by features per step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputShape {
    /// Number of time steps per window
    pub timesteps: usize,
    /// Number of features per time step
    pub features: usize,
}

impl InputShape {
    /// Creates a new input shape descriptor.
    pub fn new(timesteps: usize, features: usize) -> Self {
        Self {
            timesteps,
            features,
        }
    }
}

/// Hyperparameters for the model factory and trainer.
///
/// The record is immutable once handed to the factory; the batch-size
/// default is resolved through [`ForecastOptions::resolved_batch_size`]
/// rather than mutated in place.
///
/// # Example
///
/// ```
/// use stockcast_forecast::options::ForecastOptions;
///
/// let options = ForecastOptions::default()
///     .with_iterations(2)
///     .with_epochs(5)
///     .with_batch_size(None);
/// assert_eq!(options.iterations, 2);
/// assert_eq!(options.resolved_batch_size(40), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastOptions {
    /// Depth of the stacked recurrent block. The model gets
    /// `iterations - 1` sequence-emitting layers plus one terminal layer.
    pub iterations: usize,
    /// Number of training epochs.
    pub epochs: usize,
    /// Hidden units per recurrent layer.
    pub units: usize,
    /// Mini-batch size. `None` derives a size from the training window
    /// length (see [`ForecastOptions::resolved_batch_size`]).
    pub batch_size: Option<usize>,
    /// Dropout rate applied after each stacked recurrent layer.
    pub dropout: f32,
    /// Optimizer name: one of "sgd", "adam", "rmsprop".
    pub optimizer: String,
    /// Loss-function name: one of "mse", "mae" (long names accepted).
    pub loss: String,
    /// Learning rate handed to the resolved optimizer.
    pub learning_rate: f32,
    /// Activation used when the requested activation name is unknown.
    /// `None` makes an unknown name a hard error; `Some(Activation::Tanh)`
    /// reproduces the legacy silent-fallback behavior.
    pub fallback_activation: Option<Activation>,
}

impl Default for ForecastOptions {
    fn default() -> Self {
        Self {
            iterations: 1,
            epochs: 20,
            units: 40,
            batch_size: Some(10),
            dropout: 0.1,
            optimizer: "adam".to_string(),
            loss: "mse".to_string(),
            learning_rate: 1e-3,
            fallback_activation: None,
        }
    }
}

impl ForecastOptions {
    /// Sets the stacked-layer depth.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the number of training epochs.
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Sets the hidden units per recurrent layer.
    pub fn with_units(mut self, units: usize) -> Self {
        self.units = units;
        self
    }

    /// Sets or clears the mini-batch size.
    pub fn with_batch_size(mut self, batch_size: Option<usize>) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the dropout rate for the stacked layers.
    pub fn with_dropout(mut self, dropout: f32) -> Self {
        self.dropout = dropout;
        self
    }

    /// Sets the optimizer name.
    pub fn with_optimizer(mut self, optimizer: impl Into<String>) -> Self {
        self.optimizer = optimizer.into();
        self
    }

    /// Sets the loss-function name.
    pub fn with_loss(mut self, loss: impl Into<String>) -> Self {
        self.loss = loss.into();
        self
    }

    /// Sets the learning rate.
    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Sets the fallback activation for unknown activation names.
    pub fn with_fallback_activation(mut self, fallback: Option<Activation>) -> Self {
        self.fallback_activation = fallback;
        self
    }

    /// Resolves the effective mini-batch size for a training window length.
    ///
    /// When `batch_size` is unset, the size is 2.5% of the window length,
    /// rounded, and never below one. The derivation is keyed to the window
    /// length (not the sample count) to match the behavior trained models
    /// were tuned against; callers wanting a row-count-based size set
    /// `batch_size` explicitly.
    pub fn resolved_batch_size(&self, window_len: usize) -> usize {
        match self.batch_size {
            Some(size) => size,
            None => {
                let derived = (window_len as f32 * BATCH_SIZE_FRACTION).round() as usize;
                derived.max(1)
            }
        }
    }
}
