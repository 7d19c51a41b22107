//! Optimizers for stockcast model training.
//!
//! This crate provides the optimization algorithms the forecaster accepts by
//! name. Each optimizer implements the [`Optimizer`] trait and updates a flat
//! parameter slice in place from a gradient slice.
//!
//! # Available Optimizers
//!
//! - [`Sgd`] - Stochastic Gradient Descent
//! - [`Adam`] - Adaptive Moment Estimation
//! - [`Rmsprop`] - Root Mean Square Propagation
//!
//! # Example
//!
//! ```
//! use stockcast_optimizer::{Optimizer, Sgd, OptimizerConfig};
//!
//! let config = OptimizerConfig::Sgd { learning_rate: 0.01 };
//! let mut optimizer = Sgd::new(config).unwrap();
//!
//! let mut params = vec![1.0, 2.0, 3.0];
//! let gradients = vec![0.1, 0.2, 0.3];
//!
//! optimizer.apply_gradients(&mut params, &gradients);
//! assert!(params[0] < 1.0);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod adam;
mod rmsprop;
mod sgd;

pub use adam::Adam;
pub use rmsprop::Rmsprop;
pub use sgd::Sgd;

/// Errors that can occur when working with optimizers.
#[derive(Debug, Error)]
pub enum OptimizerError {
    /// Configuration type does not match the optimizer type.
    #[error("Config mismatch: expected {expected}, got {got}")]
    ConfigMismatch {
        /// The optimizer type the constructor expected.
        expected: String,
        /// The configuration variant that was provided.
        got: String,
    },

    /// The optimizer name is not one of the supported tokens.
    #[error("Unknown optimizer: {0}")]
    UnknownOptimizer(String),
}

/// Configuration for different optimizer types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OptimizerConfig {
    /// Stochastic Gradient Descent configuration.
    Sgd {
        /// Learning rate for gradient updates.
        learning_rate: f32,
    },

    /// Adam configuration.
    Adam {
        /// Learning rate for gradient updates.
        learning_rate: f32,
        /// Exponential decay rate for first moment estimates.
        beta1: f32,
        /// Exponential decay rate for second moment estimates.
        beta2: f32,
        /// Small constant for numerical stability.
        epsilon: f32,
    },

    /// RMSprop configuration.
    Rmsprop {
        /// Learning rate for gradient updates.
        learning_rate: f32,
        /// Decay rate for the moving average of squared gradients.
        decay: f32,
        /// Small constant for numerical stability.
        epsilon: f32,
    },
}

impl OptimizerConfig {
    /// Returns the name of the optimizer type.
    pub fn name(&self) -> &'static str {
        match self {
            OptimizerConfig::Sgd { .. } => "Sgd",
            OptimizerConfig::Adam { .. } => "Adam",
            OptimizerConfig::Rmsprop { .. } => "Rmsprop",
        }
    }

    /// Returns the learning rate for the optimizer.
    pub fn learning_rate(&self) -> f32 {
        match self {
            OptimizerConfig::Sgd { learning_rate } => *learning_rate,
            OptimizerConfig::Adam { learning_rate, .. } => *learning_rate,
            OptimizerConfig::Rmsprop { learning_rate, .. } => *learning_rate,
        }
    }

    /// Resolves an optimizer-name token to a configuration with standard
    /// defaults, at the given learning rate.
    ///
    /// Names are matched case-insensitively against the supported set
    /// `{"sgd", "adam", "rmsprop"}`.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizerError::UnknownOptimizer`] for any other name.
    ///
    /// # Example
    ///
    /// ```
    /// use stockcast_optimizer::OptimizerConfig;
    ///
    /// let config = OptimizerConfig::for_name("adam", 0.001).unwrap();
    /// assert_eq!(config.name(), "Adam");
    /// assert!(OptimizerConfig::for_name("adamax", 0.001).is_err());
    /// ```
    pub fn for_name(name: &str, learning_rate: f32) -> Result<Self, OptimizerError> {
        match name.to_lowercase().as_str() {
            "sgd" => Ok(OptimizerConfig::Sgd { learning_rate }),
            "adam" => Ok(OptimizerConfig::Adam {
                learning_rate,
                beta1: 0.9,
                beta2: 0.999,
                epsilon: 1e-8,
            }),
            "rmsprop" => Ok(OptimizerConfig::Rmsprop {
                learning_rate,
                decay: 0.9,
                epsilon: 1e-8,
            }),
            _ => Err(OptimizerError::UnknownOptimizer(name.to_string())),
        }
    }
}

/// Trait for parameter optimizers.
///
/// Optimizers are responsible for updating parameter vectors based on
/// computed gradients. State (moment estimates, accumulators) grows lazily
/// to the parameter length on first use.
pub trait Optimizer: Sized {
    /// Creates a new optimizer from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizerError::ConfigMismatch`] if the configuration type
    /// does not match the optimizer type.
    fn new(config: OptimizerConfig) -> Result<Self, OptimizerError>;

    /// Applies gradients to update the parameter vector in place.
    ///
    /// # Panics
    ///
    /// May panic if `params` and `gradients` have different lengths.
    fn apply_gradients(&mut self, params: &mut [f32], gradients: &[f32]);

    /// Returns a reference to the optimizer's configuration.
    fn config(&self) -> &OptimizerConfig;
}

/// Dynamic dispatch version of the Optimizer trait.
///
/// This trait enables using optimizers as trait objects when the concrete
/// type is chosen at runtime from a name token.
pub trait OptimizerDyn: Send {
    /// Applies gradients to update the parameter vector in place.
    fn apply_gradients(&mut self, params: &mut [f32], gradients: &[f32]);

    /// Returns a reference to the optimizer's configuration.
    fn config(&self) -> &OptimizerConfig;
}

impl<T: Optimizer + Send> OptimizerDyn for T {
    fn apply_gradients(&mut self, params: &mut [f32], gradients: &[f32]) {
        Optimizer::apply_gradients(self, params, gradients)
    }

    fn config(&self) -> &OptimizerConfig {
        Optimizer::config(self)
    }
}

/// Creates an optimizer from the given configuration.
///
/// # Example
///
/// ```
/// use stockcast_optimizer::{create_optimizer, OptimizerConfig};
///
/// let config = OptimizerConfig::for_name("adam", 0.001).unwrap();
/// let mut optimizer = create_optimizer(config);
/// let mut params = vec![1.0];
/// optimizer.apply_gradients(&mut params, &[0.5]);
/// ```
pub fn create_optimizer(config: OptimizerConfig) -> Box<dyn OptimizerDyn> {
    match &config {
        OptimizerConfig::Sgd { .. } => Box::new(Sgd::new(config).unwrap()),
        OptimizerConfig::Adam { .. } => Box::new(Adam::new(config).unwrap()),
        OptimizerConfig::Rmsprop { .. } => Box::new(Rmsprop::new(config).unwrap()),
    }
}
