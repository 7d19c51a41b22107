//! Error types for the stockcast-forecast crate.
//!
//! Every failure mode of the factory, trainer, and forecaster is a typed
//! variant here. Failures from the layer substrate and optimizers propagate
//! unchanged; nothing is retried.

use stockcast_layers::LayerError;
use stockcast_optimizer::OptimizerError;
use thiserror::Error;

/// Error type for model building, training, and forecasting.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Invalid configuration: bad iteration count, empty or mismatched
    /// arrays, out-of-range dropout, degenerate input shape.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
    },

    /// The activation name is not in the fixed allow-list and no fallback
    /// activation was configured.
    #[error("Unknown activation function: {name}")]
    UnknownActivation {
        /// The name that failed to resolve
        name: String,
    },

    /// The layer-type token is not one of the supported set.
    #[error("Unknown layer kind: {name}")]
    UnknownLayerKind {
        /// The token that failed to resolve
        name: String,
    },

    /// The optimizer name is not one of the supported set.
    #[error("Unknown optimizer: {name}")]
    UnknownOptimizer {
        /// The name that failed to resolve
        name: String,
    },

    /// The loss-function name is not one of the supported set.
    #[error("Unknown loss function: {name}")]
    UnknownLoss {
        /// The name that failed to resolve
        name: String,
    },

    /// The scaler was used before being fitted.
    #[error("Scaler has not been fitted")]
    ScalerNotFitted,

    /// A layer operation failed; surfaced unchanged as a terminal failure.
    #[error(transparent)]
    Layer(#[from] LayerError),

    /// An optimizer operation failed; surfaced unchanged.
    #[error(transparent)]
    Optimizer(#[from] OptimizerError),
}

/// Result type alias for forecast operations.
pub type ForecastResult<T> = Result<T, ForecastError>;
