//! RMSprop optimizer.
//!
//! RMSprop keeps a moving average of squared gradients and divides the
//! learning rate by its root, adapting the step size per parameter.

use crate::{Optimizer, OptimizerConfig, OptimizerError};
use serde::{Deserialize, Serialize};

/// RMSprop optimizer.
///
/// Updates parameters using the formula:
/// ```text
/// s = decay * s + (1 - decay) * gradient^2
/// param = param - learning_rate * gradient / (sqrt(s) + epsilon)
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rmsprop {
    /// Learning rate for gradient updates.
    learning_rate: f32,
    /// Decay rate for the moving average of squared gradients.
    decay: f32,
    /// Small constant for numerical stability.
    epsilon: f32,
    /// Moving average of squared gradients.
    s: Vec<f32>,
    /// Configuration used to create this optimizer.
    config: OptimizerConfig,
}

impl Rmsprop {
    /// Creates a new RMSprop optimizer with the given parameters.
    pub fn with_params(learning_rate: f32, decay: f32, epsilon: f32) -> Self {
        let config = OptimizerConfig::Rmsprop {
            learning_rate,
            decay,
            epsilon,
        };
        Self {
            learning_rate,
            decay,
            epsilon,
            s: Vec::new(),
            config,
        }
    }
}

impl Optimizer for Rmsprop {
    fn new(config: OptimizerConfig) -> Result<Self, OptimizerError> {
        match config {
            OptimizerConfig::Rmsprop {
                learning_rate,
                decay,
                epsilon,
            } => Ok(Self {
                learning_rate,
                decay,
                epsilon,
                s: Vec::new(),
                config,
            }),
            _ => Err(OptimizerError::ConfigMismatch {
                expected: "Rmsprop".to_string(),
                got: config.name().to_string(),
            }),
        }
    }

    fn apply_gradients(&mut self, params: &mut [f32], gradients: &[f32]) {
        if self.s.len() < params.len() {
            self.s.resize(params.len(), 0.0);
        }

        for i in 0..params.len().min(gradients.len()) {
            let g = gradients[i];
            self.s[i] = self.decay * self.s[i] + (1.0 - self.decay) * g * g;
            params[i] -= self.learning_rate * g / (self.s[i].sqrt() + self.epsilon);
        }
    }

    fn config(&self) -> &OptimizerConfig {
        &self.config
    }
}
