//! Dropout layer.

use serde::{Deserialize, Serialize};

use crate::error::LayerError;
use crate::layer::Layer;
use crate::tensor::Tensor;

/// Dropout layer with inverted scaling.
///
/// During training, each element is zeroed with probability `rate` and the
/// survivors are scaled by `1 / (1 - rate)` so the expected activation is
/// unchanged. During inference the layer is the identity.
///
/// The mask is derived deterministically from the layer seed and the input
/// contents, so runs are reproducible without an external RNG.
///
/// # Example
///
/// ```
/// use stockcast_layers::dropout::Dropout;
/// use stockcast_layers::layer::Layer;
/// use stockcast_layers::tensor::Tensor;
///
/// let mut dropout = Dropout::new(0.5).unwrap();
/// dropout.set_training(false);
/// let input = Tensor::ones(&[2, 4]);
/// let output = dropout.forward(&input).unwrap();
/// assert_eq!(output.data(), input.data()); // identity at inference
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dropout {
    /// Drop probability in [0, 1)
    rate: f32,
    /// Seed mixed into the per-call mask derivation
    seed: u64,
    /// Whether in training mode
    training: bool,
}

impl Dropout {
    /// Creates a new dropout layer.
    ///
    /// # Errors
    ///
    /// Returns an error if `rate` is outside `[0, 1)`.
    pub fn new(rate: f32) -> Result<Self, LayerError> {
        if !(0.0..1.0).contains(&rate) {
            return Err(LayerError::ConfigError {
                message: format!("Dropout rate must be in [0, 1), got {}", rate),
            });
        }
        Ok(Self {
            rate,
            seed: rate.to_bits() as u64 ^ 0x9e3779b97f4a7c15,
            training: true,
        })
    }

    /// Returns the drop probability.
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Derives a mask seed from the input so that distinct batches get
    /// distinct masks while identical calls stay reproducible.
    fn mask_seed(&self, input: &Tensor) -> u64 {
        let mut h = self.seed ^ (input.numel() as u64).wrapping_mul(0x100000001b3);
        let data = input.data();
        let stride = (data.len() / 8).max(1);
        for &x in data.iter().step_by(stride) {
            h ^= x.to_bits() as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        h
    }
}

impl Layer for Dropout {
    fn forward(&self, input: &Tensor) -> Result<Tensor, LayerError> {
        if !self.training || self.rate == 0.0 {
            return Ok(input.clone());
        }

        let keep_prob = 1.0 - self.rate;
        let mask = Tensor::rand(input.shape(), self.mask_seed(input))
            .map(|x| if x >= self.rate { 1.0 } else { 0.0 });
        Ok(input.mul(&mask).scale(1.0 / keep_prob))
    }

    fn parameters(&self) -> Vec<&Tensor> {
        vec![]
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![]
    }

    fn name(&self) -> &str {
        "Dropout"
    }

    fn is_training(&self) -> bool {
        self.training
    }

    fn set_training(&mut self, training: bool) {
        self.training = training;
    }
}
