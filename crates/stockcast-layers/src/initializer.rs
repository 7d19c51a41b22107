//! Weight initialization utilities.

use serde::{Deserialize, Serialize};

use crate::tensor::Tensor;

/// Weight initializers for layer parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum Initializer {
    /// Glorot/Xavier uniform initialization.
    #[default]
    GlorotUniform,
    /// All zeros.
    Zeros,
    /// All ones.
    Ones,
    /// Constant value.
    Constant(f32),
}

impl Initializer {
    /// Creates a tensor of the given shape.
    ///
    /// The seed only affects random initializers; deterministic variants
    /// ignore it. Layers pass distinct seeds per parameter so stacked layers
    /// do not share initial weights.
    pub fn initialize(&self, shape: &[usize], seed: u64) -> Tensor {
        match self {
            Initializer::Zeros => Tensor::zeros(shape),
            Initializer::Ones => Tensor::ones(shape),
            Initializer::Constant(value) => {
                Tensor::from_data(shape, vec![*value; shape.iter().product()])
            }
            Initializer::GlorotUniform => {
                let (fan_in, fan_out) = fan_in_out(shape);
                let limit = (6.0 / (fan_in + fan_out) as f32).sqrt();
                Tensor::rand(shape, seed).map(|x| x * 2.0 * limit - limit)
            }
        }
    }
}

/// Fan-in / fan-out for a parameter shape. 1-D shapes are treated as a
/// single fan on both sides.
fn fan_in_out(shape: &[usize]) -> (usize, usize) {
    match shape {
        [n] => (*n, *n),
        [fan_in, fan_out] => (*fan_in, *fan_out),
        _ => {
            let receptive: usize = shape[..shape.len() - 2].iter().product();
            (
                shape[shape.len() - 2] * receptive,
                shape[shape.len() - 1] * receptive,
            )
        }
    }
}
