//! Simple (Elman) RNN cell.

use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::initializer::Initializer;
use crate::tensor::Tensor;

/// Elman RNN cell: `h_t = act(x_t W + h_{t-1} U + b)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleRnnCell {
    input_size: usize,
    units: usize,
    w: Tensor,
    u: Tensor,
    b: Tensor,
}

impl SimpleRnnCell {
    /// Creates a new cell with Glorot-uniform weights and zero bias.
    pub fn new(input_size: usize, units: usize, seed: u64) -> Self {
        Self {
            input_size,
            units,
            w: Initializer::GlorotUniform.initialize(&[input_size, units], seed ^ 0x81),
            u: Initializer::GlorotUniform.initialize(&[units, units], seed ^ 0x82),
            b: Tensor::zeros(&[units]),
        }
    }

    /// Returns the input feature dimension.
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Returns the hidden state dimension.
    pub fn units(&self) -> usize {
        self.units
    }

    /// Zero-initialized hidden state for a batch.
    pub fn init_state(&self, batch_size: usize) -> Tensor {
        Tensor::zeros(&[batch_size, self.units])
    }

    /// Advances the cell one time step.
    pub fn forward_step(&self, x: &Tensor, h_prev: &Tensor, activation: Activation) -> Tensor {
        activation.apply(&x.matmul(&self.w).add(&h_prev.matmul(&self.u)).add(&self.b))
    }

    /// Returns references to the cell's parameters.
    pub fn parameters(&self) -> Vec<&Tensor> {
        vec![&self.w, &self.u, &self.b]
    }

    /// Returns mutable references to the cell's parameters.
    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.w, &mut self.u, &mut self.b]
    }
}
