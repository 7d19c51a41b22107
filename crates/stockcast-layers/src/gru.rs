//! GRU cell implementation.

use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::initializer::Initializer;
use crate::tensor::Tensor;

/// Gated Recurrent Unit cell.
///
/// The forward step computes:
/// - `r_t = sigmoid(x_t W_r + h_{t-1} U_r + b_r)` (reset gate)
/// - `z_t = sigmoid(x_t W_z + h_{t-1} U_z + b_z)` (update gate)
/// - `n_t = act(x_t W_n + (r_t * h_{t-1}) U_n + b_n)` (candidate)
/// - `h_t = z_t * h_{t-1} + (1 - z_t) * n_t`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GruCell {
    input_size: usize,
    units: usize,

    // Reset gate
    w_r: Tensor,
    u_r: Tensor,
    b_r: Tensor,
    // Update gate
    w_z: Tensor,
    u_z: Tensor,
    b_z: Tensor,
    // Candidate
    w_n: Tensor,
    u_n: Tensor,
    b_n: Tensor,
}

impl GruCell {
    /// Creates a new GRU cell with Glorot-uniform weights and zero biases.
    pub fn new(input_size: usize, units: usize, seed: u64) -> Self {
        let w = |s: u64| Initializer::GlorotUniform.initialize(&[input_size, units], seed ^ s);
        let u = |s: u64| Initializer::GlorotUniform.initialize(&[units, units], seed ^ s);

        Self {
            input_size,
            units,
            w_r: w(0x51),
            u_r: u(0x52),
            b_r: Tensor::zeros(&[units]),
            w_z: w(0x61),
            u_z: u(0x62),
            b_z: Tensor::zeros(&[units]),
            w_n: w(0x71),
            u_n: u(0x72),
            b_n: Tensor::zeros(&[units]),
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

    /// Advances the cell one time step. All tensors are batch-major.
    pub fn forward_step(&self, x: &Tensor, h_prev: &Tensor, activation: Activation) -> Tensor {
        let r_gate = Activation::Sigmoid.apply(&x.matmul(&self.w_r).add(&h_prev.matmul(&self.u_r)).add(&self.b_r));
        let z_gate = Activation::Sigmoid.apply(&x.matmul(&self.w_z).add(&h_prev.matmul(&self.u_z)).add(&self.b_z));

        let reset_hidden = r_gate.mul(h_prev);
        let n = activation.apply(&x.matmul(&self.w_n).add(&reset_hidden.matmul(&self.u_n)).add(&self.b_n));

        // h_t = z * h_prev + (1 - z) * n
        let one_minus_z = z_gate.map(|z| 1.0 - z);
        z_gate.mul(h_prev).add(&one_minus_z.mul(&n))
    }

    /// Returns references to the cell's parameters.
    pub fn parameters(&self) -> Vec<&Tensor> {
        vec![
            &self.w_r, &self.u_r, &self.b_r, &self.w_z, &self.u_z, &self.b_z, &self.w_n,
            &self.u_n, &self.b_n,
        ]
    }

    /// Returns mutable references to the cell's parameters.
    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![
            &mut self.w_r,
            &mut self.u_r,
            &mut self.b_r,
            &mut self.w_z,
            &mut self.u_z,
            &mut self.b_z,
            &mut self.w_n,
            &mut self.u_n,
            &mut self.b_n,
        ]
    }
}
