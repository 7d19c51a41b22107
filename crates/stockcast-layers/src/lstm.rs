//! LSTM cell implementation.
//!
//! A single-step Long Short-Term Memory transition. The [`LstmCell`] is
//! driven over a sequence by the recurrent layer wrapper; it only knows how
//! to advance one time step for a whole batch.

use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::initializer::Initializer;
use crate::tensor::Tensor;

/// LSTM cell.
///
/// The forward step computes:
/// - `i_t = sigmoid(x_t W_i + h_{t-1} U_i + b_i)` (input gate)
/// - `f_t = sigmoid(x_t W_f + h_{t-1} U_f + b_f)` (forget gate)
/// - `g_t = act(x_t W_g + h_{t-1} U_g + b_g)` (cell candidate)
/// - `o_t = sigmoid(x_t W_o + h_{t-1} U_o + b_o)` (output gate)
/// - `c_t = f_t * c_{t-1} + i_t * g_t`
/// - `h_t = o_t * act(c_t)`
///
/// The candidate/output activation `act` is configurable; the gate
/// activations stay sigmoid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LstmCell {
    /// Input feature dimension
    input_size: usize,
    /// Hidden state dimension
    units: usize,

    // Input gate
    w_i: Tensor,
    u_i: Tensor,
    b_i: Tensor,
    // Forget gate
    w_f: Tensor,
    u_f: Tensor,
    b_f: Tensor,
    // Cell candidate
    w_g: Tensor,
    u_g: Tensor,
    b_g: Tensor,
    // Output gate
    w_o: Tensor,
    u_o: Tensor,
    b_o: Tensor,
}

impl LstmCell {
    /// Creates a new LSTM cell with Glorot-uniform weights.
    ///
    /// The forget-gate bias is initialized to ones so early training does
    /// not erase the cell state.
    pub fn new(input_size: usize, units: usize, seed: u64) -> Self {
        let w = |s: u64| Initializer::GlorotUniform.initialize(&[input_size, units], seed ^ s);
        let u = |s: u64| Initializer::GlorotUniform.initialize(&[units, units], seed ^ s);

        Self {
            input_size,
            units,
            w_i: w(0x11),
            u_i: u(0x12),
            b_i: Tensor::zeros(&[units]),
            w_f: w(0x21),
            u_f: u(0x22),
            b_f: Tensor::ones(&[units]),
            w_g: w(0x31),
            u_g: u(0x32),
            b_g: Tensor::zeros(&[units]),
            w_o: w(0x41),
            u_o: u(0x42),
            b_o: Tensor::zeros(&[units]),
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

    /// Zero-initialized hidden and cell state for a batch.
    pub fn init_state(&self, batch_size: usize) -> (Tensor, Tensor) {
        (
            Tensor::zeros(&[batch_size, self.units]),
            Tensor::zeros(&[batch_size, self.units]),
        )
    }

    /// Advances the cell one time step.
    ///
    /// # Arguments
    ///
    /// * `x` - Input for this step, shape `[batch, input_size]`
    /// * `h_prev` - Previous hidden state, shape `[batch, units]`
    /// * `c_prev` - Previous cell state, shape `[batch, units]`
    /// * `activation` - Candidate/output activation
    ///
    /// # Returns
    ///
    /// `(h_next, c_next)`, both `[batch, units]`.
    pub fn forward_step(
        &self,
        x: &Tensor,
        h_prev: &Tensor,
        c_prev: &Tensor,
        activation: Activation,
    ) -> (Tensor, Tensor) {
        let i_gate = Activation::Sigmoid.apply(&x.matmul(&self.w_i).add(&h_prev.matmul(&self.u_i)).add(&self.b_i));
        let f_gate = Activation::Sigmoid.apply(&x.matmul(&self.w_f).add(&h_prev.matmul(&self.u_f)).add(&self.b_f));
        let g = activation.apply(&x.matmul(&self.w_g).add(&h_prev.matmul(&self.u_g)).add(&self.b_g));
        let o_gate = Activation::Sigmoid.apply(&x.matmul(&self.w_o).add(&h_prev.matmul(&self.u_o)).add(&self.b_o));

        let c_next = f_gate.mul(c_prev).add(&i_gate.mul(&g));
        let h_next = o_gate.mul(&activation.apply(&c_next));

        (h_next, c_next)
    }

    /// Returns references to the cell's parameters.
    pub fn parameters(&self) -> Vec<&Tensor> {
        vec![
            &self.w_i, &self.u_i, &self.b_i, &self.w_f, &self.u_f, &self.b_f, &self.w_g,
            &self.u_g, &self.b_g, &self.w_o, &self.u_o, &self.b_o,
        ]
    }

    /// Returns mutable references to the cell's parameters.
    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![
            &mut self.w_i,
            &mut self.u_i,
            &mut self.b_i,
            &mut self.w_f,
            &mut self.u_f,
            &mut self.b_f,
            &mut self.w_g,
            &mut self.u_g,
            &mut self.b_g,
            &mut self.w_o,
            &mut self.u_o,
            &mut self.b_o,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lstm_cell_step_shapes() {
        let cell = LstmCell::new(3, 8, 42);
        let x = Tensor::zeros(&[2, 3]);
        let (h, c) = cell.init_state(2);

        let (h_next, c_next) = cell.forward_step(&x, &h, &c, Activation::Tanh);
        assert_eq!(h_next.shape(), &[2, 8]);
        assert_eq!(c_next.shape(), &[2, 8]);
    }

    #[test]
    fn test_forget_bias_is_ones() {
        let cell = LstmCell::new(3, 4, 42);
        assert!(cell.b_f.data().iter().all(|&x| x == 1.0));
        assert!(cell.b_i.data().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_parameter_count() {
        let mut cell = LstmCell::new(3, 4, 42);
        assert_eq!(cell.parameters().len(), 12);
        assert_eq!(cell.parameters_mut().len(), 12);
    }

    #[test]
    fn test_distinct_seeds_give_distinct_weights() {
        let a = LstmCell::new(3, 4, 1);
        let b = LstmCell::new(3, 4, 2);
        assert_ne!(a.w_i.data(), b.w_i.data());
    }
}
