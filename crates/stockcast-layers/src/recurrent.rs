//! Recurrent layer wrapper.
//!
//! This module provides the [`Recurrent`] layer, which drives a recurrent
//! cell over a `[batch, time, features]` sequence. With `return_sequences`
//! the layer emits the hidden state at every time step (required to feed a
//! stacked recurrent layer); otherwise it emits only the final step.
//!
//! The bidirectional variant runs an LSTM pair over opposite time directions
//! and concatenates their hidden states, doubling the output width.

use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::error::LayerError;
use crate::gru::GruCell;
use crate::layer::Layer;
use crate::lstm::LstmCell;
use crate::simple_rnn::SimpleRnnCell;
use crate::tensor::Tensor;

/// The cell driven by a [`Recurrent`] layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RecurrentCell {
    /// Long Short-Term Memory cell
    Lstm(LstmCell),
    /// Gated Recurrent Unit cell
    Gru(GruCell),
    /// Elman RNN cell
    SimpleRnn(SimpleRnnCell),
    /// Forward/backward LSTM pair with concat merge
    BidirectionalLstm {
        /// Cell consuming the sequence in time order
        forward: LstmCell,
        /// Cell consuming the sequence in reverse
        backward: LstmCell,
    },
}

/// A recurrent layer over a `[batch, time, features]` sequence.
///
/// # Example
///
/// ```
/// use stockcast_layers::activation::Activation;
/// use stockcast_layers::layer::Layer;
/// use stockcast_layers::recurrent::Recurrent;
/// use stockcast_layers::tensor::Tensor;
///
/// let layer = Recurrent::lstm(1, 8, Activation::Tanh, false, 42);
/// let input = Tensor::zeros(&[2, 10, 1]); // batch=2, 10 steps, 1 feature
/// let output = layer.forward(&input).unwrap();
/// assert_eq!(output.shape(), &[2, 8]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recurrent {
    cell: RecurrentCell,
    input_size: usize,
    units: usize,
    activation: Activation,
    return_sequences: bool,
}

impl Recurrent {
    /// Creates an LSTM layer.
    pub fn lstm(
        input_size: usize,
        units: usize,
        activation: Activation,
        return_sequences: bool,
        seed: u64,
    ) -> Self {
        Self {
            cell: RecurrentCell::Lstm(LstmCell::new(input_size, units, seed)),
            input_size,
            units,
            activation,
            return_sequences,
        }
    }

    /// Creates a GRU layer.
    pub fn gru(
        input_size: usize,
        units: usize,
        activation: Activation,
        return_sequences: bool,
        seed: u64,
    ) -> Self {
        Self {
            cell: RecurrentCell::Gru(GruCell::new(input_size, units, seed)),
            input_size,
            units,
            activation,
            return_sequences,
        }
    }

    /// Creates a simple (Elman) RNN layer.
    pub fn simple_rnn(
        input_size: usize,
        units: usize,
        activation: Activation,
        return_sequences: bool,
        seed: u64,
    ) -> Self {
        Self {
            cell: RecurrentCell::SimpleRnn(SimpleRnnCell::new(input_size, units, seed)),
            input_size,
            units,
            activation,
            return_sequences,
        }
    }

    /// Creates a bidirectional LSTM layer with concat merge.
    pub fn bidirectional_lstm(
        input_size: usize,
        units: usize,
        activation: Activation,
        return_sequences: bool,
        seed: u64,
    ) -> Self {
        Self {
            cell: RecurrentCell::BidirectionalLstm {
                forward: LstmCell::new(input_size, units, seed),
                backward: LstmCell::new(input_size, units, seed ^ 0xb1d1),
            },
            input_size,
            units,
            activation,
            return_sequences,
        }
    }

    /// Returns the per-direction hidden width.
    pub fn units(&self) -> usize {
        self.units
    }

    /// Returns the width of the layer's output features: `units`, doubled
    /// for the bidirectional variant.
    pub fn output_size(&self) -> usize {
        match self.cell {
            RecurrentCell::BidirectionalLstm { .. } => self.units * 2,
            _ => self.units,
        }
    }

    /// Whether the layer emits the full sequence of hidden states.
    pub fn return_sequences(&self) -> bool {
        self.return_sequences
    }

    /// Returns the layer's activation.
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Runs one direction of a cell over the sequence, returning the hidden
    /// state at every time step.
    fn run_direction(&self, input: &Tensor, cell_states: CellRun<'_>, reverse: bool) -> Vec<Tensor> {
        let time = input.shape()[1];
        let batch = input.shape()[0];
        let mut outputs: Vec<Tensor> = Vec::with_capacity(time);

        let order: Box<dyn Iterator<Item = usize>> = if reverse {
            Box::new((0..time).rev())
        } else {
            Box::new(0..time)
        };

        match cell_states {
            CellRun::Lstm(cell) => {
                let (mut h, mut c) = cell.init_state(batch);
                for t in order {
                    let x_t = input.step(t);
                    let (h_next, c_next) = cell.forward_step(&x_t, &h, &c, self.activation);
                    h = h_next;
                    c = c_next;
                    outputs.push(h.clone());
                }
            }
            CellRun::Gru(cell) => {
                let mut h = cell.init_state(batch);
                for t in order {
                    let x_t = input.step(t);
                    h = cell.forward_step(&x_t, &h, self.activation);
                    outputs.push(h.clone());
                }
            }
            CellRun::SimpleRnn(cell) => {
                let mut h = cell.init_state(batch);
                for t in order {
                    let x_t = input.step(t);
                    h = cell.forward_step(&x_t, &h, self.activation);
                    outputs.push(h.clone());
                }
            }
        }

        if reverse {
            // Re-align so index t holds the state produced at original step t
            outputs.reverse();
        }
        outputs
    }

    /// Stacks per-step `[batch, width]` tensors into `[batch, time, width]`.
    fn stack_steps(steps: &[Tensor]) -> Tensor {
        let time = steps.len();
        let batch = steps[0].shape()[0];
        let width = steps[0].shape()[1];

        let mut data = vec![0.0; batch * time * width];
        for (t, step) in steps.iter().enumerate() {
            for b in 0..batch {
                let dst = b * time * width + t * width;
                let src = b * width;
                data[dst..dst + width].copy_from_slice(&step.data()[src..src + width]);
            }
        }
        Tensor::from_data(&[batch, time, width], data)
    }
}

/// Borrowed view of the concrete cell for a single directional run.
enum CellRun<'a> {
    Lstm(&'a LstmCell),
    Gru(&'a GruCell),
    SimpleRnn(&'a SimpleRnnCell),
}

impl Layer for Recurrent {
    fn forward(&self, input: &Tensor) -> Result<Tensor, LayerError> {
        if input.ndim() != 3 {
            return Err(LayerError::ShapeMismatch {
                expected: vec![0, 0, self.input_size],
                actual: input.shape().to_vec(),
            });
        }
        if input.shape()[2] != self.input_size {
            return Err(LayerError::InvalidInputDimension {
                expected: self.input_size,
                actual: input.shape()[2],
            });
        }
        if input.shape()[1] == 0 {
            return Err(LayerError::ForwardError {
                message: "Recurrent layer requires at least one time step".to_string(),
            });
        }

        if let RecurrentCell::BidirectionalLstm { forward, backward } = &self.cell {
            let fwd = self.run_direction(input, CellRun::Lstm(forward), false);
            let bwd = self.run_direction(input, CellRun::Lstm(backward), true);

            if self.return_sequences {
                let steps: Vec<Tensor> = fwd
                    .iter()
                    .zip(bwd.iter())
                    .map(|(f, b)| f.concat_features(b))
                    .collect();
                return Ok(Self::stack_steps(&steps));
            }
            // The backward cell finishes at original step 0: its final state
            // sits at aligned index 0 after the re-alignment in run_direction.
            return Ok(fwd[fwd.len() - 1].concat_features(&bwd[0]));
        }

        let steps = match &self.cell {
            RecurrentCell::Lstm(cell) => self.run_direction(input, CellRun::Lstm(cell), false),
            RecurrentCell::Gru(cell) => self.run_direction(input, CellRun::Gru(cell), false),
            RecurrentCell::SimpleRnn(cell) => {
                self.run_direction(input, CellRun::SimpleRnn(cell), false)
            }
            RecurrentCell::BidirectionalLstm { .. } => unreachable!(),
        };

        if self.return_sequences {
            Ok(Self::stack_steps(&steps))
        } else {
            Ok(steps[steps.len() - 1].clone())
        }
    }

    fn parameters(&self) -> Vec<&Tensor> {
        match &self.cell {
            RecurrentCell::Lstm(cell) => cell.parameters(),
            RecurrentCell::Gru(cell) => cell.parameters(),
            RecurrentCell::SimpleRnn(cell) => cell.parameters(),
            RecurrentCell::BidirectionalLstm { forward, backward } => {
                let mut params = forward.parameters();
                params.extend(backward.parameters());
                params
            }
        }
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        match &mut self.cell {
            RecurrentCell::Lstm(cell) => cell.parameters_mut(),
            RecurrentCell::Gru(cell) => cell.parameters_mut(),
            RecurrentCell::SimpleRnn(cell) => cell.parameters_mut(),
            RecurrentCell::BidirectionalLstm { forward, backward } => {
                let mut params = forward.parameters_mut();
                params.extend(backward.parameters_mut());
                params
            }
        }
    }

    fn name(&self) -> &str {
        match self.cell {
            RecurrentCell::Lstm(_) => "LSTM",
            RecurrentCell::Gru(_) => "GRU",
            RecurrentCell::SimpleRnn(_) => "SimpleRNN",
            RecurrentCell::BidirectionalLstm { .. } => "Bidirectional",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence(batch: usize, time: usize, features: usize) -> Tensor {
        let numel = batch * time * features;
        let data: Vec<f32> = (0..numel).map(|i| (i as f32 * 0.1).sin()).collect();
        Tensor::from_data(&[batch, time, features], data)
    }

    #[test]
    fn test_lstm_final_step_shape() {
        let layer = Recurrent::lstm(2, 8, Activation::Tanh, false, 42);
        let output = layer.forward(&sequence(3, 5, 2)).unwrap();
        assert_eq!(output.shape(), &[3, 8]);
    }

    #[test]
    fn test_lstm_sequence_shape() {
        let layer = Recurrent::lstm(2, 8, Activation::Tanh, true, 42);
        let output = layer.forward(&sequence(3, 5, 2)).unwrap();
        assert_eq!(output.shape(), &[3, 5, 8]);
    }

    #[test]
    fn test_gru_and_simple_rnn_shapes() {
        for layer in [
            Recurrent::gru(2, 6, Activation::Tanh, false, 1),
            Recurrent::simple_rnn(2, 6, Activation::Tanh, false, 1),
        ] {
            let output = layer.forward(&sequence(2, 4, 2)).unwrap();
            assert_eq!(output.shape(), &[2, 6]);
        }
    }

    #[test]
    fn test_bidirectional_doubles_width() {
        let layer = Recurrent::bidirectional_lstm(2, 8, Activation::Tanh, false, 42);
        assert_eq!(layer.output_size(), 16);

        let output = layer.forward(&sequence(3, 5, 2)).unwrap();
        assert_eq!(output.shape(), &[3, 16]);

        let seq_layer = Recurrent::bidirectional_lstm(2, 8, Activation::Tanh, true, 42);
        let output = seq_layer.forward(&sequence(3, 5, 2)).unwrap();
        assert_eq!(output.shape(), &[3, 5, 16]);
    }

    #[test]
    fn test_rejects_wrong_feature_width() {
        let layer = Recurrent::lstm(2, 8, Activation::Tanh, false, 42);
        let err = layer.forward(&sequence(3, 5, 4)).unwrap_err();
        assert!(matches!(
            err,
            LayerError::InvalidInputDimension { expected: 2, actual: 4 }
        ));
    }

    #[test]
    fn test_rejects_non_sequence_input() {
        let layer = Recurrent::lstm(2, 8, Activation::Tanh, false, 42);
        let err = layer.forward(&Tensor::zeros(&[3, 2])).unwrap_err();
        assert!(matches!(err, LayerError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_sequence_last_step_matches_final_state() {
        let seq_layer = Recurrent::lstm(1, 4, Activation::Tanh, true, 9);
        let fin_layer = Recurrent::lstm(1, 4, Activation::Tanh, false, 9);
        let input = sequence(2, 6, 1);

        let seq = seq_layer.forward(&input).unwrap();
        let fin = fin_layer.forward(&input).unwrap();

        let last = seq.step(5);
        assert_eq!(last.data(), fin.data());
    }

    #[test]
    fn test_parameters_aggregate() {
        let layer = Recurrent::bidirectional_lstm(2, 4, Activation::Tanh, false, 42);
        assert_eq!(layer.parameters().len(), 24); // two LSTM cells
    }
}
