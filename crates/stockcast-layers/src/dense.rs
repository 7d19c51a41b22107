//! Dense (fully connected) layer implementation.
//!
//! This module provides the [`Dense`] layer, which performs a linear
//! transformation `y = xW + b`, optionally followed by a fused output
//! activation.

use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::error::LayerError;
use crate::initializer::Initializer;
use crate::layer::Layer;
use crate::tensor::Tensor;

/// A dense (fully connected) neural network layer.
///
/// Performs the transformation `y = xW + b` where:
/// - `x` is the input tensor of shape `[batch_size, in_features]`
/// - `W` is the weight matrix of shape `[in_features, out_features]`
/// - `b` is the bias vector of shape `[out_features]`
///
/// An optional activation is applied to the output, matching layer stacks
/// where the output head carries its own activation.
///
/// # Example
///
/// ```
/// use stockcast_layers::dense::Dense;
/// use stockcast_layers::layer::Layer;
/// use stockcast_layers::tensor::Tensor;
///
/// let layer = Dense::new(16, 1);
/// let input = Tensor::zeros(&[4, 16]); // batch of 4
/// let output = layer.forward(&input).unwrap();
/// assert_eq!(output.shape(), &[4, 1]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dense {
    /// Weight matrix of shape [in_features, out_features]
    weights: Tensor,
    /// Bias vector of shape [out_features]
    bias: Tensor,
    /// Optional fused output activation
    activation: Option<Activation>,
    /// Input feature dimension
    in_features: usize,
    /// Output feature dimension
    out_features: usize,
}

impl Dense {
    /// Creates a new dense layer with Glorot-uniform weights and zero bias.
    pub fn new(in_features: usize, out_features: usize) -> Self {
        Self::with_activation(in_features, out_features, None)
    }

    /// Creates a new dense layer with an optional fused output activation.
    pub fn with_activation(
        in_features: usize,
        out_features: usize,
        activation: Option<Activation>,
    ) -> Self {
        let seed = (in_features as u64) << 32 | out_features as u64;
        let weights = Initializer::GlorotUniform.initialize(&[in_features, out_features], seed);
        let bias = Initializer::Zeros.initialize(&[out_features], seed ^ 1);

        Self {
            weights,
            bias,
            activation,
            in_features,
            out_features,
        }
    }

    /// Returns the input feature dimension.
    pub fn in_features(&self) -> usize {
        self.in_features
    }

    /// Returns the output feature dimension.
    pub fn out_features(&self) -> usize {
        self.out_features
    }

    /// Returns the fused output activation, if any.
    pub fn activation(&self) -> Option<Activation> {
        self.activation
    }
}

impl Layer for Dense {
    fn forward(&self, input: &Tensor) -> Result<Tensor, LayerError> {
        if input.ndim() != 2 {
            return Err(LayerError::ShapeMismatch {
                expected: vec![0, self.in_features],
                actual: input.shape().to_vec(),
            });
        }
        if input.shape()[1] != self.in_features {
            return Err(LayerError::InvalidInputDimension {
                expected: self.in_features,
                actual: input.shape()[1],
            });
        }

        let output = input.matmul(&self.weights).add(&self.bias);
        Ok(match self.activation {
            Some(act) => act.apply(&output),
            None => output,
        })
    }

    fn parameters(&self) -> Vec<&Tensor> {
        vec![&self.weights, &self.bias]
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.weights, &mut self.bias]
    }

    fn name(&self) -> &str {
        "Dense"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_forward_shape() {
        let layer = Dense::new(8, 3);
        let input = Tensor::zeros(&[5, 8]);
        let output = layer.forward(&input).unwrap();
        assert_eq!(output.shape(), &[5, 3]);
    }

    #[test]
    fn test_dense_rejects_bad_input() {
        let layer = Dense::new(8, 3);

        let wrong_dim = Tensor::zeros(&[5, 4]);
        assert!(matches!(
            layer.forward(&wrong_dim),
            Err(LayerError::InvalidInputDimension { expected: 8, actual: 4 })
        ));

        let wrong_rank = Tensor::zeros(&[5, 8, 1]);
        assert!(matches!(
            layer.forward(&wrong_rank),
            Err(LayerError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_dense_fused_activation() {
        let layer = Dense::with_activation(4, 2, Some(Activation::Relu));
        let input = Tensor::from_data(&[1, 4], vec![-10.0, -10.0, -10.0, -10.0]);
        let output = layer.forward(&input).unwrap();
        // ReLU clamps everything at or above zero
        assert!(output.data().iter().all(|&x| x >= 0.0));
    }

    #[test]
    fn test_dense_parameters() {
        let mut layer = Dense::new(8, 3);
        assert_eq!(layer.parameters().len(), 2);
        assert_eq!(layer.parameters()[0].shape(), &[8, 3]);
        assert_eq!(layer.parameters()[1].shape(), &[3]);
        assert_eq!(layer.parameters_mut().len(), 2);
    }
}
