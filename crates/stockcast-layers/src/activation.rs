//! Activation functions.
//!
//! This module provides the fixed set of activation functions the model
//! factory accepts, as a single enum resolved by name. Softmax normalizes
//! over the last axis; every other function is element-wise.

use serde::{Deserialize, Serialize};

use crate::tensor::Tensor;

/// Threshold above which softplus returns its argument directly.
const SOFTPLUS_THRESHOLD: f32 = 20.0;

/// Activation function types supported by the model stack.
///
/// # Example
///
/// ```
/// use stockcast_layers::activation::Activation;
/// use stockcast_layers::tensor::Tensor;
///
/// let act = Activation::from_name("relu").unwrap();
/// let input = Tensor::from_data(&[2, 2], vec![-1.0, 0.0, 1.0, 2.0]);
/// let output = act.apply(&input);
/// assert_eq!(output.data(), &[0.0, 0.0, 1.0, 2.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    /// Rectified Linear Unit: `max(0, x)`
    Relu,
    /// Sigmoid: `1 / (1 + exp(-x))`
    Sigmoid,
    /// Hyperbolic tangent
    Tanh,
    /// Softmax over the last axis
    Softmax,
    /// Exponential Linear Unit: `x` if `x > 0`, else `exp(x) - 1`
    Elu,
    /// Softsign: `x / (1 + |x|)`
    Softsign,
    /// Softplus: `ln(1 + exp(x))`
    Softplus,
    /// Exponential: `exp(x)`
    Exponential,
}

impl Default for Activation {
    fn default() -> Self {
        Self::Tanh
    }
}

impl Activation {
    /// Resolves an activation by its lowercase name.
    ///
    /// Returns `None` for names outside the fixed allow-list; the caller
    /// decides whether that is an error or falls back to a default.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "relu" => Some(Self::Relu),
            "sigmoid" => Some(Self::Sigmoid),
            "tanh" => Some(Self::Tanh),
            "softmax" => Some(Self::Softmax),
            "elu" => Some(Self::Elu),
            "softsign" => Some(Self::Softsign),
            "softplus" => Some(Self::Softplus),
            "exponential" => Some(Self::Exponential),
            _ => None,
        }
    }

    /// Returns the canonical name of the activation.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Relu => "relu",
            Self::Sigmoid => "sigmoid",
            Self::Tanh => "tanh",
            Self::Softmax => "softmax",
            Self::Elu => "elu",
            Self::Softsign => "softsign",
            Self::Softplus => "softplus",
            Self::Exponential => "exponential",
        }
    }

    /// Applies the activation to a tensor.
    ///
    /// Softmax normalizes over the last axis; all other variants apply
    /// element-wise.
    pub fn apply(&self, input: &Tensor) -> Tensor {
        match self {
            Self::Relu => input.map(|x| x.max(0.0)),
            Self::Sigmoid => input.map(sigmoid),
            Self::Tanh => input.map(|x| x.tanh()),
            Self::Softmax => softmax_last_axis(input),
            Self::Elu => input.map(|x| if x > 0.0 { x } else { x.exp() - 1.0 }),
            Self::Softsign => input.map(|x| x / (1.0 + x.abs())),
            Self::Softplus => input.map(|x| {
                if x > SOFTPLUS_THRESHOLD {
                    x // For numerical stability
                } else {
                    (1.0 + x.exp()).ln()
                }
            }),
            Self::Exponential => input.map(|x| x.exp()),
        }
    }
}

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Softmax over the last axis of a tensor, with the usual max-subtraction
/// for numerical stability.
fn softmax_last_axis(input: &Tensor) -> Tensor {
    let shape = input.shape();
    let dim = *shape.last().unwrap_or(&1);
    if dim == 0 {
        return input.clone();
    }
    let rows = input.numel() / dim;
    let mut result = vec![0.0; input.numel()];

    for i in 0..rows {
        let row = &input.data()[i * dim..(i + 1) * dim];

        let mut max_val = f32::NEG_INFINITY;
        for &x in row {
            max_val = max_val.max(x);
        }

        let mut sum = 0.0;
        for (j, &x) in row.iter().enumerate() {
            let exp_val = (x - max_val).exp();
            result[i * dim + j] = exp_val;
            sum += exp_val;
        }

        for j in 0..dim {
            result[i * dim + j] /= sum;
        }
    }

    Tensor::from_data(shape, result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_covers_allow_list() {
        for name in [
            "relu",
            "sigmoid",
            "tanh",
            "softmax",
            "elu",
            "softsign",
            "softplus",
            "exponential",
        ] {
            let act = Activation::from_name(name).unwrap();
            assert_eq!(act.name(), name);
        }
        assert!(Activation::from_name("bogus").is_none());
        assert!(Activation::from_name("ReLU").is_none()); // names are lowercase
    }

    #[test]
    fn test_relu() {
        let input = Tensor::from_data(&[2, 3], vec![-2.0, -1.0, 0.0, 1.0, 2.0, 3.0]);
        let output = Activation::Relu.apply(&input);
        assert_eq!(output.data(), &[0.0, 0.0, 0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_sigmoid_at_zero() {
        let output = Activation::Sigmoid.apply(&Tensor::zeros(&[2, 2]));
        for &val in output.data() {
            assert!((val - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_tanh_at_zero() {
        let output = Activation::Tanh.apply(&Tensor::zeros(&[2, 2]));
        for &val in output.data() {
            assert!(val.abs() < 1e-6);
        }
    }

    #[test]
    fn test_elu() {
        let input = Tensor::from_data(&[1, 3], vec![-2.0, 0.0, 1.5]);
        let output = Activation::Elu.apply(&input);
        assert!((output.data()[0] - ((-2.0_f32).exp() - 1.0)).abs() < 1e-6);
        assert!(output.data()[1].abs() < 1e-6);
        assert!((output.data()[2] - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_softsign() {
        let input = Tensor::from_data(&[1, 2], vec![-3.0, 1.0]);
        let output = Activation::Softsign.apply(&input);
        assert!((output.data()[0] - (-0.75)).abs() < 1e-6);
        assert!((output.data()[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_softplus() {
        let input = Tensor::from_data(&[1, 2], vec![0.0, 30.0]);
        let output = Activation::Softplus.apply(&input);
        // softplus(0) = ln(2)
        assert!((output.data()[0] - 0.693).abs() < 0.01);
        // Large inputs pass through
        assert!((output.data()[1] - 30.0).abs() < 0.01);
    }

    #[test]
    fn test_exponential() {
        let input = Tensor::from_data(&[1, 2], vec![0.0, 1.0]);
        let output = Activation::Exponential.apply(&input);
        assert!((output.data()[0] - 1.0).abs() < 1e-6);
        assert!((output.data()[1] - std::f32::consts::E).abs() < 1e-5);
    }

    #[test]
    fn test_softmax_rows_sum_to_one() {
        let input = Tensor::from_data(&[2, 3], vec![1.0, 2.0, 3.0, -1.0, 0.0, 1.0]);
        let output = Activation::Softmax.apply(&input);
        for i in 0..2 {
            let sum: f32 = output.data()[i * 3..(i + 1) * 3].iter().sum();
            assert!((sum - 1.0).abs() < 1e-6);
        }
        // Largest input gets the largest probability
        assert!(output.data()[2] > output.data()[1]);
    }

    #[test]
    fn test_softmax_numerical_stability() {
        let input = Tensor::from_data(&[1, 3], vec![1000.0, 1001.0, 1002.0]);
        let output = Activation::Softmax.apply(&input);
        let sum: f32 = output.data().iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        for &val in output.data() {
            assert!((0.0..=1.0).contains(&val));
        }
    }
}
