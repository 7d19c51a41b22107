//! Loss functions.

use serde::{Deserialize, Serialize};
use stockcast_layers::Tensor;

use crate::error::ForecastError;

/// Loss functions accepted by the trainer, resolved from the
/// caller-supplied loss name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Loss {
    /// Mean squared error
    MeanSquaredError,
    /// Mean absolute error
    MeanAbsoluteError,
}

impl Loss {
    /// Resolves a loss-function name. Accepts the short tokens and the
    /// long names, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::UnknownLoss`] for unsupported names.
    pub fn for_name(name: &str) -> Result<Self, ForecastError> {
        match name.to_lowercase().as_str() {
            "mse" | "mean_squared_error" => Ok(Self::MeanSquaredError),
            "mae" | "mean_absolute_error" => Ok(Self::MeanAbsoluteError),
            _ => Err(ForecastError::UnknownLoss {
                name: name.to_string(),
            }),
        }
    }

    /// Returns the canonical short name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MeanSquaredError => "mse",
            Self::MeanAbsoluteError => "mae",
        }
    }

    /// Computes the loss between predictions and targets.
    ///
    /// Both tensors must have the same number of elements; shape is not
    /// otherwise constrained. Returns 0.0 for empty tensors.
    pub fn compute(&self, predictions: &Tensor, targets: &Tensor) -> f32 {
        let n = predictions.numel().min(targets.numel());
        if n == 0 {
            return 0.0;
        }

        let mut total = 0.0;
        for i in 0..n {
            let diff = predictions.data()[i] - targets.data()[i];
            total += match self {
                Self::MeanSquaredError => diff * diff,
                Self::MeanAbsoluteError => diff.abs(),
            };
        }
        total / n as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_name() {
        assert_eq!(Loss::for_name("mse").unwrap(), Loss::MeanSquaredError);
        assert_eq!(
            Loss::for_name("mean_squared_error").unwrap(),
            Loss::MeanSquaredError
        );
        assert_eq!(Loss::for_name("MAE").unwrap(), Loss::MeanAbsoluteError);
        assert!(matches!(
            Loss::for_name("huber"),
            Err(ForecastError::UnknownLoss { .. })
        ));
    }

    #[test]
    fn test_mse() {
        let pred = Tensor::from_data(&[2, 1], vec![1.0, 3.0]);
        let target = Tensor::from_data(&[2, 1], vec![0.0, 1.0]);
        // (1 + 4) / 2
        assert!((Loss::MeanSquaredError.compute(&pred, &target) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_mae() {
        let pred = Tensor::from_data(&[2, 1], vec![1.0, 3.0]);
        let target = Tensor::from_data(&[2, 1], vec![0.0, 1.0]);
        // (1 + 2) / 2
        assert!((Loss::MeanAbsoluteError.compute(&pred, &target) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_perfect_prediction_is_zero() {
        let pred = Tensor::from_data(&[3], vec![1.0, 2.0, 3.0]);
        assert_eq!(Loss::MeanSquaredError.compute(&pred, &pred), 0.0);
        assert_eq!(Loss::MeanAbsoluteError.compute(&pred, &pred), 0.0);
    }
}
