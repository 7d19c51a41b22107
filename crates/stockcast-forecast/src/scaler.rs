//! Min-max scaling for price series.
//!
//! The scaler maps a raw value series into `[0, 1]` for training stability
//! and maps network outputs back to original units for reporting. Both
//! transforms preserve the tensor shape, so callers can invert row-shaped
//! targets and column-shaped forecasts alike.

use serde::{Deserialize, Serialize};
use stockcast_layers::Tensor;

use crate::error::{ForecastError, ForecastResult};

/// A fitted min-max transform over a single value series.
///
/// # Example
///
/// ```
/// use stockcast_forecast::scaler::MinMaxScaler;
/// use stockcast_layers::Tensor;
///
/// let mut scaler = MinMaxScaler::new();
/// scaler.fit(&[10.0, 20.0, 30.0]);
///
/// let scaled = scaler.transform(&Tensor::from_data(&[3, 1], vec![10.0, 20.0, 30.0])).unwrap();
/// assert_eq!(scaled.data(), &[0.0, 0.5, 1.0]);
///
/// let restored = scaler.inverse_transform(&scaled).unwrap();
/// assert_eq!(restored.data(), &[10.0, 20.0, 30.0]);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MinMaxScaler {
    /// Minimum of the fitted series
    min: Option<f32>,
    /// Maximum of the fitted series
    max: Option<f32>,
}

impl MinMaxScaler {
    /// Creates an unfitted scaler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fits the scaler to a value series.
    ///
    /// An empty series leaves the scaler unfitted. A constant series is
    /// accepted; every value then maps to the range minimum.
    pub fn fit(&mut self, values: &[f32]) {
        if values.is_empty() {
            return;
        }
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &v in values {
            min = min.min(v);
            max = max.max(v);
        }
        self.min = Some(min);
        self.max = Some(max);
    }

    /// Fits the scaler and transforms the series in one step.
    pub fn fit_transform(&mut self, values: &[f32]) -> ForecastResult<Vec<f32>> {
        self.fit(values);
        let tensor = Tensor::from_data(&[values.len()], values.to_vec());
        Ok(self.transform(&tensor)?.data().to_vec())
    }

    /// Returns whether the scaler has been fitted.
    pub fn is_fitted(&self) -> bool {
        self.min.is_some()
    }

    fn bounds(&self) -> ForecastResult<(f32, f32)> {
        match (self.min, self.max) {
            (Some(min), Some(max)) => Ok((min, max)),
            _ => Err(ForecastError::ScalerNotFitted),
        }
    }

    /// Maps raw values into `[0, 1]`, preserving the tensor shape.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::ScalerNotFitted`] if the scaler has not
    /// been fitted.
    pub fn transform(&self, input: &Tensor) -> ForecastResult<Tensor> {
        let (min, max) = self.bounds()?;
        let span = max - min;
        if span == 0.0 {
            return Ok(input.map(|_| 0.0));
        }
        Ok(input.map(|x| (x - min) / span))
    }

    /// Maps scaled values back to original units, preserving the tensor
    /// shape.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::ScalerNotFitted`] if the scaler has not
    /// been fitted.
    pub fn inverse_transform(&self, input: &Tensor) -> ForecastResult<Tensor> {
        let (min, max) = self.bounds()?;
        let span = max - min;
        Ok(input.map(|x| x * span + min))
    }
}
