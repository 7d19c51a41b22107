//! Training metrics collection.

use serde::{Deserialize, Serialize};

/// Metrics collected during a training epoch or an evaluation pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metrics {
    /// The mean loss value.
    pub loss: f64,
    /// Exact-match accuracy. Carried for parity with the training setups
    /// this replaces; of limited relevance to regression output.
    pub accuracy: Option<f64>,
    /// The epoch at which these metrics were recorded (0 for evaluation).
    pub epoch: usize,
}

impl Metrics {
    /// Creates a new `Metrics` instance with the given loss and epoch.
    ///
    /// # Examples
    ///
    /// ```
    /// use stockcast_forecast::metrics::Metrics;
    ///
    /// let metrics = Metrics::new(0.5, 3);
    /// assert_eq!(metrics.loss, 0.5);
    /// assert_eq!(metrics.epoch, 3);
    /// ```
    pub fn new(loss: f64, epoch: usize) -> Self {
        Self {
            loss,
            accuracy: None,
            epoch,
        }
    }

    /// Sets the accuracy metric.
    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }
}

/// Fraction of predictions that match their target exactly (to f32
/// precision). Zero for empty slices.
pub fn exact_match_accuracy(predictions: &[f32], targets: &[f32]) -> f64 {
    let n = predictions.len().min(targets.len());
    if n == 0 {
        return 0.0;
    }
    let matches = predictions
        .iter()
        .zip(targets.iter())
        .filter(|(p, t)| (**p - **t).abs() < f32::EPSILON)
        .count();
    matches as f64 / n as f64
}
