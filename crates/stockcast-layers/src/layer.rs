//! Layer trait definition for neural network layers.

use crate::error::LayerError;
use crate::tensor::Tensor;

/// A neural network layer.
///
/// This trait defines the interface shared by all layers in the stockcast
/// model stack. Each layer must be able to:
/// - Perform a forward pass to compute outputs from inputs
/// - Expose its learnable parameters for the optimizer
///
/// Training in this workspace is derivative-free: the trainer perturbs the
/// parameter tensors directly, so layers do not carry a backward pass.
///
/// # Example
///
/// ```
/// use stockcast_layers::dense::Dense;
/// use stockcast_layers::layer::Layer;
/// use stockcast_layers::tensor::Tensor;
///
/// let layer = Dense::new(8, 4);
/// let input = Tensor::zeros(&[2, 8]); // batch of 2
/// let output = layer.forward(&input).unwrap();
/// assert_eq!(output.shape(), &[2, 4]);
/// ```
pub trait Layer: Send + Sync {
    /// Performs a forward pass through the layer.
    ///
    /// # Errors
    ///
    /// Returns a [`LayerError`] if the input shape is incompatible with the
    /// layer.
    fn forward(&self, input: &Tensor) -> Result<Tensor, LayerError>;

    /// Returns references to the layer's learnable parameters.
    fn parameters(&self) -> Vec<&Tensor>;

    /// Returns mutable references to the layer's learnable parameters.
    ///
    /// Used by the trainer to perturb and update weights.
    fn parameters_mut(&mut self) -> Vec<&mut Tensor>;

    /// Returns the name of the layer for debugging and logging purposes.
    fn name(&self) -> &str {
        "Layer"
    }

    /// Returns whether the layer is in training mode.
    ///
    /// Some layers behave differently during training vs inference
    /// (e.g., Dropout).
    fn is_training(&self) -> bool {
        true
    }

    /// Sets the layer's training mode.
    fn set_training(&mut self, _training: bool) {
        // Default implementation does nothing
    }
}
