//! Sequential model assembly.
//!
//! A [`SequentialModel`] is an ordered stack of recurrent, dropout, and
//! dense layers built once per factory invocation. The forward pass threads
//! a `[batch, time, features]` window through the stack; the terminal
//! recurrent layer collapses the time axis and the dense head reduces to a
//! single predicted value per window.

use serde::{Deserialize, Serialize};
use stockcast_layers::{Dense, Dropout, Layer, LayerError, Recurrent, Tensor};

use crate::error::{ForecastError, ForecastResult};

/// The layer-type token selecting which recurrent cell the factory stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerKind {
    /// Long Short-Term Memory
    Lstm,
    /// Gated Recurrent Unit
    Gru,
    /// Elman RNN
    SimpleRnn,
    /// Bidirectional LSTM wrapper
    Bidirectional,
}

impl LayerKind {
    /// Resolves a layer-type token by name.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::UnknownLayerKind`] for tokens outside the
    /// supported set.
    ///
    /// # Example
    ///
    /// ```
    /// use stockcast_forecast::model::LayerKind;
    ///
    /// assert_eq!(LayerKind::from_name("LSTM").unwrap(), LayerKind::Lstm);
    /// assert!(LayerKind::from_name("Conv1D").is_err());
    /// ```
    pub fn from_name(name: &str) -> ForecastResult<Self> {
        match name {
            "LSTM" => Ok(Self::Lstm),
            "GRU" => Ok(Self::Gru),
            "SimpleRNN" => Ok(Self::SimpleRnn),
            "Bidirectional" => Ok(Self::Bidirectional),
            _ => Err(ForecastError::UnknownLayerKind {
                name: name.to_string(),
            }),
        }
    }

    /// Returns the canonical token for the layer kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Lstm => "LSTM",
            Self::Gru => "GRU",
            Self::SimpleRnn => "SimpleRNN",
            Self::Bidirectional => "Bidirectional",
        }
    }
}

/// One layer in a sequential stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModelLayer {
    /// A recurrent layer (LSTM / GRU / SimpleRNN / bidirectional LSTM)
    Recurrent(Recurrent),
    /// A dropout layer
    Dropout(Dropout),
    /// A dense layer
    Dense(Dense),
}

impl ModelLayer {
    fn forward(&self, input: &Tensor) -> Result<Tensor, LayerError> {
        match self {
            Self::Recurrent(layer) => layer.forward(input),
            Self::Dropout(layer) => layer.forward(input),
            Self::Dense(layer) => layer.forward(input),
        }
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        match self {
            Self::Recurrent(layer) => layer.parameters_mut(),
            Self::Dropout(layer) => layer.parameters_mut(),
            Self::Dense(layer) => layer.parameters_mut(),
        }
    }

    fn set_training(&mut self, training: bool) {
        match self {
            Self::Recurrent(layer) => layer.set_training(training),
            Self::Dropout(layer) => layer.set_training(training),
            Self::Dense(layer) => layer.set_training(training),
        }
    }

    /// Returns the layer's display name.
    pub fn name(&self) -> &str {
        match self {
            Self::Recurrent(layer) => layer.name(),
            Self::Dropout(layer) => layer.name(),
            Self::Dense(layer) => layer.name(),
        }
    }
}

/// An ordered stack of layers built by the model factory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequentialModel {
    layers: Vec<ModelLayer>,
    training: bool,
}

impl SequentialModel {
    /// Creates a model from an ordered layer stack.
    pub fn new(layers: Vec<ModelLayer>) -> Self {
        Self {
            layers,
            training: true,
        }
    }

    /// Returns the ordered layer stack.
    pub fn layers(&self) -> &[ModelLayer] {
        &self.layers
    }

    /// Number of recurrent layers in the stack.
    pub fn recurrent_count(&self) -> usize {
        self.layers
            .iter()
            .filter(|l| matches!(l, ModelLayer::Recurrent(_)))
            .count()
    }

    /// Number of dropout layers in the stack.
    pub fn dropout_count(&self) -> usize {
        self.layers
            .iter()
            .filter(|l| matches!(l, ModelLayer::Dropout(_)))
            .count()
    }

    /// Number of dense layers in the stack.
    pub fn dense_count(&self) -> usize {
        self.layers
            .iter()
            .filter(|l| matches!(l, ModelLayer::Dense(_)))
            .count()
    }

    /// Runs a window batch through the stack.
    ///
    /// # Errors
    ///
    /// Propagates any [`LayerError`] from the stack unchanged.
    pub fn forward(&self, input: &Tensor) -> ForecastResult<Tensor> {
        let mut x = input.clone();
        for layer in &self.layers {
            x = layer.forward(&x)?;
        }
        Ok(x)
    }

    /// Convenience alias for the inference pass.
    pub fn predict(&self, input: &Tensor) -> ForecastResult<Tensor> {
        self.forward(input)
    }

    /// Sets the training mode on every layer (dropout toggles between mask
    /// and identity).
    pub fn set_training(&mut self, training: bool) {
        self.training = training;
        for layer in &mut self.layers {
            layer.set_training(training);
        }
    }

    /// Returns whether the model is in training mode.
    pub fn is_training(&self) -> bool {
        self.training
    }

    /// Mutable references to every parameter tensor in the stack, in layer
    /// order. Used by the trainer for perturbation and updates.
    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        self.layers
            .iter_mut()
            .flat_map(|layer| layer.parameters_mut())
            .collect()
    }

    /// Total number of scalar parameters.
    pub fn parameter_count(&mut self) -> usize {
        self.parameters_mut().iter().map(|p| p.numel()).sum()
    }
}
