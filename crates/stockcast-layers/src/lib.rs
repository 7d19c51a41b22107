//! Neural network layers for stockcast recurrent forecasting models.
//!
//! This crate provides the layer substrate the stockcast model factory
//! builds on:
//!
//! - **Tensor**: a small dense `f32` tensor with `[batch, time, features]`
//!   sequence layout
//! - **Recurrent layers**: LSTM, GRU, SimpleRNN, and a bidirectional LSTM
//!   wrapper, with `return_sequences` stacking support
//! - **Dense**: fully connected output head with optional fused activation
//! - **Dropout**: inverted-scaling dropout with deterministic masks
//! - **Activations**: the fixed allow-list resolved by name
//!   (relu, sigmoid, tanh, softmax, elu, softsign, softplus, exponential)
//!
//! # Quick Start
//!
//! ```
//! use stockcast_layers::activation::Activation;
//! use stockcast_layers::layer::Layer;
//! use stockcast_layers::recurrent::Recurrent;
//! use stockcast_layers::tensor::Tensor;
//!
//! // A single LSTM layer reducing a 10-step window to one hidden vector
//! let layer = Recurrent::lstm(1, 16, Activation::Tanh, false, 42);
//! let window = Tensor::zeros(&[4, 10, 1]); // batch of 4
//! let hidden = layer.forward(&window).unwrap();
//! assert_eq!(hidden.shape(), &[4, 16]);
//! ```
//!
//! # Layer Trait
//!
//! All layers implement the [`layer::Layer`] trait, which provides a unified
//! interface for the forward pass and parameter access:
//!
//! ```
//! use stockcast_layers::layer::Layer;
//! use stockcast_layers::tensor::Tensor;
//!
//! fn run<L: Layer>(layer: &L, input: &Tensor) -> Tensor {
//!     layer.forward(input).unwrap()
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod activation;
pub mod dense;
pub mod dropout;
pub mod error;
pub mod gru;
pub mod initializer;
pub mod layer;
pub mod lstm;
pub mod recurrent;
pub mod simple_rnn;
pub mod tensor;

// Re-export main types at crate level
pub use activation::Activation;
pub use dense::Dense;
pub use dropout::Dropout;
pub use error::{LayerError, LayerResult};
pub use gru::GruCell;
pub use initializer::Initializer;
pub use layer::Layer;
pub use lstm::LstmCell;
pub use recurrent::{Recurrent, RecurrentCell};
pub use simple_rnn::SimpleRnnCell;
pub use tensor::Tensor;
