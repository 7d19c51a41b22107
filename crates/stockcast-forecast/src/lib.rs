//! Recurrent model factory, trainer, and rolling forecaster for stock
//! price series.
//!
//! Given hyperparameters, a layer-type token, an activation name, and
//! pre-scaled train/test arrays, this crate builds a layered recurrent
//! network, trains it, scores it against the held-out windows, and rolls
//! the trained model forward to a fixed 10-step forecast:
//!
//! ```
//! use stockcast_forecast::forecast::train_and_forecast;
//! use stockcast_forecast::model::LayerKind;
//! use stockcast_forecast::options::{ForecastOptions, InputShape};
//! use stockcast_forecast::scaler::MinMaxScaler;
//! use stockcast_layers::Tensor;
//!
//! // Scale a toy price series
//! let prices: Vec<f32> = (0..30).map(|i| 100.0 + (i as f32 * 0.4).sin() * 5.0).collect();
//! let mut scaler = MinMaxScaler::new();
//! let scaled = scaler.fit_transform(&prices).unwrap();
//!
//! // Slice 4-step windows with next-value targets
//! let window = 4;
//! let mut xs = Vec::new();
//! let mut ys = Vec::new();
//! for i in 0..scaled.len() - window {
//!     xs.extend_from_slice(&scaled[i..i + window]);
//!     ys.push(scaled[i + window]);
//! }
//! let n = ys.len();
//! let split = n - 6;
//! let train_x = Tensor::from_data(&[split, window, 1], xs[..split * window].to_vec());
//! let train_y = Tensor::from_data(&[split, 1], ys[..split].to_vec());
//! let test_x = Tensor::from_data(&[n - split, window, 1], xs[split * window..].to_vec());
//! let test_y = Tensor::from_data(&[n - split, 1], ys[split..].to_vec());
//!
//! let options = ForecastOptions::default()
//!     .with_units(4)
//!     .with_epochs(1)
//!     .with_batch_size(Some(8));
//! let output = train_and_forecast(
//!     LayerKind::Lstm,
//!     &options,
//!     InputShape::new(window, 1),
//!     "tanh",
//!     &scaler,
//!     &train_x,
//!     &train_y,
//!     &test_x,
//!     &test_y,
//! )
//! .unwrap();
//!
//! assert_eq!(output.test_predictions.shape(), &[6, 1]);
//! assert_eq!(output.test_targets.shape(), &[1, 6]);
//! assert_eq!(output.future.shape(), &[10, 1]);
//! ```
//!
//! Fixed topologies (two-stage stacks, bidirectional variants) live in
//! [`stack`] behind the [`stack::StackModel`] build-and-compile capability.
//!
//! Every call builds and discards its own model and optimizer state; there
//! is no persistence and no shared state between invocations.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod factory;
pub mod forecast;
pub mod loss;
pub mod metrics;
pub mod model;
pub mod options;
pub mod scaler;
pub mod stack;
pub mod trainer;

// Re-export main types at crate level
pub use error::{ForecastError, ForecastResult};
pub use factory::build_model;
pub use forecast::{train_and_forecast, ForecastOutput, FORECAST_HORIZON};
pub use loss::Loss;
pub use metrics::Metrics;
pub use model::{LayerKind, ModelLayer, SequentialModel};
pub use options::{ForecastOptions, InputShape};
pub use scaler::MinMaxScaler;
pub use stack::{BidirTwoStack, StackModel, TwoStack};
pub use trainer::Trainer;
