//! Fixed stack-model topologies.
//!
//! A [`StackModel`] is the small capability every fixed topology offers:
//! build the layer stack, then compile it against optimizer and loss names.
//! Topologies are plain tagged variants; adding one means adding a struct,
//! not a subclass.

use stockcast_layers::{Activation, Dense, Dropout, Recurrent};

use crate::error::{ForecastError, ForecastResult};
use crate::model::{ModelLayer, SequentialModel};
use crate::options::{ForecastOptions, InputShape};
use crate::trainer::Trainer;

/// Dropout rate after each stage of a fixed stack.
const STAGE_DROPOUT: f32 = 0.1;

/// Build-and-compile capability of a fixed model topology.
pub trait StackModel {
    /// Builds the layer stack for this topology.
    fn build(&self, input_shape: InputShape) -> ForecastResult<SequentialModel>;

    /// Builds the stack and compiles it with the given optimizer and loss
    /// names.
    fn compile(
        &self,
        input_shape: InputShape,
        optimizer: &str,
        loss: &str,
    ) -> ForecastResult<Trainer> {
        let model = self.build(input_shape)?;
        let options = ForecastOptions::default()
            .with_optimizer(optimizer)
            .with_loss(loss);
        Trainer::compile(model, &options)
    }
}

/// Two stacked LSTM stages with per-stage unit counts.
///
/// Stage one emits sequences into stage two; each stage is followed by a
/// fixed 0.1 dropout, and a single-unit dense head closes the stack. The
/// recurrent layers keep their default activation.
#[derive(Debug, Clone, Copy)]
pub struct TwoStack {
    /// Hidden units in the first stage
    pub units1: usize,
    /// Hidden units in the second stage
    pub units2: usize,
}

impl TwoStack {
    /// Creates a two-stage LSTM topology.
    pub fn new(units1: usize, units2: usize) -> Self {
        Self { units1, units2 }
    }
}

impl StackModel for TwoStack {
    fn build(&self, input_shape: InputShape) -> ForecastResult<SequentialModel> {
        validate_units(self.units1, self.units2)?;
        let act = Activation::default();
        let seed = stack_seed(self.units1, self.units2);

        let first = Recurrent::lstm(input_shape.features, self.units1, act, true, seed);
        let second = Recurrent::lstm(self.units1, self.units2, act, false, seed ^ 0x2);
        let head_width = second.output_size();

        Ok(SequentialModel::new(vec![
            ModelLayer::Recurrent(first),
            ModelLayer::Dropout(Dropout::new(STAGE_DROPOUT).map_err(ForecastError::Layer)?),
            ModelLayer::Recurrent(second),
            ModelLayer::Dropout(Dropout::new(STAGE_DROPOUT).map_err(ForecastError::Layer)?),
            ModelLayer::Dense(Dense::new(head_width, 1)),
        ]))
    }
}

/// Two stacked bidirectional-LSTM stages with per-stage unit counts.
///
/// Same shape as [`TwoStack`] with each stage wrapped bidirectionally, so
/// stage outputs are twice as wide.
#[derive(Debug, Clone, Copy)]
pub struct BidirTwoStack {
    /// Hidden units per direction in the first stage
    pub units1: usize,
    /// Hidden units per direction in the second stage
    pub units2: usize,
}

impl BidirTwoStack {
    /// Creates a two-stage bidirectional-LSTM topology.
    pub fn new(units1: usize, units2: usize) -> Self {
        Self { units1, units2 }
    }
}

impl StackModel for BidirTwoStack {
    fn build(&self, input_shape: InputShape) -> ForecastResult<SequentialModel> {
        validate_units(self.units1, self.units2)?;
        let act = Activation::default();
        let seed = stack_seed(self.units1, self.units2) ^ 0xb1d1;

        let first =
            Recurrent::bidirectional_lstm(input_shape.features, self.units1, act, true, seed);
        let second = Recurrent::bidirectional_lstm(
            first.output_size(),
            self.units2,
            act,
            false,
            seed ^ 0x2,
        );
        let head_width = second.output_size();

        Ok(SequentialModel::new(vec![
            ModelLayer::Recurrent(first),
            ModelLayer::Dropout(Dropout::new(STAGE_DROPOUT).map_err(ForecastError::Layer)?),
            ModelLayer::Recurrent(second),
            ModelLayer::Dropout(Dropout::new(STAGE_DROPOUT).map_err(ForecastError::Layer)?),
            ModelLayer::Dense(Dense::new(head_width, 1)),
        ]))
    }
}

fn validate_units(units1: usize, units2: usize) -> ForecastResult<()> {
    if units1 < 1 || units2 < 1 {
        return Err(ForecastError::Configuration {
            message: format!(
                "stack unit counts must be at least 1, got ({}, {})",
                units1, units2
            ),
        });
    }
    Ok(())
}

fn stack_seed(units1: usize, units2: usize) -> u64 {
    0x57ac ^ ((units1 as u64) << 16) ^ units2 as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockcast_layers::Tensor;

    #[test]
    fn test_two_stack_layout() {
        let model = TwoStack::new(8, 4).build(InputShape::new(6, 1)).unwrap();
        let names: Vec<&str> = model.layers().iter().map(|l| l.name()).collect();
        assert_eq!(names, vec!["LSTM", "Dropout", "LSTM", "Dropout", "Dense"]);

        let output = model.forward(&Tensor::zeros(&[2, 6, 1])).unwrap();
        assert_eq!(output.shape(), &[2, 1]);
    }

    #[test]
    fn test_bidir_two_stack_layout() {
        let model = BidirTwoStack::new(8, 4).build(InputShape::new(6, 1)).unwrap();
        assert_eq!(model.recurrent_count(), 2);
        assert_eq!(model.dropout_count(), 2);
        assert_eq!(model.dense_count(), 1);

        // The head consumes both directions of the second stage
        match model.layers().last().unwrap() {
            ModelLayer::Dense(d) => assert_eq!(d.in_features(), 8),
            _ => unreachable!(),
        }

        let output = model.forward(&Tensor::zeros(&[2, 6, 1])).unwrap();
        assert_eq!(output.shape(), &[2, 1]);
    }

    #[test]
    fn test_stage_dropout_is_fixed() {
        let model = BidirTwoStack::new(8, 4).build(InputShape::new(6, 1)).unwrap();
        for layer in model.layers() {
            if let ModelLayer::Dropout(d) = layer {
                assert!((d.rate() - STAGE_DROPOUT).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_compile_resolves_names() {
        let trainer = BidirTwoStack::new(4, 2)
            .compile(InputShape::new(6, 1), "adam", "mse")
            .unwrap();
        assert_eq!(trainer.loss().name(), "mse");

        let err = TwoStack::new(4, 2)
            .compile(InputShape::new(6, 1), "adamax", "mse")
            .unwrap_err();
        assert!(matches!(err, ForecastError::UnknownOptimizer { .. }));
    }

    #[test]
    fn test_zero_units_rejected() {
        assert!(TwoStack::new(0, 4).build(InputShape::new(6, 1)).is_err());
        assert!(BidirTwoStack::new(4, 0).build(InputShape::new(6, 1)).is_err());
    }
}
