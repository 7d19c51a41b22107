//! Model factory.
//!
//! Builds the layered recurrent network from a layer-type token, a
//! configuration record, an input shape, and an activation name. The stack
//! is `iterations - 1` sequence-emitting recurrent layers each followed by
//! dropout at the configured rate, then a terminal recurrent layer, a fixed
//! dropout, and a single-unit dense head carrying the same activation.

use stockcast_layers::{Activation, Dense, Dropout, Recurrent};

use crate::error::{ForecastError, ForecastResult};
use crate::model::{LayerKind, ModelLayer, SequentialModel};
use crate::options::{ForecastOptions, InputShape};

/// Dropout rate applied after the terminal recurrent layer, independent of
/// the configured stacking rate.
const TERMINAL_DROPOUT: f32 = 0.1;

/// Resolves an activation name against the fixed allow-list.
///
/// With `fallback = None` an unknown name is a hard
/// [`ForecastError::UnknownActivation`]. Passing `Some(act)` substitutes
/// `act` for unknown names instead, reproducing the legacy
/// default-on-miss behavior.
pub fn resolve_activation(
    name: &str,
    fallback: Option<Activation>,
) -> ForecastResult<Activation> {
    match Activation::from_name(name) {
        Some(act) => Ok(act),
        None => fallback.ok_or_else(|| ForecastError::UnknownActivation {
            name: name.to_string(),
        }),
    }
}

/// Builds the sequential recurrent model described by the options.
///
/// # Errors
///
/// Returns [`ForecastError::Configuration`] for a degenerate iteration
/// count, unit count, dropout rate, or input shape, and
/// [`ForecastError::UnknownActivation`] under the strict resolution policy.
///
/// # Example
///
/// ```
/// use stockcast_forecast::factory::build_model;
/// use stockcast_forecast::model::LayerKind;
/// use stockcast_forecast::options::{ForecastOptions, InputShape};
///
/// let options = ForecastOptions::default().with_iterations(2).with_units(8);
/// let model = build_model(LayerKind::Lstm, &options, InputShape::new(10, 1), "tanh").unwrap();
/// assert_eq!(model.recurrent_count(), 2);
/// assert_eq!(model.dropout_count(), 2);
/// assert_eq!(model.dense_count(), 1);
/// ```
pub fn build_model(
    kind: LayerKind,
    options: &ForecastOptions,
    input_shape: InputShape,
    activation_name: &str,
) -> ForecastResult<SequentialModel> {
    validate(options, input_shape)?;
    let activation = resolve_activation(activation_name, options.fallback_activation)?;

    let mut layers = Vec::with_capacity(2 * options.iterations + 1);
    let mut in_dim = input_shape.features;
    let seed_base = 0x5eed ^ ((options.units as u64) << 8) ^ options.iterations as u64;

    // Stacked layers emit per-step sequences so the next recurrent layer
    // has a time axis to consume.
    for i in 0..options.iterations - 1 {
        let layer = make_recurrent(kind, in_dim, options.units, activation, true, seed_base + i as u64);
        in_dim = layer.output_size();
        layers.push(ModelLayer::Recurrent(layer));
        layers.push(ModelLayer::Dropout(
            Dropout::new(options.dropout).map_err(ForecastError::Layer)?,
        ));
    }

    // Terminal block: final hidden state, fixed dropout, single-unit head
    let terminal = make_recurrent(
        kind,
        in_dim,
        options.units,
        activation,
        false,
        seed_base + options.iterations as u64,
    );
    in_dim = terminal.output_size();
    layers.push(ModelLayer::Recurrent(terminal));
    layers.push(ModelLayer::Dropout(
        Dropout::new(TERMINAL_DROPOUT).map_err(ForecastError::Layer)?,
    ));
    layers.push(ModelLayer::Dense(Dense::with_activation(
        in_dim,
        1,
        Some(activation),
    )));

    Ok(SequentialModel::new(layers))
}

fn make_recurrent(
    kind: LayerKind,
    input_size: usize,
    units: usize,
    activation: Activation,
    return_sequences: bool,
    seed: u64,
) -> Recurrent {
    match kind {
        LayerKind::Lstm => Recurrent::lstm(input_size, units, activation, return_sequences, seed),
        LayerKind::Gru => Recurrent::gru(input_size, units, activation, return_sequences, seed),
        LayerKind::SimpleRnn => {
            Recurrent::simple_rnn(input_size, units, activation, return_sequences, seed)
        }
        LayerKind::Bidirectional => {
            Recurrent::bidirectional_lstm(input_size, units, activation, return_sequences, seed)
        }
    }
}

fn validate(options: &ForecastOptions, input_shape: InputShape) -> ForecastResult<()> {
    if options.iterations < 1 {
        return Err(ForecastError::Configuration {
            message: format!(
                "iterations must be at least 1, got {}",
                options.iterations
            ),
        });
    }
    if options.units < 1 {
        return Err(ForecastError::Configuration {
            message: "units must be at least 1".to_string(),
        });
    }
    if !(0.0..1.0).contains(&options.dropout) {
        return Err(ForecastError::Configuration {
            message: format!("dropout must be in [0, 1), got {}", options.dropout),
        });
    }
    if input_shape.timesteps < 1 || input_shape.features < 1 {
        return Err(ForecastError::Configuration {
            message: format!(
                "input shape must be at least (1, 1), got ({}, {})",
                input_shape.timesteps, input_shape.features
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockcast_layers::Tensor;

    fn options(iterations: usize) -> ForecastOptions {
        ForecastOptions::default()
            .with_iterations(iterations)
            .with_units(4)
            .with_dropout(0.2)
    }

    #[test]
    fn test_single_iteration_stack() {
        let model = build_model(LayerKind::Lstm, &options(1), InputShape::new(10, 1), "tanh")
            .unwrap();

        let names: Vec<&str> = model.layers().iter().map(|l| l.name()).collect();
        assert_eq!(names, vec!["LSTM", "Dropout", "Dense"]);

        // The only dropout is the fixed terminal one
        match &model.layers()[1] {
            ModelLayer::Dropout(d) => assert!((d.rate() - TERMINAL_DROPOUT).abs() < 1e-6),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_stacked_iteration_counts() {
        let model = build_model(LayerKind::Gru, &options(3), InputShape::new(10, 1), "tanh")
            .unwrap();

        assert_eq!(model.recurrent_count(), 3);
        assert_eq!(model.dropout_count(), 3);
        assert_eq!(model.dense_count(), 1);

        // First two dropouts carry the configured rate, the last the fixed one
        let rates: Vec<f32> = model
            .layers()
            .iter()
            .filter_map(|l| match l {
                ModelLayer::Dropout(d) => Some(d.rate()),
                _ => None,
            })
            .collect();
        assert!((rates[0] - 0.2).abs() < 1e-6);
        assert!((rates[1] - 0.2).abs() < 1e-6);
        assert!((rates[2] - TERMINAL_DROPOUT).abs() < 1e-6);
    }

    #[test]
    fn test_zero_iterations_is_configuration_error() {
        let err = build_model(LayerKind::Lstm, &options(0), InputShape::new(10, 1), "tanh")
            .unwrap_err();
        assert!(matches!(err, ForecastError::Configuration { .. }));
    }

    #[test]
    fn test_unknown_activation_strict() {
        let err = build_model(LayerKind::Lstm, &options(1), InputShape::new(10, 1), "bogus")
            .unwrap_err();
        assert!(matches!(
            err,
            ForecastError::UnknownActivation { ref name } if name == "bogus"
        ));
    }

    #[test]
    fn test_unknown_activation_legacy_fallback() {
        let opts = options(1).with_fallback_activation(Some(Activation::Tanh));
        let model =
            build_model(LayerKind::Lstm, &opts, InputShape::new(10, 1), "bogus").unwrap();
        match &model.layers()[0] {
            ModelLayer::Recurrent(r) => assert_eq!(r.activation(), Activation::Tanh),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_bidirectional_widens_head() {
        let model = build_model(
            LayerKind::Bidirectional,
            &options(2),
            InputShape::new(6, 1),
            "tanh",
        )
        .unwrap();

        // Forward pass confirms the doubled hidden width feeds the head
        let window = Tensor::zeros(&[2, 6, 1]);
        let output = model.forward(&window).unwrap();
        assert_eq!(output.shape(), &[2, 1]);

        match &model.layers()[model.layers().len() - 1] {
            ModelLayer::Dense(d) => assert_eq!(d.in_features(), 8), // 2 * units
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_invalid_options_rejected() {
        let bad_units = options(1).with_units(0);
        assert!(build_model(LayerKind::Lstm, &bad_units, InputShape::new(10, 1), "tanh").is_err());

        let bad_dropout = options(1).with_dropout(1.0);
        assert!(
            build_model(LayerKind::Lstm, &bad_dropout, InputShape::new(10, 1), "tanh").is_err()
        );

        assert!(build_model(LayerKind::Lstm, &options(1), InputShape::new(0, 1), "tanh").is_err());
    }

    #[test]
    fn test_every_kind_builds_and_runs() {
        for kind in [
            LayerKind::Lstm,
            LayerKind::Gru,
            LayerKind::SimpleRnn,
            LayerKind::Bidirectional,
        ] {
            let model =
                build_model(kind, &options(2), InputShape::new(5, 1), "relu").unwrap();
            let output = model.forward(&Tensor::zeros(&[1, 5, 1])).unwrap();
            assert_eq!(output.shape(), &[1, 1]);
        }
    }
}
