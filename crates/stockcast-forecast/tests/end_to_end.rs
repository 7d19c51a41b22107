//! End-to-end tests for the train-and-forecast pipeline.

use stockcast_forecast::forecast::{train_and_forecast, FORECAST_HORIZON};
use stockcast_forecast::model::LayerKind;
use stockcast_forecast::options::{ForecastOptions, InputShape};
use stockcast_forecast::scaler::MinMaxScaler;
use stockcast_forecast::ForecastError;
use stockcast_layers::Tensor;

/// Synthetic price series with a mild trend and oscillation.
fn price_series(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 100.0 + i as f32 * 0.1 + (i as f32 * 0.3).sin() * 4.0)
        .collect()
}

/// Slices a scaled series into overlapping windows with next-value targets
/// and splits off the last `test_len` samples.
fn windowed_split(
    scaled: &[f32],
    window: usize,
    test_len: usize,
) -> (Tensor, Tensor, Tensor, Tensor) {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for i in 0..scaled.len() - window {
        xs.extend_from_slice(&scaled[i..i + window]);
        ys.push(scaled[i + window]);
    }
    let n = ys.len();
    let split = n - test_len;

    (
        Tensor::from_data(&[split, window, 1], xs[..split * window].to_vec()),
        Tensor::from_data(&[split, 1], ys[..split].to_vec()),
        Tensor::from_data(&[test_len, window, 1], xs[split * window..].to_vec()),
        Tensor::from_data(&[test_len, 1], ys[split..].to_vec()),
    )
}

fn scenario_options() -> ForecastOptions {
    ForecastOptions::default()
        .with_iterations(2)
        .with_epochs(1)
        .with_units(4)
        .with_batch_size(Some(2))
        .with_dropout(0.1)
        .with_optimizer("adam")
        .with_loss("mse")
}

#[test]
fn lstm_scenario_returns_three_shaped_arrays() {
    let prices = price_series(40);
    let mut scaler = MinMaxScaler::new();
    let scaled = scaler.fit_transform(&prices).unwrap();
    let (train_x, train_y, test_x, test_y) = windowed_split(&scaled, 10, 8);

    let output = train_and_forecast(
        LayerKind::Lstm,
        &scenario_options(),
        InputShape::new(10, 1),
        "relu",
        &scaler,
        &train_x,
        &train_y,
        &test_x,
        &test_y,
    )
    .unwrap();

    assert_eq!(output.test_predictions.shape(), &[8, 1]);
    assert_eq!(output.test_targets.shape(), &[1, 8]);
    assert_eq!(output.future.shape(), &[FORECAST_HORIZON, 1]);

    assert_eq!(output.history.len(), 1);
    assert!(output.evaluation.loss.is_finite());
    assert!(output.future.data().iter().all(|v| v.is_finite()));
}

#[test]
fn forecast_horizon_is_fixed_across_configs() {
    let prices = price_series(36);
    let mut scaler = MinMaxScaler::new();
    let scaled = scaler.fit_transform(&prices).unwrap();
    let (train_x, train_y, test_x, test_y) = windowed_split(&scaled, 6, 5);

    for (iterations, epochs) in [(1, 1), (2, 2), (3, 1)] {
        let options = scenario_options()
            .with_iterations(iterations)
            .with_epochs(epochs)
            .with_batch_size(Some(4));
        let output = train_and_forecast(
            LayerKind::Gru,
            &options,
            InputShape::new(6, 1),
            "tanh",
            &scaler,
            &train_x,
            &train_y,
            &test_x,
            &test_y,
        )
        .unwrap();
        assert_eq!(output.future.shape(), &[FORECAST_HORIZON, 1]);
    }
}

#[test]
fn every_layer_kind_completes_the_pipeline() {
    let prices = price_series(30);
    let mut scaler = MinMaxScaler::new();
    let scaled = scaler.fit_transform(&prices).unwrap();
    let (train_x, train_y, test_x, test_y) = windowed_split(&scaled, 5, 4);
    let options = scenario_options().with_batch_size(Some(4));

    for kind in [
        LayerKind::Lstm,
        LayerKind::Gru,
        LayerKind::SimpleRnn,
        LayerKind::Bidirectional,
    ] {
        let output = train_and_forecast(
            kind,
            &options,
            InputShape::new(5, 1),
            "tanh",
            &scaler,
            &train_x,
            &train_y,
            &test_x,
            &test_y,
        )
        .unwrap();
        assert_eq!(output.test_predictions.shape(), &[4, 1]);
        assert_eq!(output.future.shape(), &[FORECAST_HORIZON, 1]);
    }
}

#[test]
fn derived_batch_size_path_runs() {
    let prices = price_series(60);
    let mut scaler = MinMaxScaler::new();
    let scaled = scaler.fit_transform(&prices).unwrap();
    // Window length 40 derives a batch size of round(40 * 0.025) = 1
    let (train_x, train_y, test_x, test_y) = windowed_split(&scaled, 40, 4);
    let options = scenario_options().with_batch_size(None).with_iterations(1);
    assert_eq!(options.resolved_batch_size(40), 1);

    let output = train_and_forecast(
        LayerKind::SimpleRnn,
        &options,
        InputShape::new(40, 1),
        "tanh",
        &scaler,
        &train_x,
        &train_y,
        &test_x,
        &test_y,
    )
    .unwrap();
    assert_eq!(output.future.shape(), &[FORECAST_HORIZON, 1]);
}

#[test]
fn unknown_tokens_are_typed_errors() {
    let prices = price_series(24);
    let mut scaler = MinMaxScaler::new();
    let scaled = scaler.fit_transform(&prices).unwrap();
    let (train_x, train_y, test_x, test_y) = windowed_split(&scaled, 4, 3);
    let shape = InputShape::new(4, 1);

    let err = train_and_forecast(
        LayerKind::Lstm,
        &scenario_options(),
        shape,
        "bogus",
        &scaler,
        &train_x,
        &train_y,
        &test_x,
        &test_y,
    )
    .unwrap_err();
    assert!(matches!(err, ForecastError::UnknownActivation { .. }));

    let err = train_and_forecast(
        LayerKind::Lstm,
        &scenario_options().with_optimizer("adagrad"),
        shape,
        "tanh",
        &scaler,
        &train_x,
        &train_y,
        &test_x,
        &test_y,
    )
    .unwrap_err();
    assert!(matches!(err, ForecastError::UnknownOptimizer { .. }));

    let err = train_and_forecast(
        LayerKind::Lstm,
        &scenario_options().with_loss("hinge"),
        shape,
        "tanh",
        &scaler,
        &train_x,
        &train_y,
        &test_x,
        &test_y,
    )
    .unwrap_err();
    assert!(matches!(err, ForecastError::UnknownLoss { .. }));
}

#[test]
fn legacy_activation_fallback_completes() {
    use stockcast_layers::Activation;

    let prices = price_series(24);
    let mut scaler = MinMaxScaler::new();
    let scaled = scaler.fit_transform(&prices).unwrap();
    let (train_x, train_y, test_x, test_y) = windowed_split(&scaled, 4, 3);

    let options =
        scenario_options().with_fallback_activation(Some(Activation::Tanh));
    let output = train_and_forecast(
        LayerKind::Lstm,
        &options,
        InputShape::new(4, 1),
        "bogus",
        &scaler,
        &train_x,
        &train_y,
        &test_x,
        &test_y,
    )
    .unwrap();
    assert_eq!(output.future.shape(), &[FORECAST_HORIZON, 1]);
}

#[test]
fn scaler_round_trip_holds_for_pipeline_shapes() {
    let prices = price_series(20);
    let mut scaler = MinMaxScaler::new();
    scaler.fit(&prices);

    let column = Tensor::from_data(&[10, 1], prices[..10].to_vec());
    let restored = scaler
        .inverse_transform(&scaler.transform(&column).unwrap())
        .unwrap();
    for (orig, back) in column.data().iter().zip(restored.data()) {
        assert!((orig - back).abs() < 1e-3);
    }

    let row = Tensor::from_data(&[1, 10], prices[10..].to_vec());
    let restored = scaler
        .inverse_transform(&scaler.transform(&row).unwrap())
        .unwrap();
    assert_eq!(restored.shape(), &[1, 10]);
}
