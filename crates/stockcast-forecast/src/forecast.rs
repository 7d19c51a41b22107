//! End-to-end train-and-forecast routine.
//!
//! [`train_and_forecast`] is the single entry point tying the factory,
//! trainer, and scaler together: build the stack, fit it, score it on the
//! held-out windows, then roll the trained model forward to produce a fixed
//! 10-step forecast in original price units.

use stockcast_layers::Tensor;

use crate::error::{ForecastError, ForecastResult};
use crate::factory::build_model;
use crate::metrics::Metrics;
use crate::model::{LayerKind, SequentialModel};
use crate::options::{ForecastOptions, InputShape};
use crate::scaler::MinMaxScaler;
use crate::trainer::Trainer;

/// Number of future steps every forecast produces.
pub const FORECAST_HORIZON: usize = 10;

/// The three result arrays of a train-and-forecast run, all in original
/// price units.
#[derive(Debug, Clone)]
pub struct ForecastOutput {
    /// Model predictions for the test windows, shape `[samples, 1]`.
    pub test_predictions: Tensor,
    /// True test targets reshaped to a single row, shape `[1, samples]`.
    pub test_targets: Tensor,
    /// Rolling forecast, shape `[FORECAST_HORIZON, 1]`.
    pub future: Tensor,
    /// Per-epoch training metrics.
    pub history: Vec<Metrics>,
    /// Evaluation metrics on the test windows.
    pub evaluation: Metrics,
}

/// Builds, trains, scores, and rolls forward a recurrent forecasting model.
///
/// # Arguments
///
/// * `kind` - Which recurrent cell the stack uses
/// * `options` - Hyperparameters (depth, epochs, units, batch size, dropout,
///   optimizer and loss names)
/// * `input_shape` - Window shape the training arrays must match
/// * `activation_name` - Activation for every recurrent layer and the head
/// * `scaler` - Fitted min-max transform used to report results in original
///   units
/// * `train_x` / `train_y` - Scaled training windows and targets
/// * `test_x` / `test_y` - Scaled held-out windows and targets
///
/// # Errors
///
/// Configuration, name-resolution, and scaler errors are typed; layer
/// failures during training or prediction propagate unchanged and terminate
/// the call.
#[allow(clippy::too_many_arguments)]
pub fn train_and_forecast(
    kind: LayerKind,
    options: &ForecastOptions,
    input_shape: InputShape,
    activation_name: &str,
    scaler: &MinMaxScaler,
    train_x: &Tensor,
    train_y: &Tensor,
    test_x: &Tensor,
    test_y: &Tensor,
) -> ForecastResult<ForecastOutput> {
    let model = build_model(kind, options, input_shape, activation_name)?;
    let mut trainer = Trainer::compile(model, options)?;

    let history = trainer.fit(train_x, train_y)?;
    let (raw_predictions, evaluation) = trainer.evaluate(test_x, test_y)?;

    let test_predictions = scaler.inverse_transform(&raw_predictions)?;

    // True targets are inverted as a single row; downstream consumers rely
    // on the [1, n] orientation.
    let n_test = test_y.numel();
    let test_targets = scaler.inverse_transform(&test_y.reshape(&[1, n_test]))?;

    let future = rolling_forecast(trainer.model(), scaler, train_y, &test_targets)?;

    Ok(ForecastOutput {
        test_predictions,
        test_targets,
        future,
        history,
        evaluation,
    })
}

/// Rolls a trained model forward for [`FORECAST_HORIZON`] steps.
///
/// The seed window prepends the last training target to the rescaled test
/// targets, anchoring the first prediction at the train/test boundary. Each
/// iteration feeds the model's own output back as the next window: the
/// `[1, 1]` prediction is reshaped to `[1, 1, 1]` and becomes the next
/// input, so the window collapses to a single step after the first
/// prediction. The accumulated buffer is reshaped to a column and mapped
/// back to original units.
///
/// # Errors
///
/// Returns [`ForecastError::Configuration`] when the training targets are
/// empty; prediction and scaler failures propagate unchanged.
pub fn rolling_forecast(
    model: &SequentialModel,
    scaler: &MinMaxScaler,
    train_y: &Tensor,
    rescaled_test_targets: &Tensor,
) -> ForecastResult<Tensor> {
    if train_y.numel() == 0 {
        return Err(ForecastError::Configuration {
            message: "cannot anchor a forecast without training targets".to_string(),
        });
    }

    let anchor = train_y.data()[train_y.numel() - 1];
    let mut window = Vec::with_capacity(rescaled_test_targets.numel() + 1);
    window.push(anchor);
    window.extend_from_slice(rescaled_test_targets.data());

    let steps = window.len();
    let mut p = Tensor::from_data(&[1, steps, 1], window);

    let mut buffer = Vec::with_capacity(FORECAST_HORIZON);
    for _ in 0..FORECAST_HORIZON {
        let prediction = model.predict(&p)?;
        p = prediction.reshape(&[1, prediction.shape()[0], prediction.shape()[1]]);
        buffer.push(p.data()[p.numel() - 1]);
    }

    let forecast = Tensor::from_data(&[FORECAST_HORIZON, 1], buffer);
    scaler.inverse_transform(&forecast)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted_scaler() -> MinMaxScaler {
        let mut scaler = MinMaxScaler::new();
        scaler.fit(&[90.0, 110.0]);
        scaler
    }

    fn tiny_model() -> SequentialModel {
        let options = ForecastOptions::default().with_units(3);
        build_model(LayerKind::Lstm, &options, InputShape::new(4, 1), "tanh").unwrap()
    }

    #[test]
    fn test_rolling_forecast_length() {
        let mut model = tiny_model();
        model.set_training(false);
        let scaler = fitted_scaler();

        let train_y = Tensor::from_data(&[5], vec![0.1, 0.2, 0.3, 0.4, 0.5]);
        let targets = Tensor::from_data(&[1, 3], vec![100.0, 101.0, 102.0]);

        let forecast = rolling_forecast(&model, &scaler, &train_y, &targets).unwrap();
        assert_eq!(forecast.shape(), &[FORECAST_HORIZON, 1]);
        assert!(forecast.data().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_rolling_forecast_requires_anchor() {
        let model = tiny_model();
        let scaler = fitted_scaler();
        let empty = Tensor::zeros(&[0]);
        let targets = Tensor::from_data(&[1, 2], vec![100.0, 101.0]);

        assert!(matches!(
            rolling_forecast(&model, &scaler, &empty, &targets),
            Err(ForecastError::Configuration { .. })
        ));
    }

    #[test]
    fn test_rolling_forecast_needs_fitted_scaler() {
        let mut model = tiny_model();
        model.set_training(false);
        let scaler = MinMaxScaler::new();
        let train_y = Tensor::from_data(&[2], vec![0.1, 0.2]);
        let targets = Tensor::from_data(&[1, 2], vec![100.0, 101.0]);

        assert!(matches!(
            rolling_forecast(&model, &scaler, &train_y, &targets),
            Err(ForecastError::ScalerNotFitted)
        ));
    }
}
