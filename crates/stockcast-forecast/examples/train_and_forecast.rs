//! Trains a small LSTM on a synthetic price series and prints a 10-step
//! forecast.
//!
//! Run with: `cargo run --example train_and_forecast`

use stockcast_forecast::forecast::train_and_forecast;
use stockcast_forecast::model::LayerKind;
use stockcast_forecast::options::{ForecastOptions, InputShape};
use stockcast_forecast::scaler::MinMaxScaler;
use stockcast_layers::Tensor;

const WINDOW: usize = 10;
const TEST_LEN: usize = 20;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(false).init();

    // Synthetic daily closes: drift plus two oscillations
    let prices: Vec<f32> = (0..220)
        .map(|i| {
            let t = i as f32;
            120.0 + t * 0.08 + (t * 0.20).sin() * 6.0 + (t * 0.047).cos() * 3.0
        })
        .collect();

    let mut scaler = MinMaxScaler::new();
    let scaled = scaler.fit_transform(&prices)?;

    // Overlapping windows with next-value targets
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for i in 0..scaled.len() - WINDOW {
        xs.extend_from_slice(&scaled[i..i + WINDOW]);
        ys.push(scaled[i + WINDOW]);
    }
    let n = ys.len();
    let split = n - TEST_LEN;

    let train_x = Tensor::from_data(&[split, WINDOW, 1], xs[..split * WINDOW].to_vec());
    let train_y = Tensor::from_data(&[split, 1], ys[..split].to_vec());
    let test_x = Tensor::from_data(&[TEST_LEN, WINDOW, 1], xs[split * WINDOW..].to_vec());
    let test_y = Tensor::from_data(&[TEST_LEN, 1], ys[split..].to_vec());

    let options = ForecastOptions::default()
        .with_iterations(2)
        .with_epochs(5)
        .with_units(16)
        .with_batch_size(Some(16))
        .with_dropout(0.1)
        .with_optimizer("adam")
        .with_loss("mse");

    let output = train_and_forecast(
        LayerKind::Lstm,
        &options,
        InputShape::new(WINDOW, 1),
        "tanh",
        &scaler,
        &train_x,
        &train_y,
        &test_x,
        &test_y,
    )?;

    println!();
    println!(
        "Test loss: {:.6} over {} held-out windows",
        output.evaluation.loss, TEST_LEN
    );
    println!("Next {} predicted closes:", output.future.shape()[0]);
    for (day, value) in output.future.data().iter().enumerate() {
        println!("  t+{:<2} {:>9.2}", day + 1, value);
    }

    Ok(())
}
