//! Position trajectory demonstration
//!
//! Runs the full pipeline over a recording and plots the drift-corrected
//! position of each axis alongside the raw integrated position.
//!
//! The recording is a CSV file with the columns
//! `gx,gy,gz,ax,ay,az` (rad/s and g) sampled at 256 Hz. Without a path
//! argument a synthetic figure-of-eight sweep is used instead.
//!
//! Run with: `cargo run --example trajectory [recording.csv]`
//! Set `RUST_LOG=imu_tracker=debug` to see pipeline logging.

use imu_tracker::{PositionEstimator, PositionSettings, Sample, STANDARD_GRAVITY};
use nalgebra::Vector3;
use plotters::prelude::*;
use serde::Deserialize;
use std::error::Error;
use std::f32::consts::PI;
use tracing::info;

const SAMPLE_RATE: f32 = 256.0;

#[derive(Debug, Deserialize)]
struct SensorData {
    gx: f32,
    gy: f32,
    gz: f32,
    ax: f32,
    ay: f32,
    az: f32,
}

fn load_recording(path: &str) -> Result<Vec<Sample>, Box<dyn Error>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut samples = Vec::new();

    for result in reader.deserialize() {
        let record: SensorData = result?;
        samples.push(Sample::new(
            Vector3::new(record.gx, record.gy, record.gz),
            Vector3::new(record.ax, record.ay, record.az),
        ));
    }

    Ok(samples)
}

/// Level sensor tracing a horizontal figure of eight
fn synthesize(seconds: f32) -> Vec<Sample> {
    let count = (seconds * SAMPLE_RATE) as usize;
    let omega = 2.0 * PI * 0.5;

    (0..count)
        .map(|n| {
            let t = n as f32 / SAMPLE_RATE;
            // x = 0.2 sin(ωt), y = 0.1 sin(2ωt)
            let ax = -0.2 * omega * omega * (omega * t).sin();
            let ay = -0.1 * 4.0 * omega * omega * (2.0 * omega * t).sin();
            Sample::new(
                Vector3::zeros(),
                Vector3::new(ax / STANDARD_GRAVITY, ay / STANDARD_GRAVITY, 1.0),
            )
        })
        .collect()
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trajectory=info,imu_tracker=info".into()),
        )
        .init();

    let samples = match std::env::args().nth(1) {
        Some(path) => {
            info!(%path, "loading recording");
            load_recording(&path)?
        }
        None => {
            info!("no recording given, synthesizing a figure of eight");
            synthesize(30.0)
        }
    };

    if samples.is_empty() {
        return Err("recording contains no samples".into());
    }

    let estimator = PositionEstimator::with_settings(PositionSettings::with_sample_rate(SAMPLE_RATE))?;
    let trajectory = estimator.estimate(&samples);

    let angles = estimator.estimate_orientation(&samples).to_degrees();
    info!(
        samples = trajectory.len(),
        roll = angles.roll,
        pitch = angles.pitch,
        yaw = angles.yaw,
        "final orientation"
    );

    let time: Vec<f32> = (0..trajectory.len()).map(|n| n as f32 / SAMPLE_RATE).collect();
    let duration = time.last().copied().unwrap_or(0.0);

    let root = BitMapBackend::new("trajectory.png", (1000, 900)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((3, 1));

    for (axis, (panel, name)) in panels.iter().zip(["X", "Y", "Z"]).enumerate() {
        let filtered: Vec<f32> = trajectory.positions().iter().map(|p| p[axis]).collect();
        let raw: Vec<f32> = trajectory.position.iter().map(|p| p[axis]).collect();

        let bound = filtered
            .iter()
            .chain(raw.iter())
            .fold(0.01f32, |bound, value| bound.max(value.abs()));

        let mut chart = ChartBuilder::on(panel)
            .caption(format!("Position {name}"), ("sans-serif", 20))
            .margin(5)
            .x_label_area_size(30)
            .y_label_area_size(50)
            .build_cartesian_2d(0f32..duration, -bound..bound)?;

        chart
            .configure_mesh()
            .x_desc("Time (s)")
            .y_desc("Metres")
            .draw()?;

        chart
            .draw_series(LineSeries::new(
                time.iter().copied().zip(raw.iter().copied()),
                &BLUE,
            ))?
            .label("Integrated")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], BLUE));

        chart
            .draw_series(LineSeries::new(
                time.iter().copied().zip(filtered.iter().copied()),
                &RED,
            ))?
            .label("Drift corrected")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], RED));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    info!("plot saved to trajectory.png");

    Ok(())
}
