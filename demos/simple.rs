use imu_tracker::{AttitudeEstimator, EstimatorSettings};
use nalgebra::Vector3;

const SAMPLE_PERIOD: f32 = 0.01; // 10 ms sample period

fn main() {
    let settings = EstimatorSettings {
        sample_period: SAMPLE_PERIOD,
        ..Default::default()
    };
    let Ok(mut estimator) = AttitudeEstimator::with_settings(settings) else {
        eprintln!("invalid estimator settings");
        return;
    };

    for _ in 0..10 {
        // this loop should repeat each time new gyroscope data is available
        let gyroscope = Vector3::new(0.0, 0.0, 0.0); // replace this with actual gyroscope data in rad/s
        let accelerometer = Vector3::new(0.0, 0.0, 1.0); // replace this with actual accelerometer data in g

        estimator.update_imu(gyroscope, accelerometer);

        let angles = estimator.euler_angles().to_degrees();

        println!(
            "Roll: {:.2}, Pitch: {:.2}, Yaw: {:.2}",
            angles.roll, angles.pitch, angles.yaw
        );
    }
}
