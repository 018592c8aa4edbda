use imu_tracker::{AttitudeEstimator, EstimatorSettings, QuaternionExt, UpdateOutcome};
use nalgebra::{UnitQuaternion, Vector3};

const EPSILON: f32 = 1e-5;

/// Earth-frame magnetic field with a downward inclination
fn earth_field() -> Vector3<f32> {
    Vector3::new(0.6, 0.0, -0.8)
}

/// Sensor-frame readings a stationary sensor at `truth` would produce
fn readings(truth: &UnitQuaternion<f32>) -> (Vector3<f32>, Vector3<f32>) {
    let accelerometer = truth.inverse_transform_vector(&Vector3::z());
    let magnetometer = truth.inverse_transform_vector(&earth_field());
    (accelerometer, magnetometer)
}

/// Test that a level, stationary sensor keeps the identity orientation
#[test]
fn test_stationary_imu_keeps_identity() {
    let mut estimator = AttitudeEstimator::new();

    for _ in 0..1000 {
        estimator.update_imu(Vector3::zeros(), Vector3::new(0.0, 0.0, 1.0));
    }

    let q = estimator.quaternion();
    assert!((q.w - 1.0).abs() < EPSILON);
    assert!(q.i.abs() < EPSILON);
    assert!(q.j.abs() < EPSILON);
    assert!(q.k.abs() < EPSILON);
}

/// Test that MARG mode converges on the orientation the readings describe
#[test]
fn test_marg_converges_to_true_orientation() {
    let truth = UnitQuaternion::from_euler_angles(0.3, -0.2, 0.5);
    let (accelerometer, magnetometer) = readings(&truth);

    let mut estimator = AttitudeEstimator::new();
    for _ in 0..5000 {
        estimator.update(Vector3::zeros(), accelerometer, magnetometer);
    }

    let error = estimator.quaternion().angle_to(&truth);
    assert!(error < 0.02, "residual error {error} rad");
}

/// Test that MARG mode pulls a wrong initial guess back to level and north
#[test]
fn test_marg_recovers_from_initial_error() {
    let mut estimator = AttitudeEstimator::new();
    estimator.set_quaternion(UnitQuaternion::from_euler_angles(0.4, 0.2, -0.6));

    let (accelerometer, magnetometer) = readings(&UnitQuaternion::identity());
    for _ in 0..5000 {
        estimator.update(Vector3::zeros(), accelerometer, magnetometer);
    }

    let angles = estimator.euler_angles();
    assert!(angles.roll.abs() < 0.02, "roll {}", angles.roll);
    assert!(angles.pitch.abs() < 0.02, "pitch {}", angles.pitch);
    assert!(angles.yaw.abs() < 0.02, "yaw {}", angles.yaw);
}

/// Test that IMU mode levels roll and pitch but leaves heading alone
#[test]
fn test_imu_levels_but_keeps_heading() {
    let mut estimator = AttitudeEstimator::new();
    let initial = UnitQuaternion::from_euler_angles(0.3, 0.0, 0.0);
    estimator.set_quaternion(initial);

    for _ in 0..5000 {
        estimator.update_imu(Vector3::zeros(), Vector3::z());
    }

    let angles = estimator.euler_angles();
    assert!(angles.roll.abs() < 0.02, "roll {}", angles.roll);
    assert!(angles.pitch.abs() < 0.02, "pitch {}", angles.pitch);
    assert!(angles.yaw.abs() < 0.05, "yaw {}", angles.yaw);
}

/// Test that a higher gain converges in fewer samples
#[test]
fn test_gain_controls_convergence_rate() {
    let truth = UnitQuaternion::from_euler_angles(0.5, 0.0, 0.0);
    let (accelerometer, _) = readings(&truth);

    let run = |beta: f32| {
        let mut estimator = AttitudeEstimator::with_settings(EstimatorSettings {
            beta,
            ..Default::default()
        })
        .unwrap();
        for _ in 0..200 {
            estimator.update_imu(Vector3::zeros(), accelerometer);
        }
        estimator.euler_angles().roll
    };

    let slow = run(0.05);
    let fast = run(0.5);
    assert!((fast - 0.5).abs() < (slow - 0.5).abs());
}

/// Test gyroscope integration at the configured sample period
#[test]
fn test_gyroscope_integration_uses_sample_period() {
    let settings = EstimatorSettings {
        sample_period: 0.01,
        beta: 0.0,
    };
    let mut estimator = AttitudeEstimator::with_settings(settings).unwrap();

    // One second about x at 0.5 rad/s. The x component keeps the gradient
    // non-zero for every pure roll, so no tick is skipped
    for _ in 0..100 {
        estimator.update_imu(Vector3::new(0.5, 0.0, 0.0), Vector3::new(0.1, 0.0, 1.0));
    }

    let angles = estimator.quaternion().to_euler();
    assert!((angles.roll - 0.5).abs() < 1e-3, "roll {}", angles.roll);
    assert!(angles.pitch.abs() < 1e-4);
    assert!(angles.yaw.abs() < 1e-4);
}

/// Test that a measurement matching the estimate skips the whole update
#[test]
fn test_zero_gradient_skips_gyroscope_integration() {
    let mut estimator = AttitudeEstimator::new();

    estimator.update_imu(Vector3::new(0.0, 0.0, 1.0), Vector3::z());

    assert_eq!(estimator.last_update(), UpdateOutcome::SkippedGradient);
    let q = estimator.quaternion();
    assert_eq!((q.w, q.i, q.j, q.k), (1.0, 0.0, 0.0, 0.0));

    // Tilting the reading away from the estimate resumes integration
    estimator.update_imu(Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 0.1, 1.0));
    assert_eq!(estimator.last_update(), UpdateOutcome::Corrected);
    assert!(estimator.euler_angles().yaw > 0.0);
}

/// Test that degenerate readings leave the estimate untouched
#[test]
fn test_degenerate_readings_are_skipped() {
    let mut estimator = AttitudeEstimator::new();
    let seeded = UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3);
    estimator.set_quaternion(seeded);

    estimator.update_imu(Vector3::new(1.0, 1.0, 1.0), Vector3::zeros());
    assert_eq!(estimator.last_update(), UpdateOutcome::SkippedAccelerometer);

    estimator.update(Vector3::new(1.0, 1.0, 1.0), Vector3::z(), Vector3::zeros());
    assert_eq!(estimator.last_update(), UpdateOutcome::SkippedMagnetometer);

    assert_eq!(estimator.quaternion(), seeded);

    estimator.update(Vector3::zeros(), Vector3::z(), Vector3::x());
    assert_ne!(estimator.last_update(), UpdateOutcome::SkippedMagnetometer);
}
