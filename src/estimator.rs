//! Gradient-descent attitude estimator
//!
//! Madgwick's orientation filter: the gyroscope rate is integrated into a
//! quaternion, and one normalized gradient-descent step per sample pulls the
//! estimate towards the orientation that best explains the measured gravity
//! (and, in MARG mode, magnetic field) directions.

use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use tracing::{trace, warn};

use crate::error::Result;
use crate::math::{Vector3Ext, normalize_quaternion};
use crate::orientation::{EulerAngles, to_euler};
use crate::sample::Sample;
use crate::types::EstimatorSettings;

/// What the most recent update did to the quaternion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No update has run yet
    None,
    /// Gyroscope integration plus a gradient-descent correction
    Corrected,
    /// The accelerometer reading had zero or non-finite magnitude; quaternion retained
    SkippedAccelerometer,
    /// The magnetometer reading had zero or non-finite magnitude; quaternion retained
    SkippedMagnetometer,
    /// The objective gradient had zero magnitude; quaternion retained
    SkippedGradient,
    /// The gyroscope rate was not finite; quaternion retained
    SkippedGyroscope,
}

/// Madgwick attitude estimator
///
/// Owns the orientation quaternion for one estimation session. Feed samples
/// in chronological order at the configured sample period.
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use imu_tracker::AttitudeEstimator;
///
/// let mut estimator = AttitudeEstimator::new();
///
/// let gyroscope = Vector3::new(0.0, 0.0, 0.1);     // rad/s
/// let accelerometer = Vector3::new(0.0, 0.0, 1.0); // g
/// let magnetometer = Vector3::new(0.6, 0.0, -0.8); // any consistent unit
///
/// estimator.update(gyroscope, accelerometer, magnetometer);
/// let quaternion = estimator.quaternion();
/// assert!((quaternion.norm() - 1.0).abs() < 1e-5);
/// ```
#[derive(Debug, Clone)]
pub struct AttitudeEstimator {
    settings: EstimatorSettings,
    quaternion: UnitQuaternion<f32>,
    last_update: UpdateOutcome,
}

impl AttitudeEstimator {
    /// Create an estimator with default settings (256 Hz, beta 0.1)
    pub fn new() -> Self {
        Self {
            settings: EstimatorSettings::default(),
            quaternion: UnitQuaternion::identity(),
            last_update: UpdateOutcome::None,
        }
    }

    /// Create an estimator with the given settings
    pub fn with_settings(settings: EstimatorSettings) -> Result<Self> {
        if let Err(error) = settings.validate() {
            warn!(%error, "rejected estimator settings");
            return Err(error);
        }

        Ok(Self::from_validated(settings))
    }

    pub(crate) fn from_validated(settings: EstimatorSettings) -> Self {
        Self {
            settings,
            ..Self::new()
        }
    }

    /// Reset the orientation to identity
    pub fn reset(&mut self) {
        self.quaternion = UnitQuaternion::identity();
        self.last_update = UpdateOutcome::None;
    }

    /// Current settings
    pub fn settings(&self) -> EstimatorSettings {
        self.settings
    }

    /// Replace the settings, keeping the current orientation
    pub fn set_settings(&mut self, settings: EstimatorSettings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    /// Current orientation
    pub fn quaternion(&self) -> UnitQuaternion<f32> {
        self.quaternion
    }

    /// Overwrite the orientation, e.g. to seed the estimate
    pub fn set_quaternion(&mut self, quaternion: UnitQuaternion<f32>) {
        self.quaternion = quaternion;
    }

    /// Current orientation as yaw, roll and pitch in radians
    pub fn euler_angles(&self) -> EulerAngles {
        to_euler(&self.quaternion)
    }

    /// Outcome of the most recent update
    pub fn last_update(&self) -> UpdateOutcome {
        self.last_update
    }

    /// Update with whatever the sample carries
    ///
    /// Uses MARG mode when the sample has a magnetometer reading and IMU mode
    /// otherwise.
    pub fn update_sample(&mut self, sample: &Sample) {
        match sample.magnetometer {
            Some(magnetometer) => self.update(sample.gyroscope, sample.accelerometer, magnetometer),
            None => self.update_imu(sample.gyroscope, sample.accelerometer),
        }
    }

    /// MARG update from gyroscope, accelerometer and magnetometer
    ///
    /// # Arguments
    /// * `gyroscope` - Angular rate in rad/s
    /// * `accelerometer` - Accelerometer reading in any consistent unit
    /// * `magnetometer` - Magnetometer reading in any consistent unit
    ///
    /// A zero accelerometer or magnetometer reading, or a zero gradient,
    /// skips the update and retains the previous quaternion.
    pub fn update(
        &mut self,
        gyroscope: Vector3<f32>,
        accelerometer: Vector3<f32>,
        magnetometer: Vector3<f32>,
    ) {
        let Some(a) = accelerometer.normalize_nonzero() else {
            trace!("degenerate accelerometer magnitude, skipping update");
            self.last_update = UpdateOutcome::SkippedAccelerometer;
            return;
        };
        let Some(m) = magnetometer.normalize_nonzero() else {
            trace!("degenerate magnetometer magnitude, skipping update");
            self.last_update = UpdateOutcome::SkippedMagnetometer;
            return;
        };

        let q = self.quaternion.quaternion();
        let (q1, q2, q3, q4) = (q.w, q.i, q.j, q.k);

        // Auxiliary variables to avoid repeated arithmetic
        let two_q1 = 2.0 * q1;
        let two_q2 = 2.0 * q2;
        let two_q3 = 2.0 * q3;
        let two_q4 = 2.0 * q4;
        let two_q1q3 = 2.0 * q1 * q3;
        let two_q3q4 = 2.0 * q3 * q4;
        let q1q1 = q1 * q1;
        let q1q2 = q1 * q2;
        let q1q3 = q1 * q3;
        let q1q4 = q1 * q4;
        let q2q2 = q2 * q2;
        let q2q3 = q2 * q3;
        let q2q4 = q2 * q4;
        let q3q3 = q3 * q3;
        let q3q4 = q3 * q4;
        let q4q4 = q4 * q4;

        // Reference direction of Earth's magnetic field, rotated into the
        // Earth frame and folded onto the x-z plane
        let two_q1mx = 2.0 * q1 * m.x;
        let two_q1my = 2.0 * q1 * m.y;
        let two_q1mz = 2.0 * q1 * m.z;
        let two_q2mx = 2.0 * q2 * m.x;
        let hx = m.x * q1q1 - two_q1my * q4 + two_q1mz * q3 + m.x * q2q2 + two_q2 * m.y * q3
            + two_q2 * m.z * q4
            - m.x * q3q3
            - m.x * q4q4;
        let hy = two_q1mx * q4 + m.y * q1q1 - two_q1mz * q2 + two_q2mx * q3 - m.y * q2q2
            + m.y * q3q3
            + two_q3 * m.z * q4
            - m.y * q4q4;
        let hz = -two_q1mx * q3 + two_q1my * q2 + m.z * q1q1 + two_q2mx * q4 - m.z * q2q2
            + two_q3 * m.y * q4
            - m.z * q3q3
            + m.z * q4q4;
        // Reference field b = (bx, 0, bz) with |b| = |m|, so the objective
        // vanishes at the true orientation
        let two_bx = 2.0 * (hx * hx + hy * hy).sqrt();
        let two_bz = 2.0 * hz;
        let four_bx = 2.0 * two_bx;
        let four_bz = 2.0 * two_bz;

        // Objective function: predicted minus measured gravity and field
        let f1 = 2.0 * q2q4 - two_q1q3 - a.x;
        let f2 = 2.0 * q1q2 + two_q3q4 - a.y;
        let f3 = 1.0 - 2.0 * q2q2 - 2.0 * q3q3 - a.z;
        let f4 = two_bx * (0.5 - q3q3 - q4q4) + two_bz * (q2q4 - q1q3) - m.x;
        let f5 = two_bx * (q2q3 - q1q4) + two_bz * (q1q2 + q3q4) - m.y;
        let f6 = two_bx * (q1q3 + q2q4) + two_bz * (0.5 - q2q2 - q3q3) - m.z;

        // Gradient: Jacobian transpose times objective
        let s1 = -two_q3 * f1 + two_q2 * f2 - two_bz * q3 * f4
            + (-two_bx * q4 + two_bz * q2) * f5
            + two_bx * q3 * f6;
        let s2 = two_q4 * f1 + two_q1 * f2 - 4.0 * q2 * f3
            + two_bz * q4 * f4
            + (two_bx * q3 + two_bz * q1) * f5
            + (two_bx * q4 - four_bz * q2) * f6;
        let s3 = -two_q1 * f1 + two_q4 * f2 - 4.0 * q3 * f3
            + (-four_bx * q3 - two_bz * q1) * f4
            + (two_bx * q2 + two_bz * q4) * f5
            + (two_bx * q1 - four_bz * q3) * f6;
        let s4 = two_q2 * f1 + two_q3 * f2
            + (-four_bx * q4 + two_bz * q2) * f4
            + (-two_bx * q1 + two_bz * q3) * f5
            + two_bx * q2 * f6;

        self.integrate(gyroscope, Quaternion::new(s1, s2, s3, s4));
    }

    /// IMU update from gyroscope and accelerometer only
    ///
    /// Heading is unobservable without a magnetometer and follows the
    /// gyroscope alone. The integration step is scaled by the sample period
    /// and renormalized exactly as in MARG mode.
    ///
    /// A zero accelerometer reading or a zero gradient skips the update and
    /// retains the previous quaternion. A level sensor turning purely about
    /// the vertical axis has an exactly zero gradient, so its heading holds
    /// until the accelerometer disagrees with the estimate.
    pub fn update_imu(&mut self, gyroscope: Vector3<f32>, accelerometer: Vector3<f32>) {
        let Some(a) = accelerometer.normalize_nonzero() else {
            trace!("degenerate accelerometer magnitude, skipping update");
            self.last_update = UpdateOutcome::SkippedAccelerometer;
            return;
        };

        let q = self.quaternion.quaternion();
        let (q1, q2, q3, q4) = (q.w, q.i, q.j, q.k);

        let two_q1 = 2.0 * q1;
        let two_q2 = 2.0 * q2;
        let two_q3 = 2.0 * q3;
        let two_q4 = 2.0 * q4;
        let four_q1 = 4.0 * q1;
        let four_q2 = 4.0 * q2;
        let four_q3 = 4.0 * q3;
        let eight_q2 = 8.0 * q2;
        let eight_q3 = 8.0 * q3;
        let q1q1 = q1 * q1;
        let q2q2 = q2 * q2;
        let q3q3 = q3 * q3;
        let q4q4 = q4 * q4;

        let s1 = four_q1 * q3q3 + two_q3 * a.x + four_q1 * q2q2 - two_q2 * a.y;
        let s2 = four_q2 * q4q4 - two_q4 * a.x + 4.0 * q1q1 * q2 - two_q1 * a.y - four_q2
            + eight_q2 * q2q2
            + eight_q2 * q3q3
            + four_q2 * a.z;
        let s3 = 4.0 * q1q1 * q3 + two_q1 * a.x + four_q3 * q4q4 - two_q4 * a.y - four_q3
            + eight_q3 * q2q2
            + eight_q3 * q3q3
            + four_q3 * a.z;
        let s4 = 4.0 * q2q2 * q4 - two_q2 * a.x + 4.0 * q3q3 * q4 - two_q3 * a.y;

        self.integrate(gyroscope, Quaternion::new(s1, s2, s3, s4));
    }

    /// Apply `q̇ = ½·q⊗ω − β·∇f/|∇f|` for one sample period and renormalize
    fn integrate(&mut self, gyroscope: Vector3<f32>, gradient: Quaternion<f32>) {
        let Some(correction) = normalize_quaternion(gradient) else {
            trace!("zero gradient magnitude, skipping update");
            self.last_update = UpdateOutcome::SkippedGradient;
            return;
        };

        let q = *self.quaternion.quaternion();
        let omega = Quaternion::from_parts(0.0, gyroscope);
        let q_dot = q * omega * 0.5 - correction * self.settings.beta;

        let integrated = q + q_dot * self.settings.sample_period;

        // Renormalize every tick; only a non-finite rate leaves nothing to normalize
        match normalize_quaternion(integrated) {
            Some(normalized) => {
                self.quaternion = UnitQuaternion::new_unchecked(normalized);
                self.last_update = UpdateOutcome::Corrected;
            }
            None => {
                trace!("non-finite gyroscope rate, skipping update");
                self.last_update = UpdateOutcome::SkippedGyroscope;
            }
        }
    }
}

impl Default for AttitudeEstimator {
    fn default() -> Self {
        Self::new()
    }
}
