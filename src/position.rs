//! Drift-corrected position estimation over a recorded sample sequence
//!
//! The pipeline tracks orientation, rotates each accelerometer reading into
//! the Earth frame, removes gravity, and integrates twice. Each integration
//! stage is followed by a per-axis high-pass filter that removes the
//! low-frequency drift integration accumulates.

use nalgebra::{Matrix3, UnitQuaternion, Vector3};
use tracing::{debug, warn};

use crate::error::Result;
use crate::estimator::AttitudeEstimator;
use crate::filter::RecursiveFilter;
use crate::orientation::{EulerAngles, rotation_matrix, to_euler};
use crate::sample::Sample;
use crate::types::{FilterSettings, PositionSettings};

impl PositionSettings {
    /// Settings for data sampled at `sample_rate` Hz
    ///
    /// Sets the estimator period to `1 / sample_rate` and runs both drift
    /// filters at the same rate, so their 0.1 Hz cutoff is in real time
    /// rather than in cycles per sample.
    pub fn with_sample_rate(sample_rate: f32) -> Self {
        let drift = FilterSettings {
            sample_rate,
            ..FilterSettings::high_pass_drift()
        };
        let mut settings = Self {
            velocity_filter: drift,
            position_filter: drift,
            ..Self::default()
        };
        settings.estimator.sample_period = 1.0 / sample_rate;
        settings
    }
}

/// Every intermediate buffer of one pipeline run, one entry per input sample
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    /// Orientation after each sample
    pub orientations: Vec<UnitQuaternion<f32>>,
    /// Sensor-to-Earth rotation matrix after each sample
    pub rotations: Vec<Matrix3<f32>>,
    /// Accelerometer reading rotated into the Earth frame, in g
    pub tilt_compensated: Vec<Vector3<f32>>,
    /// Earth-frame acceleration with gravity removed, in m/s²
    pub acceleration: Vec<Vector3<f32>>,
    /// Integrated velocity before drift removal
    pub velocity: Vec<Vector3<f32>>,
    /// Velocity after the high-pass stage
    pub filtered_velocity: Vec<Vector3<f32>>,
    /// Integrated position before drift removal
    pub position: Vec<Vector3<f32>>,
    /// Position after the high-pass stage
    pub filtered_position: Vec<Vector3<f32>>,
}

impl Trajectory {
    /// Final drift-corrected positions
    pub fn positions(&self) -> &[Vector3<f32>] {
        &self.filtered_position
    }

    /// Number of samples the trajectory covers
    pub fn len(&self) -> usize {
        self.filtered_position.len()
    }

    /// Whether the trajectory was computed from an empty sequence
    pub fn is_empty(&self) -> bool {
        self.filtered_position.is_empty()
    }
}

/// Batch position estimator
///
/// Each call to [`estimate`](Self::estimate) starts from identity orientation
/// and fresh filters; nothing carries over between calls.
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use imu_tracker::{PositionEstimator, Sample};
///
/// let estimator = PositionEstimator::new();
/// let at_rest = vec![Sample::new(Vector3::zeros(), Vector3::new(0.0, 0.0, 1.0)); 100];
///
/// let trajectory = estimator.estimate(&at_rest);
/// assert_eq!(trajectory.len(), 100);
/// assert!(trajectory.positions().iter().all(|p| p.norm() < 1e-6));
/// ```
#[derive(Debug, Clone)]
pub struct PositionEstimator {
    settings: PositionSettings,
    estimator: AttitudeEstimator,
    velocity_filter: RecursiveFilter,
    position_filter: RecursiveFilter,
}

impl PositionEstimator {
    /// Create an estimator with the reference settings
    pub fn new() -> Self {
        Self::from_validated(PositionSettings::default())
    }

    /// Create an estimator with the given settings
    pub fn with_settings(settings: PositionSettings) -> Result<Self> {
        if let Err(error) = settings.validate() {
            warn!(%error, "rejected position settings");
            return Err(error);
        }
        Ok(Self::from_validated(settings))
    }

    fn from_validated(settings: PositionSettings) -> Self {
        // Prototypes are never updated; each run clones them for fresh history
        Self {
            settings,
            estimator: AttitudeEstimator::from_validated(settings.estimator),
            velocity_filter: RecursiveFilter::from_validated(settings.velocity_filter),
            position_filter: RecursiveFilter::from_validated(settings.position_filter),
        }
    }

    /// Settings every run uses
    pub fn settings(&self) -> PositionSettings {
        self.settings
    }

    /// Run the full pipeline over `samples`
    ///
    /// Samples must be in chronological order at the configured sample
    /// period. Index 0 of every integrated buffer is zero.
    pub fn estimate(&self, samples: &[Sample]) -> Trajectory {
        debug!(samples = samples.len(), "estimating position trajectory");

        let orientations = self.track_orientation(samples);
        let rotations: Vec<Matrix3<f32>> = orientations.iter().map(rotation_matrix).collect();

        let tilt_compensated: Vec<Vector3<f32>> = rotations
            .iter()
            .zip(samples)
            .map(|(rotation, sample)| rotation * sample.accelerometer)
            .collect();

        let acceleration: Vec<Vector3<f32>> = tilt_compensated
            .iter()
            .map(|earth| (earth - Vector3::z()) * self.settings.gravity)
            .collect();

        let period = self.settings.estimator.sample_period;
        let velocity = integrate(&acceleration, period);
        let filtered_velocity = filter_axes(&self.velocity_filter, &velocity);
        let position = integrate(&filtered_velocity, period);
        let filtered_position = filter_axes(&self.position_filter, &position);

        if let Some(last) = filtered_position.last() {
            debug!(x = last.x, y = last.y, z = last.z, "final position");
        }

        Trajectory {
            orientations,
            rotations,
            tilt_compensated,
            acceleration,
            velocity,
            filtered_velocity,
            position,
            filtered_position,
        }
    }

    /// Orientation after the last sample, as Euler angles
    ///
    /// Identity for an empty sequence.
    pub fn estimate_orientation(&self, samples: &[Sample]) -> EulerAngles {
        let mut estimator = self.fresh_estimator();
        for sample in samples {
            estimator.update_sample(sample);
        }
        to_euler(&estimator.quaternion())
    }

    fn track_orientation(&self, samples: &[Sample]) -> Vec<UnitQuaternion<f32>> {
        let mut estimator = self.fresh_estimator();
        samples
            .iter()
            .map(|sample| {
                estimator.update_sample(sample);
                estimator.quaternion()
            })
            .collect()
    }

    fn fresh_estimator(&self) -> AttitudeEstimator {
        let mut estimator = self.estimator.clone();
        estimator.reset();
        estimator
    }
}

impl Default for PositionEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Forward-Euler cumulative sum, pinned to zero at index 0
fn integrate(signal: &[Vector3<f32>], period: f32) -> Vec<Vector3<f32>> {
    let mut integrated = Vec::with_capacity(signal.len());
    let mut sum = Vector3::zeros();
    for (index, value) in signal.iter().enumerate() {
        if index > 0 {
            sum += value * period;
        }
        integrated.push(sum);
    }
    integrated
}

/// Filter each axis through its own copy of `prototype`
fn filter_axes(prototype: &RecursiveFilter, signal: &[Vector3<f32>]) -> Vec<Vector3<f32>> {
    let mut filtered = vec![Vector3::zeros(); signal.len()];
    for axis in 0..3 {
        let channel: Vec<f32> = signal.iter().map(|value| value[axis]).collect();
        let output = prototype.clone().filter_signal(&channel);
        for (target, value) in filtered.iter_mut().zip(output) {
            target[axis] = value;
        }
    }
    filtered
}
