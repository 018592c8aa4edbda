//! IMU tracker - orientation and drift-corrected position from inertial samples
//!
//! This crate fuses gyroscope, accelerometer and (optionally) magnetometer
//! samples into an orientation quaternion with Madgwick's gradient-descent
//! filter, and turns a recorded sample sequence into a position trajectory by
//! tilt compensation, gravity removal and double integration with high-pass
//! drift removal after each integration stage.
//!
//! # Features
//!
//! - MARG (9-axis) and IMU (6-axis) gradient-descent attitude estimation
//! - Quaternion to Euler angle and rotation matrix conversion
//! - Second-order recursive low-pass/high-pass filters
//! - Batch position estimation with per-axis drift removal
//! - Parsing of comma-separated acquisition records
//!
//! # Quick Start
//!
//! ```rust
//! use nalgebra::Vector3;
//! use imu_tracker::{AttitudeEstimator, PositionEstimator, Sample};
//!
//! let mut estimator = AttitudeEstimator::new();
//!
//! // Sensor readings
//! let gyroscope = Vector3::new(0.01, 0.02, 0.03);   // rad/s
//! let accelerometer = Vector3::new(0.0, 0.0, 1.0);  // g
//!
//! estimator.update_imu(gyroscope, accelerometer);
//! let angles = estimator.euler_angles();
//!
//! // Position over a whole recording
//! let samples = vec![Sample::new(gyroscope, accelerometer); 256];
//! let trajectory = PositionEstimator::new().estimate(&samples);
//! assert_eq!(trajectory.positions().len(), 256);
//! ```
//!
//! Nothing in the numerical core returns an error: degenerate readings are
//! skipped and recorded in [`AttitudeEstimator::last_update`]. Errors come
//! only from rejected settings and malformed acquisition records.

mod error;
mod estimator;
mod filter;
mod math;
mod orientation;
mod position;
mod sample;
mod types;

// Re-export all public types and functions
pub use error::{Error, Result};
pub use estimator::{AttitudeEstimator, UpdateOutcome};
pub use filter::{FilterCoefficients, History, RecursiveFilter};
pub use math::{DEG_TO_RAD, QuaternionExt, RAD_TO_DEG, Vector3Ext};
pub use orientation::{EulerAngles, rotation_matrix, rotation_matrix_entry, to_euler};
pub use position::{PositionEstimator, Trajectory};
pub use sample::Sample;
pub use types::*;
