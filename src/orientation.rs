//! Conversions from an orientation quaternion to Euler angles and rotation matrices
//!
//! The quaternion components are read as `q1 = w`, `q2 = i`, `q3 = j`,
//! `q4 = k`. Every function here is pure.

use nalgebra::{Matrix3, UnitQuaternion};

use crate::math::RAD_TO_DEG;

/// Euler angles in radians, Z-Y-X (yaw, pitch, roll) rotation order
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EulerAngles {
    /// Rotation about the Z axis
    pub yaw: f32,
    /// Rotation about the X axis
    pub roll: f32,
    /// Rotation about the Y axis
    pub pitch: f32,
}

impl EulerAngles {
    /// Convert every angle to degrees
    pub fn to_degrees(&self) -> EulerAngles {
        EulerAngles {
            yaw: self.yaw * RAD_TO_DEG,
            roll: self.roll * RAD_TO_DEG,
            pitch: self.pitch * RAD_TO_DEG,
        }
    }

    /// Convert every angle to degrees wrapped into `[0, 360)`
    ///
    /// Display layers that drive an object's transform usually expect this
    /// range rather than `(-180, 180]`.
    pub fn to_heading_degrees(&self) -> EulerAngles {
        let degrees = self.to_degrees();
        EulerAngles {
            yaw: wrap_degrees(degrees.yaw),
            roll: wrap_degrees(degrees.roll),
            pitch: wrap_degrees(degrees.pitch),
        }
    }
}

fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negative angles up to exactly 360
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Convert a quaternion to yaw, roll and pitch
///
/// The pitch term passes through `asin`, whose argument is clamped to
/// `[-1, 1]`: rounding near gimbal lock can push it just outside the domain.
///
/// # Example
/// ```
/// use nalgebra::UnitQuaternion;
/// use imu_tracker::to_euler;
///
/// let q = UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3);
/// let angles = to_euler(&q);
/// assert!((angles.roll - 0.1).abs() < 1e-5);
/// assert!((angles.pitch - 0.2).abs() < 1e-5);
/// assert!((angles.yaw - 0.3).abs() < 1e-5);
/// ```
pub fn to_euler(quaternion: &UnitQuaternion<f32>) -> EulerAngles {
    let q = quaternion.quaternion();
    let (q1, q2, q3, q4) = (q.w, q.i, q.j, q.k);

    let yaw = (2.0 * (q1 * q4 + q2 * q3)).atan2(1.0 - 2.0 * (q3 * q3 + q4 * q4));
    let roll = (2.0 * (q1 * q2 + q3 * q4)).atan2(1.0 - 2.0 * (q2 * q2 + q3 * q3));
    let pitch = (2.0 * (q1 * q3 - q4 * q2)).clamp(-1.0, 1.0).asin();

    EulerAngles { yaw, roll, pitch }
}

/// One entry of the rotation matrix for `quaternion`
///
/// Rows and columns are 0-based. The matrix rotates sensor-frame vectors into
/// the Earth frame, so `R · a` tilt-compensates an accelerometer reading.
/// Each entry is computed independently from the four components.
///
/// Returns `None` if `row` or `col` is greater than 2.
///
/// # Example
/// ```
/// use nalgebra::UnitQuaternion;
/// use imu_tracker::rotation_matrix_entry;
///
/// let q = UnitQuaternion::identity();
/// assert_eq!(rotation_matrix_entry(&q, 2, 2), Some(1.0));
/// assert_eq!(rotation_matrix_entry(&q, 0, 3), None);
/// ```
pub fn rotation_matrix_entry(
    quaternion: &UnitQuaternion<f32>,
    row: usize,
    col: usize,
) -> Option<f32> {
    let q = quaternion.quaternion();
    let (q1, q2, q3, q4) = (q.w, q.i, q.j, q.k);

    match (row, col) {
        (0, 0) => Some(2.0 * q1 * q1 - 1.0 + 2.0 * q2 * q2),
        (0, 1) => Some(2.0 * (q2 * q3 - q1 * q4)),
        (0, 2) => Some(2.0 * (q2 * q4 + q1 * q3)),
        (1, 0) => Some(2.0 * (q2 * q3 + q1 * q4)),
        (1, 1) => Some(2.0 * q1 * q1 - 1.0 + 2.0 * q3 * q3),
        (1, 2) => Some(2.0 * (q3 * q4 - q1 * q2)),
        (2, 0) => Some(2.0 * (q2 * q4 - q1 * q3)),
        (2, 1) => Some(2.0 * (q3 * q4 + q1 * q2)),
        (2, 2) => Some(2.0 * q1 * q1 - 1.0 + 2.0 * q4 * q4),
        _ => None,
    }
}

/// Full 3×3 rotation matrix, assembled from [`rotation_matrix_entry`]
pub fn rotation_matrix(quaternion: &UnitQuaternion<f32>) -> Matrix3<f32> {
    // from_fn only visits indices inside the 3×3 range
    Matrix3::from_fn(|row, col| rotation_matrix_entry(quaternion, row, col).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Quaternion, Vector3};

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_identity_conversions() {
        let q = UnitQuaternion::identity();
        assert_eq!(to_euler(&q), EulerAngles::default());
        assert!((rotation_matrix(&q) - Matrix3::identity()).norm() < EPSILON);
    }

    #[test]
    fn test_euler_round_trip() {
        let cases = [
            (0.1f32, 0.2f32, 0.3f32),
            (-0.4, 0.3, 1.2),
            (0.7, -0.5, -2.5),
            (0.0, 0.0, 3.0),
        ];

        for (roll, pitch, yaw) in cases {
            let q = UnitQuaternion::from_euler_angles(roll, pitch, yaw);
            let angles = to_euler(&q);

            assert!((angles.roll - roll).abs() < EPSILON, "roll {} vs {}", angles.roll, roll);
            assert!((angles.pitch - pitch).abs() < EPSILON, "pitch {} vs {}", angles.pitch, pitch);
            assert!((angles.yaw - yaw).abs() < EPSILON, "yaw {} vs {}", angles.yaw, yaw);
        }
    }

    #[test]
    fn test_pitch_clamped_at_gimbal_lock() {
        // Slightly non-unit on purpose: the asin argument lands above 1
        let raw = Quaternion::new(0.7072, 0.0, 0.7072, 0.0);
        let q = UnitQuaternion::new_unchecked(raw);
        let angles = to_euler(&q);

        assert!(!angles.pitch.is_nan());
        assert!((angles.pitch - core::f32::consts::FRAC_PI_2).abs() < 1e-3);
    }

    #[test]
    fn test_rotation_matrix_matches_nalgebra() {
        let q = UnitQuaternion::from_euler_angles(0.3, -0.6, 1.1);
        let expected = q.to_rotation_matrix();

        for row in 0..3 {
            for col in 0..3 {
                let entry = rotation_matrix_entry(&q, row, col).unwrap();
                assert!(
                    (entry - expected[(row, col)]).abs() < EPSILON,
                    "entry ({row}, {col}): {entry} vs {}",
                    expected[(row, col)]
                );
            }
        }
    }

    #[test]
    fn test_rotation_matrix_entries_are_independent() {
        let q = UnitQuaternion::from_euler_angles(0.2, 0.4, -0.9);
        let matrix = rotation_matrix(&q);

        // Orthonormal: every entry carries its own term
        assert!((matrix * matrix.transpose() - Matrix3::identity()).norm() < 1e-5);
        assert!((matrix.determinant() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_rotation_matrix_levels_gravity() {
        // Tilted sensor at rest reads gravity in its own frame
        let q = UnitQuaternion::from_euler_angles(0.5, -0.3, 0.8);
        let sensor_gravity = q.inverse() * Vector3::z();

        let earth = rotation_matrix(&q) * sensor_gravity;
        assert!((earth - Vector3::z()).norm() < EPSILON);
    }

    #[test]
    fn test_rotation_matrix_entry_out_of_range() {
        let q = UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3);
        assert_eq!(rotation_matrix_entry(&q, 3, 0), None);
        assert_eq!(rotation_matrix_entry(&q, 1, 7), None);
        assert!(rotation_matrix_entry(&q, 2, 2).is_some());
    }

    #[test]
    fn test_heading_degrees_wrap() {
        let angles = EulerAngles {
            yaw: -core::f32::consts::FRAC_PI_2,
            roll: core::f32::consts::FRAC_PI_4,
            pitch: -1e-9,
        };
        let heading = angles.to_heading_degrees();

        assert!((heading.yaw - 270.0).abs() < 1e-3);
        assert!((heading.roll - 45.0).abs() < 1e-3);
        assert!(heading.pitch >= 0.0 && heading.pitch < 360.0);
    }
}
