//! Mathematical utilities and nalgebra extensions

use nalgebra::{Quaternion, UnitQuaternion, Vector3};

use crate::orientation::{EulerAngles, to_euler};

/// Mathematical constants
pub const DEG_TO_RAD: f32 = core::f32::consts::PI / 180.0;
pub const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

/// Extension trait for Vector3 operations
pub trait Vector3Ext {
    /// Normalize the vector, or `None` if its magnitude is zero or not finite
    fn normalize_nonzero(&self) -> Option<Vector3<f32>>;

    /// Convert degrees to radians
    fn deg_to_rad(&self) -> Vector3<f32>;

    /// Convert radians to degrees
    fn rad_to_deg(&self) -> Vector3<f32>;
}

impl Vector3Ext for Vector3<f32> {
    fn normalize_nonzero(&self) -> Option<Vector3<f32>> {
        let norm = self.norm();
        if norm == 0.0 || !norm.is_finite() { None } else { Some(*self / norm) }
    }

    fn deg_to_rad(&self) -> Vector3<f32> {
        *self * DEG_TO_RAD
    }

    fn rad_to_deg(&self) -> Vector3<f32> {
        *self * RAD_TO_DEG
    }
}

/// Normalize a raw 4-component quaternion, or `None` if its norm is zero or not finite
pub(crate) fn normalize_quaternion(q: Quaternion<f32>) -> Option<Quaternion<f32>> {
    let norm = q.norm();
    if norm == 0.0 || !norm.is_finite() { None } else { Some(q / norm) }
}

/// Extension trait for UnitQuaternion operations
pub trait QuaternionExt {
    /// Convert to yaw, roll and pitch in radians
    fn to_euler(&self) -> EulerAngles;

    /// Create a quaternion from yaw, roll and pitch in radians
    fn from_euler(angles: EulerAngles) -> UnitQuaternion<f32>;
}

impl QuaternionExt for UnitQuaternion<f32> {
    fn to_euler(&self) -> EulerAngles {
        to_euler(self)
    }

    fn from_euler(angles: EulerAngles) -> UnitQuaternion<f32> {
        UnitQuaternion::from_euler_angles(angles.roll, angles.pitch, angles.yaw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_extensions() {
        let v = Vector3::new(3.0f32, 4.0, 0.0);
        let normalized = v.normalize_nonzero().unwrap();
        assert!((normalized.norm() - 1.0).abs() < 1e-6);
        assert!((normalized.x - 0.6).abs() < 1e-6);

        assert!(Vector3::<f32>::zeros().normalize_nonzero().is_none());
    }

    #[test]
    fn test_non_finite_magnitude_is_rejected() {
        // Squares overflow, so the norm is infinite
        let huge = Vector3::new(f32::MAX, f32::MAX, 0.0);
        assert!(huge.normalize_nonzero().is_none());
        assert!(Vector3::new(f32::NAN, 0.0, 1.0).normalize_nonzero().is_none());

        let q = Quaternion::new(f32::INFINITY, 0.0, 0.0, 0.0);
        assert!(normalize_quaternion(q).is_none());
    }

    #[test]
    fn test_degree_conversion() {
        let degrees = Vector3::new(180.0f32, 90.0, -45.0);
        let radians = degrees.deg_to_rad();
        assert!((radians.x - core::f32::consts::PI).abs() < 1e-6);
        assert!((radians.y - core::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!((radians.rad_to_deg() - degrees).norm() < 1e-4);
    }

    #[test]
    fn test_quaternion_normalization() {
        let q = Quaternion::new(2.0f32, 0.0, 0.0, 0.0);
        assert_eq!(normalize_quaternion(q), Some(Quaternion::identity()));
        assert!(normalize_quaternion(Quaternion::new(0.0, 0.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_quaternion_euler_conversion() {
        let angles = EulerAngles {
            yaw: 0.3,
            roll: -0.2,
            pitch: 0.1,
        };
        let recovered = UnitQuaternion::from_euler(angles).to_euler();

        assert!((recovered.yaw - angles.yaw).abs() < 1e-5);
        assert!((recovered.roll - angles.roll).abs() < 1e-5);
        assert!((recovered.pitch - angles.pitch).abs() < 1e-5);
    }
}
