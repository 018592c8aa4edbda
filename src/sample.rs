//! Inertial samples and parsing of comma-separated acquisition records

use core::str::FromStr;

use nalgebra::Vector3;

use crate::error::Error;
use crate::math::Vector3Ext;

/// One observation from the sensor package
///
/// The gyroscope is in rad/s. Accelerometer and magnetometer units are
/// arbitrary as long as they stay consistent; both are normalized before use.
/// The accelerometer is expected in g for position estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    /// Angular rate in rad/s
    pub gyroscope: Vector3<f32>,
    /// Specific force, in g for the position pipeline
    pub accelerometer: Vector3<f32>,
    /// Magnetic field, if the sensor package has a magnetometer
    pub magnetometer: Option<Vector3<f32>>,
}

impl Sample {
    /// Gyroscope and accelerometer sample
    pub fn new(gyroscope: Vector3<f32>, accelerometer: Vector3<f32>) -> Self {
        Self {
            gyroscope,
            accelerometer,
            magnetometer: None,
        }
    }

    /// Gyroscope, accelerometer and magnetometer sample
    pub fn with_magnetometer(
        gyroscope: Vector3<f32>,
        accelerometer: Vector3<f32>,
        magnetometer: Vector3<f32>,
    ) -> Self {
        Self {
            gyroscope,
            accelerometer,
            magnetometer: Some(magnetometer),
        }
    }

    /// Gyroscope and accelerometer sample with the gyroscope given in deg/s
    pub fn from_degrees(gyroscope: Vector3<f32>, accelerometer: Vector3<f32>) -> Self {
        Self::new(gyroscope.deg_to_rad(), accelerometer)
    }

    /// Same sample with the gyroscope reinterpreted from deg/s to rad/s
    ///
    /// For records parsed from a transport that reports degrees.
    pub fn gyroscope_to_radians(self) -> Self {
        Self {
            gyroscope: self.gyroscope.deg_to_rad(),
            ..self
        }
    }
}

/// Parse `gx,gy,gz,ax,ay,az` or `gx,gy,gz,ax,ay,az,mx,my,mz`
///
/// Fields may be padded with whitespace. Units are taken as-is.
///
/// # Example
/// ```
/// use imu_tracker::Sample;
///
/// let sample: Sample = "0.0, 0.1, 0.0, 0.0, 0.0, 1.0".parse().unwrap();
/// assert_eq!(sample.accelerometer.z, 1.0);
/// assert!(sample.magnetometer.is_none());
///
/// assert!("0.0,0.1,0.0".parse::<Sample>().is_err());
/// ```
impl FromStr for Sample {
    type Err = Error;

    fn from_str(record: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: String| Error::MalformedSample {
            record: record.to_string(),
            reason,
        };

        let values = record
            .trim()
            .split(',')
            .map(|field| {
                let field = field.trim();
                field
                    .parse::<f32>()
                    .map_err(|_| malformed(format!("invalid number {field:?}")))
            })
            .collect::<Result<Vec<f32>, Error>>()?;

        if let Some(index) = values.iter().position(|value| !value.is_finite()) {
            return Err(malformed(format!("field {index} is not finite")));
        }

        match values.as_slice() {
            [gx, gy, gz, ax, ay, az] => Ok(Sample::new(
                Vector3::new(*gx, *gy, *gz),
                Vector3::new(*ax, *ay, *az),
            )),
            [gx, gy, gz, ax, ay, az, mx, my, mz] => Ok(Sample::with_magnetometer(
                Vector3::new(*gx, *gy, *gz),
                Vector3::new(*ax, *ay, *az),
                Vector3::new(*mx, *my, *mz),
            )),
            other => Err(malformed(format!("expected 6 or 9 fields, found {}", other.len()))),
        }
    }
}
