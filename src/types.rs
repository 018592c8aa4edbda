//! Settings types for the estimator, the recursive filter and the position pipeline

use crate::error::{Error, Result};

/// Default sample period of the reference recordings (256 Hz)
pub const DEFAULT_SAMPLE_PERIOD: f32 = 1.0 / 256.0;

/// Default gradient-descent gain
pub const DEFAULT_BETA: f32 = 0.1;

/// Standard gravity used to scale linear acceleration from g to m/s²
pub const STANDARD_GRAVITY: f32 = 9.81;

/// Attitude estimator settings
///
/// The sample period must match the rate at which the acquisition layer
/// delivers samples. The estimator has no notion of timestamps.
///
/// # Example
/// ```
/// use imu_tracker::{AttitudeEstimator, EstimatorSettings};
///
/// let settings = EstimatorSettings {
///     sample_period: 0.01, // 100 Hz
///     beta: 0.05,          // favour the gyroscope
/// };
/// let estimator = AttitudeEstimator::with_settings(settings).unwrap();
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EstimatorSettings {
    /// Time between consecutive samples in seconds
    pub sample_period: f32,
    /// Algorithm gain beta
    ///
    /// Higher values weight the accelerometer/magnetometer correction more
    /// heavily against gyroscope integration. The estimate converges faster
    /// but carries more sensor noise.
    pub beta: f32,
}

impl EstimatorSettings {
    /// Check that the sample period is positive and the gain non-negative
    pub fn validate(&self) -> Result<()> {
        if !self.sample_period.is_finite() || self.sample_period <= 0.0 {
            return Err(Error::InvalidSamplePeriod(self.sample_period));
        }
        if !self.beta.is_finite() || self.beta < 0.0 {
            return Err(Error::InvalidGain(self.beta));
        }
        Ok(())
    }
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        Self {
            sample_period: DEFAULT_SAMPLE_PERIOD,
            beta: DEFAULT_BETA,
        }
    }
}

/// Pass band of a [`RecursiveFilter`](crate::RecursiveFilter)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PassType {
    /// Attenuate content above the cutoff frequency
    LowPass,
    /// Attenuate content below the cutoff frequency
    HighPass,
}

/// Recursive filter settings
///
/// # Example
/// ```
/// use imu_tracker::{FilterSettings, PassType, RecursiveFilter};
///
/// let settings = FilterSettings {
///     cutoff_frequency: 5.0,
///     sample_rate: 100.0,
///     pass_type: PassType::LowPass,
///     resonance: core::f32::consts::SQRT_2,
/// };
/// let filter = RecursiveFilter::new(settings).unwrap();
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterSettings {
    /// Cutoff frequency in Hz
    pub cutoff_frequency: f32,
    /// Sample rate in Hz
    pub sample_rate: f32,
    /// Low-pass or high-pass
    pub pass_type: PassType,
    /// Resonance amount
    ///
    /// √2 gives a maximally flat response; values down to about 0.1 add an
    /// increasingly sharp resonant peak at the cutoff.
    pub resonance: f32,
}

impl FilterSettings {
    /// Drift-removal configuration used at both integration stages
    pub fn high_pass_drift() -> Self {
        Self {
            cutoff_frequency: 0.1,
            sample_rate: 1.0,
            pass_type: PassType::HighPass,
            resonance: 2.0,
        }
    }

    /// Nyquist frequency for the configured sample rate
    pub fn nyquist(&self) -> f32 {
        0.5 * self.sample_rate
    }

    /// Check that the filter is realisable
    ///
    /// The bilinear transform pre-warps with `tan(π·f/fs)`, which diverges at
    /// the Nyquist frequency, so the cutoff must lie strictly inside
    /// `(0, fs/2)`.
    pub fn validate(&self) -> Result<()> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(Error::InvalidSampleRate(self.sample_rate));
        }
        let nyquist = self.nyquist();
        if !self.cutoff_frequency.is_finite()
            || self.cutoff_frequency <= 0.0
            || self.cutoff_frequency >= nyquist
        {
            return Err(Error::InvalidCutoff {
                cutoff: self.cutoff_frequency,
                nyquist,
            });
        }
        if !self.resonance.is_finite() || self.resonance <= 0.0 {
            return Err(Error::InvalidResonance(self.resonance));
        }
        Ok(())
    }
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self::high_pass_drift()
    }
}

/// Position pipeline settings
///
/// # Example
/// ```
/// use imu_tracker::{FilterSettings, PositionEstimator, PositionSettings};
///
/// let settings = PositionSettings {
///     velocity_filter: FilterSettings {
///         cutoff_frequency: 0.05,
///         ..FilterSettings::high_pass_drift()
///     },
///     ..Default::default()
/// };
/// let estimator = PositionEstimator::with_settings(settings).unwrap();
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionSettings {
    /// Orientation estimator used for tilt compensation
    pub estimator: EstimatorSettings,
    /// Scale from accelerometer units (g) to physical units
    pub gravity: f32,
    /// High-pass filter applied to each velocity channel
    pub velocity_filter: FilterSettings,
    /// High-pass filter applied to each position channel
    pub position_filter: FilterSettings,
}

impl PositionSettings {
    /// Validate every nested setting
    pub fn validate(&self) -> Result<()> {
        self.estimator.validate()?;
        if !self.gravity.is_finite() || self.gravity <= 0.0 {
            return Err(Error::InvalidGravity(self.gravity));
        }
        self.velocity_filter.validate()?;
        self.position_filter.validate()
    }
}

impl Default for PositionSettings {
    fn default() -> Self {
        Self {
            estimator: EstimatorSettings::default(),
            gravity: STANDARD_GRAVITY,
            velocity_filter: FilterSettings::high_pass_drift(),
            position_filter: FilterSettings::high_pass_drift(),
        }
    }
}
