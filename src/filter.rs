//! Second-order recursive low-pass and high-pass filters
//!
//! Coefficients come from the bilinear transform of a second-order
//! Butterworth-family prototype with adjustable resonance. A filter instance
//! carries the input and output history of exactly one signal channel; filter
//! three axes with three instances.

use core::f32::consts::PI;

use tracing::{trace, warn};

use crate::error::Result;
use crate::types::{FilterSettings, PassType};

/// Fixed-capacity history buffer, newest sample first
///
/// Pushing shifts every slot one place towards the back and drops the oldest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct History<const N: usize> {
    slots: [f32; N],
}

impl<const N: usize> History<N> {
    /// Create a history with every slot zeroed
    pub fn new() -> Self {
        Self { slots: [0.0; N] }
    }

    /// Shift the history and store `value` as the newest sample
    pub fn push(&mut self, value: f32) {
        if N == 0 {
            return;
        }
        self.slots.rotate_right(1);
        self.slots[0] = value;
    }

    /// Sample pushed `age` calls ago (0 is the newest)
    ///
    /// # Panics
    /// Panics if `age >= N`.
    pub fn get(&self, age: usize) -> f32 {
        self.slots[age]
    }

    /// Newest sample, or zero for an empty history
    pub fn latest(&self) -> f32 {
        self.slots.first().copied().unwrap_or(0.0)
    }
}

impl<const N: usize> Default for History<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Difference-equation coefficients
///
/// `y[n] = a1·x[n] + a2·x[n-1] + a3·x[n-2] - b1·y[n-1] - b2·y[n-2]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterCoefficients {
    pub a1: f32,
    pub a2: f32,
    pub a3: f32,
    pub b1: f32,
    pub b2: f32,
}

impl FilterCoefficients {
    /// Derive coefficients for the given settings
    ///
    /// # Example
    /// ```
    /// use imu_tracker::{FilterCoefficients, FilterSettings};
    ///
    /// let coefficients = FilterCoefficients::configure(&FilterSettings::high_pass_drift()).unwrap();
    /// // A high-pass filter blocks DC: the feed-forward taps sum to zero
    /// assert!((coefficients.a1 + coefficients.a2 + coefficients.a3).abs() < 1e-6);
    /// ```
    pub fn configure(settings: &FilterSettings) -> Result<Self> {
        if let Err(error) = settings.validate() {
            warn!(%error, "rejected filter settings");
            return Err(error);
        }
        Ok(Self::derive(settings))
    }

    /// Bilinear-transform coefficients for settings already validated
    fn derive(settings: &FilterSettings) -> Self {
        let r = settings.resonance;
        let warped = (PI * settings.cutoff_frequency / settings.sample_rate).tan();

        match settings.pass_type {
            PassType::LowPass => {
                let c = 1.0 / warped;
                let a1 = 1.0 / (1.0 + r * c + c * c);
                Self {
                    a1,
                    a2: 2.0 * a1,
                    a3: a1,
                    b1: 2.0 * (1.0 - c * c) * a1,
                    b2: (1.0 - r * c + c * c) * a1,
                }
            }
            PassType::HighPass => {
                let c = warped;
                let a1 = 1.0 / (1.0 + r * c + c * c);
                Self {
                    a1,
                    a2: -2.0 * a1,
                    a3: a1,
                    b1: 2.0 * (c * c - 1.0) * a1,
                    b2: (1.0 - r * c + c * c) * a1,
                }
            }
        }
    }
}

/// Stateful second-order IIR filter for one scalar channel
///
/// A filter is usable as soon as it is constructed. There is no reset: create
/// a fresh instance for a new pass over a signal.
///
/// # Example
/// ```
/// use imu_tracker::{FilterSettings, PassType, RecursiveFilter};
///
/// let mut filter = RecursiveFilter::new(FilterSettings {
///     cutoff_frequency: 1.0,
///     sample_rate: 100.0,
///     pass_type: PassType::LowPass,
///     resonance: core::f32::consts::SQRT_2,
/// })
/// .unwrap();
///
/// for _ in 0..1000 {
///     filter.update(1.0);
/// }
/// assert!((filter.value() - 1.0).abs() < 1e-3);
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveFilter {
    settings: FilterSettings,
    coefficients: FilterCoefficients,
    input: History<2>,
    output: History<2>,
}

impl RecursiveFilter {
    /// Configure a new filter with zeroed history
    pub fn new(settings: FilterSettings) -> Result<Self> {
        let coefficients = FilterCoefficients::configure(&settings)?;
        Ok(Self::with_coefficients(settings, coefficients))
    }

    pub(crate) fn from_validated(settings: FilterSettings) -> Self {
        Self::with_coefficients(settings, FilterCoefficients::derive(&settings))
    }

    fn with_coefficients(settings: FilterSettings, coefficients: FilterCoefficients) -> Self {
        trace!(?settings, ?coefficients, "configured recursive filter");
        Self {
            settings,
            coefficients,
            input: History::new(),
            output: History::new(),
        }
    }

    /// Feed one input sample
    pub fn update(&mut self, input: f32) {
        let FilterCoefficients { a1, a2, a3, b1, b2 } = self.coefficients;

        let output = a1 * input + a2 * self.input.get(0) + a3 * self.input.get(1)
            - b1 * self.output.get(0)
            - b2 * self.output.get(1);

        self.input.push(input);
        self.output.push(output);
    }

    /// Most recent output, zero before the first update
    pub fn value(&self) -> f32 {
        self.output.latest()
    }

    /// Feed a whole channel and collect one output per input
    pub fn filter_signal(&mut self, signal: &[f32]) -> Vec<f32> {
        signal
            .iter()
            .map(|&sample| {
                self.update(sample);
                self.value()
            })
            .collect()
    }

    /// Settings this filter was configured with
    pub fn settings(&self) -> FilterSettings {
        self.settings
    }

    /// Derived difference-equation coefficients
    pub fn coefficients(&self) -> FilterCoefficients {
        self.coefficients
    }
}
