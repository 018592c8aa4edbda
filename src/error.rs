//! Error type for configuration and sample parsing
//!
//! The numerical core never fails: degenerate sensor readings are skipped and
//! out-of-range trigonometric arguments are clamped. Errors only come from
//! rejecting a configuration up front or from parsing an acquisition record.

use thiserror::Error;

/// Errors returned by settings validation and sample parsing
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("sample period must be finite and positive, got {0}")]
    InvalidSamplePeriod(f32),
    #[error("algorithm gain beta must be finite and non-negative, got {0}")]
    InvalidGain(f32),
    #[error("filter sample rate must be finite and positive, got {0}")]
    InvalidSampleRate(f32),
    #[error("filter cutoff {cutoff} Hz must be positive and below the Nyquist frequency {nyquist} Hz")]
    InvalidCutoff { cutoff: f32, nyquist: f32 },
    #[error("filter resonance must be finite and positive, got {0}")]
    InvalidResonance(f32),
    #[error("gravity scale must be finite and positive, got {0}")]
    InvalidGravity(f32),
    #[error("malformed sample record {record:?}: {reason}")]
    MalformedSample { record: String, reason: String },
}

/// Result alias used throughout the crate
pub type Result<T> = core::result::Result<T, Error>;
