//! Error types for the pitchmix crate.

use std::fmt;

/// Errors that can occur during a melody mix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MixError {
    /// Input bytes could not be decoded into audio samples.
    DecodeFailure(String),
    /// The reference signal produced no melody observations.
    NoMelodyDetected,
    /// I/O error.
    IoError(String),
}

impl fmt::Display for MixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MixError::DecodeFailure(msg) => write!(f, "decode failure: {}", msg),
            MixError::NoMelodyDetected => {
                write!(f, "no melody detected in the reference signal")
            }
            MixError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for MixError {}

impl From<std::io::Error> for MixError {
    fn from(err: std::io::Error) -> Self {
        MixError::IoError(err.to_string())
    }
}
