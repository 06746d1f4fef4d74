//! Error types for the engine boundary.
//!
//! The DSP itself never fails: controls are clamped and non-finite audio is
//! contained. Errors only arise where the outside world hands the engine a
//! processing spec or configuration it cannot use.

use std::path::PathBuf;
use thiserror::Error;

/// A [`ProcessSpec`](crate::ProcessSpec) the processor cannot run with.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SpecError {
    /// Sample rate is non-finite or not positive.
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(f64),

    /// Only mono and stereo are supported.
    #[error("unsupported channel count: {0} (expected 1 or 2)")]
    UnsupportedChannels(usize),

    /// Maximum block size of zero.
    #[error("maximum block size must be at least 1 sample")]
    ZeroBlockSize,
}

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Control interval of zero samples
    #[error("control interval must be at least 1 sample")]
    InvalidControlInterval,

    /// Output limiter ceiling outside its legal range
    #[error("invalid limiter ceiling {value}: {reason}")]
    InvalidLimiterCeiling {
        /// Offending ceiling value.
        value: f64,
        /// Which constraint it broke.
        reason: &'static str,
    },
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a limiter ceiling error.
    pub fn limiter_ceiling(value: f64, reason: &'static str) -> Self {
        ConfigError::InvalidLimiterCeiling { value, reason }
    }
}
