//! Validated processing spec.

use crate::error::SpecError;

/// Sample rate, maximum block size and channel count a processor is
/// prepared for.
///
/// Only constructible through [`ProcessSpec::new`], so a value in hand is
/// always usable.
///
/// # Example
///
/// ```rust
/// use chasm_engine::{ProcessSpec, SpecError};
///
/// let spec = ProcessSpec::new(48000.0, 512, 2)?;
/// assert_eq!(spec.channels(), 2);
///
/// assert_eq!(ProcessSpec::new(48000.0, 512, 4), Err(SpecError::UnsupportedChannels(4)));
/// # Ok::<(), SpecError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSpec {
    sample_rate: f64,
    max_block_size: usize,
    channels: usize,
}

impl ProcessSpec {
    /// Validate and build a spec.
    pub fn new(sample_rate: f64, max_block_size: usize, channels: usize) -> Result<Self, SpecError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(SpecError::InvalidSampleRate(sample_rate));
        }
        if max_block_size == 0 {
            return Err(SpecError::ZeroBlockSize);
        }
        if !(1..=2).contains(&channels) {
            return Err(SpecError::UnsupportedChannels(channels));
        }
        Ok(Self {
            sample_rate,
            max_block_size,
            channels,
        })
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Largest block processed in one pass.
    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// 1 or 2.
    pub fn channels(&self) -> usize {
        self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_sample_rates() {
        for sr in [0.0, -44100.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                ProcessSpec::new(sr, 512, 2),
                Err(SpecError::InvalidSampleRate(_))
            ));
        }
    }

    #[test]
    fn test_rejects_zero_block() {
        assert_eq!(ProcessSpec::new(44100.0, 0, 1), Err(SpecError::ZeroBlockSize));
    }

    #[test]
    fn test_channel_counts() {
        assert!(ProcessSpec::new(44100.0, 64, 1).is_ok());
        assert!(ProcessSpec::new(44100.0, 64, 2).is_ok());
        assert_eq!(
            ProcessSpec::new(44100.0, 64, 0),
            Err(SpecError::UnsupportedChannels(0))
        );
        assert_eq!(
            ProcessSpec::new(44100.0, 64, 3),
            Err(SpecError::UnsupportedChannels(3))
        );
    }
}
