//! Fractional delay line.
//!
//! A circular buffer with a single write cursor and linearly interpolated
//! reads. Capacity is fixed at [`prepare`](DelayLine::prepare) time; nothing in
//! the read/write path allocates.
//!
//! # Read convention
//!
//! The read position is `write_index - delay`, wrapped into `[0, capacity)`.
//! Reading happens before the write of the current sample, so a delay of
//! 1 returns the previously written sample.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::Sample;
use crate::math::ms_to_samples;

/// Variable-length delay line with linear interpolation.
///
/// # Example
///
/// ```rust
/// use chasm_core::DelayLine;
///
/// let mut delay = DelayLine::<f32>::with_capacity(8);
/// delay.write(1.0);
/// delay.write(0.0);
///
/// // Two samples ago
/// assert_eq!(delay.read(2.0), 1.0);
/// // Halfway between one and two samples ago
/// assert_eq!(delay.read(1.5), 0.5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DelayLine<S: Sample = f32> {
    buffer: Vec<S>,
    write_index: usize,
}

impl<S: Sample> DelayLine<S> {
    /// Create an empty (unprepared) delay line.
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            write_index: 0,
        }
    }

    /// Create a zeroed delay line holding `capacity` samples.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut delay = Self::new();
        delay.resize(capacity);
        delay
    }

    /// Size for `max_delay_ms` at `sample_rate`, plus one guard sample.
    pub fn prepare(&mut self, sample_rate: f64, max_delay_ms: f64) {
        let capacity = ms_to_samples(max_delay_ms.max(0.0), sample_rate) as usize + 1;
        self.resize(capacity);
    }

    /// Reallocate to `capacity` samples and clear.
    pub fn resize(&mut self, capacity: usize) {
        self.buffer.clear();
        self.buffer.resize(capacity, S::ZERO);
        self.write_index = 0;

        #[cfg(feature = "tracing")]
        tracing::trace!(capacity, "delay line resized");
    }

    /// Number of samples the line holds.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// `true` before the first [`prepare`](Self::prepare).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Current write cursor, always `< capacity` once prepared.
    #[inline]
    pub fn write_index(&self) -> usize {
        self.write_index
    }

    /// Read `delay_samples` behind the write cursor.
    ///
    /// Fractional delays interpolate between the two neighbouring samples.
    /// Returns zero when unprepared.
    #[inline]
    pub fn read(&self, delay_samples: f64) -> S {
        let len = self.buffer.len();
        if len == 0 {
            return S::ZERO;
        }

        let mut position = self.write_index as f64 - delay_samples;
        if position < 0.0 {
            position += len as f64;
        }

        let index = (position as usize) % len;
        let next = (index + 1) % len;
        let frac = S::from_f64(position - libm::floor(position));

        (S::ONE - frac) * self.buffer[index] + frac * self.buffer[next]
    }

    /// Write a sample at the cursor and advance it.
    #[inline]
    pub fn write(&mut self, sample: S) {
        let len = self.buffer.len();
        if len == 0 {
            return;
        }
        self.buffer[self.write_index] = sample;
        self.write_index = (self.write_index + 1) % len;
    }

    /// Zero the buffer and rewind the cursor. Capacity is kept.
    pub fn clear(&mut self) {
        self.buffer.fill(S::ZERO);
        self.write_index = 0;
    }
}
