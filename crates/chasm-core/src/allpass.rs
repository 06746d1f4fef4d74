//! Allpass filter for diffusion.
//!
//! A Schroeder-style allpass built on a fractional [`DelayLine`]. Each unit
//! smears an impulse into a decaying train of echoes; a few of them in series
//! give a dense, diffuse texture.

use crate::math::{flush_denormal, ms_to_samples};
use crate::{DelayLine, Sample};

/// Largest feedback magnitude accepted by [`AllpassFilter::set_feedback`].
pub const MAX_FEEDBACK: f64 = 0.99;

/// Schroeder allpass filter with fractional delay.
///
/// ```text
/// d    = delay.read(delay_samples)
/// y[n] = -g * x[n] + d
/// delay.write(x[n] + g * d)
/// ```
///
/// # Example
///
/// ```rust
/// use chasm_core::AllpassFilter;
///
/// let mut allpass = AllpassFilter::<f32>::new();
/// allpass.prepare(48000.0, 50.0);
/// allpass.set_delay_ms(10.0);
/// allpass.set_feedback(0.5);
///
/// let output = allpass.process(1.0);
/// assert_eq!(output, -0.5);
/// ```
#[derive(Debug, Clone)]
pub struct AllpassFilter<S: Sample = f32> {
    delay: DelayLine<S>,
    sample_rate: f64,
    delay_samples: f64,
    feedback: S,
}

impl<S: Sample> AllpassFilter<S> {
    /// Create an unprepared filter. It outputs silence until prepared.
    pub fn new() -> Self {
        Self {
            delay: DelayLine::new(),
            sample_rate: 44100.0,
            delay_samples: 1.0,
            feedback: S::ZERO,
        }
    }

    /// Allocate the delay line for up to `max_delay_ms` and reset.
    pub fn prepare(&mut self, sample_rate: f64, max_delay_ms: f64) {
        self.sample_rate = sample_rate;
        self.delay.prepare(sample_rate, max_delay_ms);
        self.reset();
    }

    /// Set the delay time in milliseconds.
    ///
    /// Clamped to `[1, capacity - 1]` samples.
    #[inline]
    pub fn set_delay_ms(&mut self, delay_ms: f64) {
        self.set_delay_samples(ms_to_samples(delay_ms, self.sample_rate));
    }

    /// Set the delay time in (fractional) samples, clamped like
    /// [`set_delay_ms`](Self::set_delay_ms).
    #[inline]
    pub fn set_delay_samples(&mut self, samples: f64) {
        let max = (self.delay.capacity() as f64 - 1.0).max(1.0);
        self.delay_samples = if samples.is_nan() {
            1.0
        } else {
            samples.clamp(1.0, max)
        };
    }

    /// Current delay in samples.
    #[inline]
    pub fn delay_samples(&self) -> f64 {
        self.delay_samples
    }

    /// Set the feedback coefficient, clamped to `±0.99`.
    #[inline]
    pub fn set_feedback(&mut self, feedback: S) {
        let limit = S::from_f64(MAX_FEEDBACK);
        self.feedback = feedback.clamp(-limit, limit);
    }

    /// Current feedback coefficient.
    #[inline]
    pub fn feedback(&self) -> S {
        self.feedback
    }

    /// Delay line capacity in samples.
    pub fn capacity(&self) -> usize {
        self.delay.capacity()
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: S) -> S {
        if self.delay.is_empty() {
            return S::ZERO;
        }

        let delayed = self.delay.read(self.delay_samples);
        let output = -self.feedback * input + delayed;
        self.delay
            .write(flush_denormal(input + self.feedback * delayed));

        output
    }

    /// Zero the delay line and return to feedback 0, delay 1 sample.
    pub fn reset(&mut self) {
        self.delay.clear();
        self.feedback = S::ZERO;
        self.delay_samples = 1.0;
    }
}

impl<S: Sample> Default for AllpassFilter<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared(feedback: f32, delay_samples: f64) -> AllpassFilter<f32> {
        let mut allpass = AllpassFilter::new();
        allpass.prepare(48000.0, 100.0);
        allpass.set_delay_samples(delay_samples);
        allpass.set_feedback(feedback);
        allpass
    }

    #[test]
    fn test_unprepared_outputs_zero() {
        let mut allpass = AllpassFilter::<f32>::new();
        allpass.set_feedback(0.5);
        assert_eq!(allpass.process(1.0), 0.0);
    }

    #[test]
    fn test_delay_clamped_to_capacity() {
        let mut allpass = prepared(0.5, 1.0);
        allpass.set_delay_ms(500.0);
        assert_eq!(allpass.delay_samples(), (allpass.capacity() - 1) as f64);
        allpass.set_delay_ms(0.0);
        assert_eq!(allpass.delay_samples(), 1.0);
        allpass.set_delay_samples(f64::NAN);
        assert_eq!(allpass.delay_samples(), 1.0);
    }

    #[test]
    fn test_feedback_clamped() {
        let mut allpass = prepared(1.5, 480.0);
        assert_eq!(allpass.feedback(), 0.99);
        allpass.set_feedback(-3.0);
        assert_eq!(allpass.feedback(), -0.99);
    }

    #[test]
    fn test_impulse_response() {
        let mut allpass = prepared(0.5, 10.0);
        assert_eq!(allpass.process(1.0), -0.5);
        for _ in 0..9 {
            assert_eq!(allpass.process(0.0), 0.0);
        }
        assert_eq!(allpass.process(0.0), 1.0);
        for _ in 0..9 {
            assert_eq!(allpass.process(0.0), 0.0);
        }
        assert_eq!(allpass.process(0.0), 0.5);
    }

    #[test]
    fn test_impulse_energy() {
        // h = -g, then 1, g, g^2, ... every D samples
        let g = 0.7_f32;
        let mut allpass = prepared(g, 48.0);
        let mut energy = f64::from(allpass.process(1.0)).powi(2);
        for _ in 0..48_000 {
            energy += f64::from(allpass.process(0.0)).powi(2);
        }
        let g = f64::from(g);
        let expected = g * g + 1.0 / (1.0 - g * g);
        assert!((energy - expected).abs() < 1e-3, "energy {energy}");
    }

    #[test]
    fn test_zero_feedback_is_pure_delay() {
        let mut allpass = prepared(0.0, 3.0);
        let input = [1.0, 2.0, 3.0, 0.0, 0.0, 0.0];
        let output: Vec<f32> = input.iter().map(|&x| allpass.process(x)).collect();
        assert_eq!(output, vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_reset_clears() {
        let mut allpass = prepared(0.7, 240.0);
        for _ in 0..1000 {
            allpass.process(0.5);
        }
        allpass.reset();
        assert_eq!(allpass.feedback(), 0.0);
        assert_eq!(allpass.delay_samples(), 1.0);
        assert_eq!(allpass.process(0.0), 0.0);
    }

    #[test]
    fn test_no_denormals_after_silence() {
        let mut allpass = prepared(0.7, 96.0);
        for _ in 0..1000 {
            allpass.process(0.5);
        }
        for i in 0..100_000 {
            let out = allpass.process(0.0);
            assert!(
                out == 0.0 || out.abs() > f32::MIN_POSITIVE,
                "denormal at sample {i}: {out:e}"
            );
        }
    }
}
