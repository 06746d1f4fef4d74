//! Envelope follower for tracking signal amplitude.
//!
//! Drives the compressors and limiters of the loudness stage.

use crate::Sample;

/// Peak envelope follower with separate attack and release times.
///
/// ```text
/// coeff = exp(-1 / (time_ms * sample_rate / 1000))
/// env   = coeff * env + (1 - coeff) * |x|
/// ```
///
/// Attack applies while the input rises above the envelope, release while it
/// falls below.
///
/// # Example
///
/// ```rust
/// use chasm_core::EnvelopeFollower;
///
/// let mut env = EnvelopeFollower::<f32>::new();
/// env.prepare(48000.0);
/// env.set_attack_ms(10.0);
/// env.set_release_ms(100.0);
///
/// let level = env.process(0.5);
/// assert!(level > 0.0 && level < 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeFollower<S: Sample = f32> {
    envelope: S,
    attack_coeff: S,
    release_coeff: S,
    sample_rate: f64,
    attack_ms: f64,
    release_ms: f64,
}

impl<S: Sample> EnvelopeFollower<S> {
    /// Shortest accepted attack time.
    pub const MIN_ATTACK_MS: f64 = 0.1;
    /// Shortest accepted release time.
    pub const MIN_RELEASE_MS: f64 = 1.0;

    /// Create a follower at 44.1 kHz with 10 ms attack, 100 ms release.
    pub fn new() -> Self {
        let mut follower = Self {
            envelope: S::ZERO,
            attack_coeff: S::ZERO,
            release_coeff: S::ZERO,
            sample_rate: 44100.0,
            attack_ms: 10.0,
            release_ms: 100.0,
        };
        follower.recalculate_coefficients();
        follower
    }

    /// Create with specified attack and release times.
    pub fn with_times(sample_rate: f64, attack_ms: f64, release_ms: f64) -> Self {
        let mut follower = Self::new();
        follower.sample_rate = sample_rate;
        follower.attack_ms = attack_ms.max(Self::MIN_ATTACK_MS);
        follower.release_ms = release_ms.max(Self::MIN_RELEASE_MS);
        follower.recalculate_coefficients();
        follower
    }

    /// Update sample rate and recalculate coefficients.
    pub fn prepare(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.recalculate_coefficients();
    }

    /// Set the attack time in milliseconds (floored at 0.1 ms).
    pub fn set_attack_ms(&mut self, attack_ms: f64) {
        self.attack_ms = attack_ms.max(Self::MIN_ATTACK_MS);
        self.recalculate_coefficients();
    }

    /// Attack time in milliseconds.
    pub fn attack_ms(&self) -> f64 {
        self.attack_ms
    }

    /// Set the release time in milliseconds (floored at 1 ms).
    pub fn set_release_ms(&mut self, release_ms: f64) {
        self.release_ms = release_ms.max(Self::MIN_RELEASE_MS);
        self.recalculate_coefficients();
    }

    /// Release time in milliseconds.
    pub fn release_ms(&self) -> f64 {
        self.release_ms
    }

    /// Process a sample and return the envelope level (never negative).
    #[inline]
    pub fn process(&mut self, input: S) -> S {
        let input_abs = input.abs();
        let coeff = if input_abs > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = coeff * self.envelope + (S::ONE - coeff) * input_abs;
        self.envelope
    }

    /// Current envelope level without processing new input.
    #[inline]
    pub fn level(&self) -> S {
        self.envelope
    }

    /// Reset the envelope to zero.
    pub fn reset(&mut self) {
        self.envelope = S::ZERO;
    }

    fn recalculate_coefficients(&mut self) {
        let sample_rate = self.sample_rate;
        let coeff = |ms: f64| S::from_f64(libm::exp(-1.0 / (ms * sample_rate / 1000.0)));
        self.attack_coeff = coeff(self.attack_ms);
        self.release_coeff = coeff(self.release_ms);
    }
}

impl<S: Sample> Default for EnvelopeFollower<S> {
    fn default() -> Self {
        Self::new()
    }
}
