//! Output safety limiters.
//!
//! - [`SmoothLimiter`]: soft clip, envelope limiter, hard ceiling, then a
//!   fast 20:1 compressor. Colours the sound; meant as a character stage.
//! - [`BrickWallLimiter`]: a plain clamp at a linear ceiling.
//!
//! Both are enabled on construction and pass audio through untouched when
//! disabled.

use chasm_core::{AudioBlock, Effect, Sample, StereoEffect, db_to_linear, hard_clip};

use crate::compressor::{Compressor, CompressorSettings};

/// Envelope level above which [`SmoothLimiter`] pulls gain down.
pub const SMOOTH_LIMITER_THRESHOLD: f64 = 0.8;

const LIMITER_ATTACK_MS: f64 = 0.1;
const LIMITER_RELEASE_MS: f64 = 10.0;
const FINAL_COMPRESSOR: CompressorSettings = CompressorSettings::new(0.0, 20.0, 0.1, 10.0);

/// Multi-stage soft limiter.
///
/// # Signal Flow
///
/// ```text
/// x → tanh(2x)/2 → × threshold/env → clamp(±ceiling) → compressor → y
/// ```
///
/// The envelope is shared by both channels so a peak on either side ducks
/// the pair together. The final compressors run per channel.
#[derive(Debug, Clone)]
pub struct SmoothLimiter<S: Sample = f32> {
    enabled: bool,
    ceiling: S,
    envelope: S,
    attack_coeff: S,
    release_coeff: S,
    compressors: [Compressor<S>; 2],
}

impl<S: Sample> SmoothLimiter<S> {
    /// Enabled limiter with a 0 dB ceiling at 44.1 kHz.
    pub fn new() -> Self {
        let mut limiter = Self {
            enabled: true,
            ceiling: S::ONE,
            envelope: S::ZERO,
            attack_coeff: S::ZERO,
            release_coeff: S::ZERO,
            compressors: [Compressor::new(), Compressor::new()],
        };
        limiter.prepare(44100.0);
        limiter
    }

    /// Recompute ballistics for `sample_rate` and clear state.
    pub fn prepare(&mut self, sample_rate: f64) {
        let coeff = |ms: f64| S::from_f64(1.0 - libm::exp(-1.0 / (ms * 0.001 * sample_rate)));
        self.attack_coeff = coeff(LIMITER_ATTACK_MS);
        self.release_coeff = coeff(LIMITER_RELEASE_MS);

        for comp in &mut self.compressors {
            comp.prepare(sample_rate);
            comp.apply(FINAL_COMPRESSOR);
        }
        self.reset_state();
    }

    /// Enable or bypass.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether the limiter is active.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Set the output ceiling in dB.
    pub fn set_ceiling_db(&mut self, ceiling_db: S) {
        self.ceiling = db_to_linear(ceiling_db);
    }

    /// Output ceiling as a linear amplitude.
    pub fn ceiling(&self) -> S {
        self.ceiling
    }

    /// Soft clip, envelope limit and clamp one sample. The final compressor
    /// only runs in [`process_block`](StereoEffect::process_block).
    #[inline]
    pub fn process_sample(&mut self, input: S) -> S {
        if !self.enabled {
            return input;
        }
        let clipped = (input * S::from_f64(2.0)).tanh() * S::HALF;
        let limited = self.limit(clipped);
        hard_clip(limited, self.ceiling)
    }

    #[inline]
    fn limit(&mut self, input: S) -> S {
        let level = input.abs();
        let coeff = if level > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope += (level - self.envelope) * coeff;

        let threshold = S::from_f64(SMOOTH_LIMITER_THRESHOLD);
        if self.envelope > threshold {
            input * threshold / (self.envelope + S::from_f64(1e-6))
        } else {
            input
        }
    }

    fn reset_state(&mut self) {
        self.envelope = S::ZERO;
        for comp in &mut self.compressors {
            Effect::reset(comp);
        }
    }
}

impl<S: Sample> Default for SmoothLimiter<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Sample> StereoEffect<S> for SmoothLimiter<S> {
    fn process_block(&mut self, block: &mut AudioBlock<'_, S>) {
        if !self.enabled {
            return;
        }

        let (left, mut right) = block.split_mut();
        for (i, sample) in left.iter_mut().enumerate() {
            let y = self.process_sample(*sample);
            *sample = self.compressors[0].process(y);
            if let Some(right) = right.as_deref_mut() {
                let y = self.process_sample(right[i]);
                right[i] = self.compressors[1].process(y);
            }
        }
    }

    fn reset(&mut self) {
        self.reset_state();
    }
}

/// Hard clamp at a linear ceiling in `[0.1, 1.0]`.
///
/// # Example
///
/// ```rust
/// use chasm_effects::BrickWallLimiter;
///
/// let mut limiter = BrickWallLimiter::<f32>::new();
/// limiter.set_ceiling(0.5);
/// assert_eq!(limiter.process_sample(0.9), 0.5);
/// assert_eq!(limiter.process_sample(-0.2), -0.2);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BrickWallLimiter<S: Sample = f32> {
    enabled: bool,
    ceiling: S,
}

impl<S: Sample> BrickWallLimiter<S> {
    /// Enabled limiter at a ceiling of 1.0.
    pub fn new() -> Self {
        Self {
            enabled: true,
            ceiling: S::ONE,
        }
    }

    /// Set the ceiling, clamped to `[0.1, 1.0]`.
    pub fn set_ceiling(&mut self, ceiling: S) {
        self.ceiling = ceiling.clamp(S::from_f64(0.1), S::ONE);
    }

    /// Linear ceiling.
    pub fn ceiling(&self) -> S {
        self.ceiling
    }

    /// Enable or bypass.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether the limiter is active.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Clamp one sample.
    #[inline]
    pub fn process_sample(&self, input: S) -> S {
        if self.enabled {
            hard_clip(input, self.ceiling)
        } else {
            input
        }
    }
}

impl<S: Sample> Default for BrickWallLimiter<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Sample> StereoEffect<S> for BrickWallLimiter<S> {
    fn process_block(&mut self, block: &mut AudioBlock<'_, S>) {
        if !self.enabled {
            return;
        }
        let (left, right) = block.split_mut();
        for sample in left.iter_mut().chain(right.into_iter().flatten()) {
            *sample = hard_clip(*sample, self.ceiling);
        }
    }

    fn reset(&mut self) {}
}
