//! Loudness stage: compress, drive into tanh, compress again.
//!
//! # Signal Flow
//!
//! ```text
//! x → pre-compressor → × input gain → × boost → tanh(· × boost) → post-compressor → y
//! ```
//!
//! Boost appears twice: once as a plain gain and again inside the
//! waveshaper argument. Anything non-finite coming out of the waveshaper is
//! replaced with silence before the post-compressor sees it.
//!
//! # Modes
//!
//! | Index | Mode | Threshold | Ratio | Attack | Release |
//! |-------|------|-----------|-------|--------|---------|
//! | ≤ 0 | disabled | | | | |
//! | 1 | Clean | -20 dB | 4:1 | 10 ms | 80 ms |
//! | 2 | Further | -15 dB | 6:1 | 75 ms | 50 ms |
//! | ≥ 3 | Crunchy | -8 dB | 5:1 | 100 ms | 200 ms |
//!
//! Pre- and post-compressors always share the same settings. A disabled
//! stage does not touch the buffer at all.

use chasm_core::{AudioBlock, Effect, Sample, SmoothedParam, StereoEffect};

use crate::compressor::{Compressor, CompressorSettings};

const GAIN_SMOOTHING_MS: f64 = 1.0;

/// Compressor preset shared by both compressors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoudnessMode {
    /// Gentle levelling.
    #[default]
    Clean,
    /// Slow attack, heavier ratio.
    Further,
    /// High threshold, slow ballistics, most saturation.
    Crunchy,
}

impl LoudnessMode {
    /// Compressor settings for this mode.
    pub const fn settings(self) -> CompressorSettings {
        match self {
            Self::Clean => CompressorSettings::new(-20.0, 4.0, 10.0, 80.0),
            Self::Further => CompressorSettings::new(-15.0, 6.0, 75.0, 50.0),
            Self::Crunchy => CompressorSettings::new(-8.0, 5.0, 100.0, 200.0),
        }
    }

    /// Map a control index to a mode. `None` means disabled.
    pub const fn from_index(index: i32) -> Option<Self> {
        match index {
            i32::MIN..=0 => None,
            1 => Some(Self::Clean),
            2 => Some(Self::Further),
            _ => Some(Self::Crunchy),
        }
    }

    /// Control index of this mode (1, 2 or 3).
    pub const fn index(self) -> i32 {
        match self {
            Self::Clean => 1,
            Self::Further => 2,
            Self::Crunchy => 3,
        }
    }
}

/// Compressor → gain → tanh → compressor chain with per-channel dynamics.
///
/// Input gain and boost are linear amplitudes smoothed over 1 ms, advanced
/// once per frame inside [`process_block`](StereoEffect::process_block).
///
/// # Example
///
/// ```rust
/// use chasm_core::{AudioBlock, StereoEffect};
/// use chasm_effects::LoudnessStage;
///
/// let mut loud = LoudnessStage::<f32>::new();
/// loud.prepare(48000.0, 1.0, 2.0);
/// loud.set_mode_index(3);
///
/// let mut left = [0.8_f32; 64];
/// let mut right = [-0.8_f32; 64];
/// loud.process_block(&mut AudioBlock::stereo(&mut left, &mut right));
/// assert!(left.iter().all(|x| x.abs() <= 1.0));
/// ```
#[derive(Debug, Clone)]
pub struct LoudnessStage<S: Sample = f32> {
    pre: [Compressor<S>; 2],
    post: [Compressor<S>; 2],
    input_gain: SmoothedParam<S>,
    boost: SmoothedParam<S>,
    mode: LoudnessMode,
    enabled: bool,
}

impl<S: Sample> LoudnessStage<S> {
    /// Disabled stage in [`LoudnessMode::Clean`] with unity gains.
    pub fn new() -> Self {
        let mut stage = Self {
            pre: [Compressor::new(), Compressor::new()],
            post: [Compressor::new(), Compressor::new()],
            input_gain: SmoothedParam::new(S::ONE),
            boost: SmoothedParam::new(S::ONE),
            mode: LoudnessMode::Clean,
            enabled: false,
        };
        stage.apply_mode(LoudnessMode::Clean);
        stage
    }

    /// Prepare compressors and gain smoothers, settling on the given linear
    /// gains.
    pub fn prepare(&mut self, sample_rate: f64, initial_input_gain: S, initial_boost: S) {
        for comp in self.pre.iter_mut().chain(self.post.iter_mut()) {
            comp.prepare(sample_rate);
        }
        self.input_gain.prepare(sample_rate, GAIN_SMOOTHING_MS);
        self.boost.prepare(sample_rate, GAIN_SMOOTHING_MS);
        self.input_gain.reset(initial_input_gain);
        self.boost.reset(initial_boost);
    }

    /// Set the input gain target (linear).
    pub fn set_input_gain(&mut self, gain: S) {
        self.input_gain.set_target(gain);
    }

    /// Input gain target (linear).
    pub fn input_gain(&self) -> S {
        self.input_gain.target()
    }

    /// Set the boost target (linear).
    pub fn set_boost(&mut self, boost: S) {
        self.boost.set_target(boost);
    }

    /// Boost target (linear).
    pub fn boost(&self) -> S {
        self.boost.target()
    }

    /// Enable the stage in `mode`.
    pub fn set_mode(&mut self, mode: LoudnessMode) {
        if mode != self.mode {
            #[cfg(feature = "tracing")]
            tracing::debug!(?mode, "loudness mode changed");
            self.apply_mode(mode);
        }
        self.enabled = true;
    }

    /// Select by control index: 0 or below disables, 1 to 3 pick a mode,
    /// anything above 3 is Crunchy.
    pub fn set_mode_index(&mut self, index: i32) {
        match LoudnessMode::from_index(index) {
            Some(mode) => self.set_mode(mode),
            None => self.enabled = false,
        }
    }

    /// Enable or disable without changing the mode.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether the stage processes audio.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Selected mode (kept while disabled).
    pub fn mode(&self) -> LoudnessMode {
        self.mode
    }

    /// Control index: 0 when disabled, otherwise the mode's index.
    pub fn mode_index(&self) -> i32 {
        if self.enabled { self.mode.index() } else { 0 }
    }

    /// Settings loaded into the compressors.
    pub fn compressor_settings(&self) -> CompressorSettings {
        self.pre[0].settings()
    }

    /// Process one sample on `channel` (0 or 1) at the current smoothed
    /// gains, without advancing them. Returns the input unchanged when
    /// disabled or for any other channel.
    #[inline]
    pub fn process_sample(&mut self, channel: usize, input: S) -> S {
        if !self.enabled || channel > 1 {
            return input;
        }
        let input_gain = self.input_gain.get();
        let boost = self.boost.get();
        self.shape(channel, input, input_gain, boost)
    }

    #[inline]
    fn shape(&mut self, channel: usize, input: S, input_gain: S, boost: S) -> S {
        let compressed = self.pre[channel].process(input);
        let driven = compressed * input_gain * boost;
        let mut shaped = (driven * boost).tanh();
        if !shaped.is_finite() {
            shaped = S::ZERO;
        }
        self.post[channel].process(shaped)
    }

    fn apply_mode(&mut self, mode: LoudnessMode) {
        self.mode = mode;
        let settings = mode.settings();
        for comp in self.pre.iter_mut().chain(self.post.iter_mut()) {
            comp.apply(settings);
        }
    }
}

impl<S: Sample> Default for LoudnessStage<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Sample> StereoEffect<S> for LoudnessStage<S> {
    fn process_block(&mut self, block: &mut AudioBlock<'_, S>) {
        if !self.enabled || block.is_empty() {
            return;
        }

        let (left, mut right) = block.split_mut();
        for (i, sample) in left.iter_mut().enumerate() {
            let input_gain = self.input_gain.advance();
            let boost = self.boost.advance();
            *sample = self.shape(0, *sample, input_gain, boost);
            if let Some(right) = right.as_deref_mut() {
                right[i] = self.shape(1, right[i], input_gain, boost);
            }
        }
    }

    fn reset(&mut self) {
        for comp in self.pre.iter_mut().chain(self.post.iter_mut()) {
            Effect::reset(comp);
        }
        self.input_gain.snap_to_target();
        self.boost.snap_to_target();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f64 = 48000.0;

    fn stage(mode_index: i32) -> LoudnessStage<f64> {
        let mut stage = LoudnessStage::new();
        stage.prepare(SAMPLE_RATE, 1.0, 1.0);
        stage.set_mode_index(mode_index);
        stage
    }

    #[test]
    fn test_mode_index_mapping() {
        assert_eq!(LoudnessMode::from_index(-4), None);
        assert_eq!(LoudnessMode::from_index(0), None);
        assert_eq!(LoudnessMode::from_index(1), Some(LoudnessMode::Clean));
        assert_eq!(LoudnessMode::from_index(2), Some(LoudnessMode::Further));
        assert_eq!(LoudnessMode::from_index(3), Some(LoudnessMode::Crunchy));
        assert_eq!(LoudnessMode::from_index(42), Some(LoudnessMode::Crunchy));
    }

    #[test]
    fn test_disabled_is_strict_noop() {
        let mut stage = stage(0);
        assert!(!stage.is_enabled());

        let mut left = [f64::NAN, 3.0, -7.5];
        let mut right = [0.1, f64::INFINITY, 0.0];
        stage.process_block(&mut AudioBlock::stereo(&mut left, &mut right));
        assert!(left[0].is_nan());
        assert_eq!(&left[1..], &[3.0, -7.5]);
        assert_eq!(right[0], 0.1);
        assert_eq!(right[1], f64::INFINITY);
        assert_eq!(stage.process_sample(0, 9.0), 9.0);
    }

    #[test]
    fn test_reenable_restores_tuple() {
        let mut stage = stage(3);
        stage.set_mode_index(0);
        assert_eq!(stage.mode_index(), 0);
        stage.set_mode_index(2);
        assert_eq!(stage.compressor_settings(), CompressorSettings::new(-15.0, 6.0, 75.0, 50.0));
        stage.set_mode_index(1);
        assert_eq!(stage.compressor_settings(), CompressorSettings::new(-20.0, 4.0, 10.0, 80.0));
        assert_eq!(stage.mode_index(), 1);
    }

    #[test]
    fn test_set_enabled_keeps_mode() {
        let mut stage = stage(2);
        stage.set_enabled(false);
        assert_eq!(stage.mode(), LoudnessMode::Further);
        stage.set_enabled(true);
        assert_eq!(stage.mode_index(), 2);
    }

    #[test]
    fn test_output_is_bounded() {
        let mut stage = stage(1);
        stage.set_input_gain(16.0);
        stage.set_boost(16.0);
        let mut left: Vec<f64> = (0..4800).map(|n| (n as f64 * 0.01).sin()).collect();
        let mut right = left.clone();
        stage.process_block(&mut AudioBlock::stereo(&mut left, &mut right));
        // tanh output is within ±1 and compression only reduces it
        assert!(left.iter().chain(&right).all(|x| x.is_finite() && x.abs() <= 1.0));
    }

    #[test]
    fn test_non_finite_becomes_silence() {
        let mut stage = stage(3);
        assert_eq!(stage.process_sample(0, f64::NAN), 0.0);
        assert!(stage.process_sample(2, f64::NAN).is_nan());
    }

    #[test]
    fn test_channels_independent() {
        let mut stage = stage(1);
        let mut left = vec![0.0; 256];
        let mut right = vec![0.9; 256];
        stage.process_block(&mut AudioBlock::stereo(&mut left, &mut right));
        assert!(left.iter().all(|&x| x == 0.0));
        assert!(right.iter().all(|&x| x > 0.0));
    }

    #[test]
    fn test_gains_ramp_per_sample() {
        let mut stage = stage(1);
        stage.set_boost(4.0);
        let mut mono = [0.05_f64; 2];
        stage.process_block(&mut AudioBlock::mono(&mut mono));
        // 1 ms smoothing: the second sample has more drive than the first
        assert!(mono[1] > mono[0]);
    }
}
