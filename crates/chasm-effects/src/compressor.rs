//! Hard-knee feed-forward compressor.
//!
//! # Signal Flow
//!
//! ```text
//! Input → Envelope Follower → Gain Computer → × → Output
//!   └──────────────────────────────────────────┘
//! ```
//!
//! The detector is a peak envelope with separate attack and release. Above
//! the threshold the gain computer applies
//!
//! ```text
//! gain = (env / threshold)^(1/ratio - 1)
//! ```
//!
//! which is the usual `threshold + (level - threshold) / ratio` static curve
//! expressed in the linear domain. There is no knee and no makeup gain.

use chasm_core::{EnvelopeFollower, Effect, Sample, db_to_linear};

/// Static curve and ballistics for a [`Compressor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorSettings {
    /// Threshold in dBFS.
    pub threshold_db: f64,
    /// Compression ratio (`n` in `n:1`). Values below 1 are treated as 1.
    pub ratio: f64,
    /// Attack time in milliseconds.
    pub attack_ms: f64,
    /// Release time in milliseconds.
    pub release_ms: f64,
}

impl CompressorSettings {
    /// Build a settings tuple.
    pub const fn new(threshold_db: f64, ratio: f64, attack_ms: f64, release_ms: f64) -> Self {
        Self {
            threshold_db,
            ratio,
            attack_ms,
            release_ms,
        }
    }
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self::new(0.0, 1.0, 10.0, 100.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct GainComputer<S: Sample> {
    threshold: S,
    exponent: S,
}

impl<S: Sample> GainComputer<S> {
    fn from_settings(settings: &CompressorSettings) -> Self {
        let ratio = settings.ratio.max(1.0);
        Self {
            threshold: db_to_linear(S::from_f64(settings.threshold_db)),
            exponent: S::from_f64(1.0 / ratio - 1.0),
        }
    }

    #[inline]
    fn gain(&self, envelope: S) -> S {
        if envelope > self.threshold {
            (envelope / self.threshold).powf(self.exponent)
        } else {
            S::ONE
        }
    }
}

/// Peak-detecting hard-knee compressor.
///
/// Starts as a 1:1 pass-through; load a curve with
/// [`apply`](Self::apply).
///
/// # Example
///
/// ```rust
/// use chasm_core::Effect;
/// use chasm_effects::{Compressor, CompressorSettings};
///
/// let mut comp = Compressor::<f32>::new();
/// comp.prepare(48000.0);
/// comp.apply(CompressorSettings::new(-20.0, 4.0, 10.0, 80.0));
///
/// let mut y = 0.0;
/// for _ in 0..4800 {
///     y = comp.process(1.0);
/// }
/// assert!(y < 0.3);
/// ```
#[derive(Debug, Clone)]
pub struct Compressor<S: Sample = f32> {
    settings: CompressorSettings,
    computer: GainComputer<S>,
    envelope: EnvelopeFollower<S>,
    last_gain: S,
}

impl<S: Sample> Compressor<S> {
    /// Pass-through compressor at 44.1 kHz.
    pub fn new() -> Self {
        let settings = CompressorSettings::default();
        Self {
            computer: GainComputer::from_settings(&settings),
            envelope: EnvelopeFollower::with_times(
                44100.0,
                settings.attack_ms,
                settings.release_ms,
            ),
            settings,
            last_gain: S::ONE,
        }
    }

    /// Set the detector sample rate and clear state.
    pub fn prepare(&mut self, sample_rate: f64) {
        self.envelope.prepare(sample_rate);
        self.reset();
    }

    /// Load a new curve and ballistics. Detector state is kept.
    pub fn apply(&mut self, settings: CompressorSettings) {
        self.settings = settings;
        self.computer = GainComputer::from_settings(&settings);
        self.envelope.set_attack_ms(settings.attack_ms);
        self.envelope.set_release_ms(settings.release_ms);
    }

    /// Current settings.
    pub fn settings(&self) -> CompressorSettings {
        self.settings
    }

    /// Gain applied to the most recent sample, in dB (never positive).
    pub fn gain_reduction_db(&self) -> S {
        chasm_core::linear_to_db(self.last_gain)
    }
}

impl<S: Sample> Default for Compressor<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Sample> Effect<S> for Compressor<S> {
    #[inline]
    fn process(&mut self, input: S) -> S {
        let envelope = self.envelope.process(input);
        self.last_gain = self.computer.gain(envelope);
        input * self.last_gain
    }

    fn reset(&mut self) {
        self.envelope.reset();
        self.last_gain = S::ONE;
    }
}
