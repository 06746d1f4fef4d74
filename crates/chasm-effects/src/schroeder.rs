//! Schroeder allpass diffusion chain.
//!
//! Four [`AllpassFilter`]s in strict series. A single base delay is spread
//! across the filters by near-coprime ratios so their echo trains interleave
//! instead of piling up on the same taps, and a single character control sets
//! the shared feedback.
//!
//! # Signal Flow
//!
//! ```text
//! x → AP(0.41·D) → AP(0.66·D) → AP(0.97·D) → AP(1.25·D) → y
//!          ↑            ↑            ↑            ↑
//!          └──────── shared feedback g(character) ┘
//! ```
//!
//! # Parameters
//!
//! | Parameter | Range | Smoothing |
//! |-----------|-------|-----------|
//! | Base delay | 1–100 ms | 50 ms |
//! | Character | 0.1–10 | 10 ms |
//!
//! Character maps to feedback as `clamp(0.3 + 0.6·log10(c), 0.1, 0.9)`, so
//! 1.0 gives 0.3, 10 gives 0.9 and anything below ~0.46 sits on the 0.1 floor.

use chasm_core::{AllpassFilter, Effect, Sample, SmoothedParam};

/// Number of allpass stages.
pub const NUM_STAGES: usize = 4;

/// Per-stage multipliers applied to the base delay.
pub const DELAY_RATIOS: [f64; NUM_STAGES] = [0.41, 0.66, 0.97, 1.25];

/// Stage delays before the first processed sample, in milliseconds.
pub const DEFAULT_DELAYS_MS: [f64; NUM_STAGES] = [12.3, 19.7, 29.1, 37.4];

/// Delay line length each stage is prepared with, in milliseconds.
pub const MAX_DELAY_MS: f64 = 100.0;

/// Base delay range in milliseconds.
pub const DELAY_RANGE_MS: (f64, f64) = (1.0, 100.0);

/// Character range.
pub const CHARACTER_RANGE: (f64, f64) = (0.1, 10.0);

const DEFAULT_FEEDBACK: f64 = 0.7;
const DELAY_SMOOTHING_MS: f64 = 50.0;
const CHARACTER_SMOOTHING_MS: f64 = 10.0;

/// Map a character value to the shared allpass feedback.
///
/// Non-positive or NaN input lands on the 0.1 floor.
///
/// ```rust
/// use chasm_effects::schroeder::character_to_feedback;
///
/// assert!((character_to_feedback(1.0_f64) - 0.3).abs() < 1e-12);
/// assert!((character_to_feedback(10.0_f64) - 0.9).abs() < 1e-12);
/// assert_eq!(character_to_feedback(0.1_f64), 0.1);
/// ```
#[inline]
pub fn character_to_feedback<S: Sample>(character: S) -> S {
    let raw = S::from_f64(0.3) + S::from_f64(0.6) * character.log10();
    raw.clamp(S::from_f64(0.1), S::from_f64(0.9))
}

/// Four series allpasses sharing a smoothed base delay and feedback.
///
/// Delay and feedback are recomputed from the smoothers on every sample, so
/// control changes never step.
///
/// # Example
///
/// ```rust
/// use chasm_core::Effect;
/// use chasm_effects::SchroederAllpassChain;
///
/// let mut chain = SchroederAllpassChain::<f32>::new();
/// chain.prepare(48000.0, 30.0, 1.0);
/// chain.set_character(4.0);
///
/// let y = chain.process(1.0);
/// assert!(y.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct SchroederAllpassChain<S: Sample = f32> {
    stages: [AllpassFilter<S>; NUM_STAGES],
    delay_ms: SmoothedParam<S>,
    character: SmoothedParam<S>,
}

impl<S: Sample> SchroederAllpassChain<S> {
    /// Unprepared chain. Outputs silence until [`prepare`](Self::prepare).
    pub fn new() -> Self {
        Self {
            stages: Default::default(),
            delay_ms: SmoothedParam::new(S::from_f64(30.0)),
            character: SmoothedParam::new(S::ONE),
        }
    }

    /// Size every stage for [`MAX_DELAY_MS`], load the default stage delays
    /// and feedback, and settle both smoothers on the given values.
    pub fn prepare(&mut self, sample_rate: f64, initial_delay_ms: S, initial_character: S) {
        for (stage, &delay_ms) in self.stages.iter_mut().zip(DEFAULT_DELAYS_MS.iter()) {
            stage.prepare(sample_rate, MAX_DELAY_MS);
            stage.set_delay_ms(delay_ms);
            stage.set_feedback(S::from_f64(DEFAULT_FEEDBACK));
        }

        self.delay_ms.prepare(sample_rate, DELAY_SMOOTHING_MS);
        self.character.prepare(sample_rate, CHARACTER_SMOOTHING_MS);

        self.set_delay_ms(initial_delay_ms);
        self.set_character(initial_character);
        self.delay_ms.snap_to_target();
        self.character.snap_to_target();
    }

    /// Set the base delay target in milliseconds, clamped to [`DELAY_RANGE_MS`].
    pub fn set_delay_ms(&mut self, delay_ms: S) {
        let (lo, hi) = DELAY_RANGE_MS;
        self.delay_ms
            .set_target(delay_ms.clamp(S::from_f64(lo), S::from_f64(hi)));
    }

    /// Base delay target in milliseconds.
    pub fn delay_ms(&self) -> S {
        self.delay_ms.target()
    }

    /// Set the character target, clamped to [`CHARACTER_RANGE`].
    pub fn set_character(&mut self, character: S) {
        let (lo, hi) = CHARACTER_RANGE;
        self.character
            .set_target(character.clamp(S::from_f64(lo), S::from_f64(hi)));
    }

    /// Character target.
    pub fn character(&self) -> S {
        self.character.target()
    }

    /// Feedback currently loaded into the stages.
    pub fn feedback(&self) -> S {
        self.stages[0].feedback()
    }

    /// Delay currently loaded into stage `index`, in samples.
    pub fn stage_delay_samples(&self, index: usize) -> Option<f64> {
        self.stages.get(index).map(AllpassFilter::delay_samples)
    }

    #[inline]
    fn update_stages(&mut self) {
        let base_ms = self.delay_ms.advance();
        let feedback = character_to_feedback(self.character.advance());

        for (stage, &ratio) in self.stages.iter_mut().zip(DELAY_RATIOS.iter()) {
            stage.set_delay_ms(base_ms.to_f64() * ratio);
            stage.set_feedback(feedback);
        }
    }
}

impl<S: Sample> Default for SchroederAllpassChain<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Sample> Effect<S> for SchroederAllpassChain<S> {
    #[inline]
    fn process(&mut self, input: S) -> S {
        self.update_stages();
        self.stages
            .iter_mut()
            .fold(input, |signal, stage| stage.process(signal))
    }

    /// Clear every delay line and settle the smoothers on their targets.
    fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
        self.delay_ms.snap_to_target();
        self.character.snap_to_target();
    }
}
