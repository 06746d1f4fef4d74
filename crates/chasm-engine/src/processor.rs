//! The chasm block processor.
//!
//! # Signal Flow
//!
//! ```text
//!            ┌──────────────────────── dry copy ─────────────────────────┐
//!            │                                                           ▼
//! input ─────┼─→ × input gain → allpass chain → low cut → high cut ─→ wet buffer
//!            │                      (per sample)                         │
//!            │   brightness → Haas → width → loudness  ◀─────────────────┘
//!            │                 (per block)                │
//!            └──────→ dry·(1 − mix) + wet·mix ◀───────────┘
//!                              │
//!                        × output gain → [output limiter] → output
//! ```
//!
//! Gain, mix and cut frequencies are smoothed and applied every sample.
//! Delay, character, brightness, width and Haas targets are smoothed every
//! sample but only pushed into their stages every `control_interval`
//! samples, starting with the first sample of each block.

use chasm_core::{
    AudioBlock, Effect, Sample, SmoothedParam, StereoBuffer, StereoEffect, db_to_linear,
    percent_to_normalized,
};
use chasm_effects::{
    BrickWallLimiter, BrightnessEq, CutFilter, CutKind, HaasEffect, LoudnessStage,
    SchroederAllpassChain, SmoothLimiter, StereoEnhancer,
};

use crate::config::{EngineConfig, OutputLimiter};
use crate::error::ConfigError;
use crate::params::ChasmParams;
use crate::spec::ProcessSpec;

const GAIN_SMOOTHING_MS: f64 = 1.0;
const CONTROL_SMOOTHING_MS: f64 = 5.0;
const HAAS_SMOOTHING_MS: f64 = 1.0;

#[inline]
fn to_sample<S: Sample>(value: f32) -> S {
    S::from_f64(f64::from(value))
}

/// Allpass diffusion, tone, stereo and loudness chain under one dry/wet mix.
///
/// Generic over [`Sample`]; `f32` by default.
///
/// # Example
///
/// ```rust
/// use chasm_engine::{ChasmParams, ChasmProcessor, ProcessSpec};
///
/// let spec = ProcessSpec::new(48000.0, 256, 2)?;
/// let params = ChasmParams { mix_percent: 40.0, ..ChasmParams::default() };
///
/// let mut processor = ChasmProcessor::<f32>::new();
/// processor.prepare(&spec, &params);
///
/// let mut left = vec![0.0_f32; 256];
/// let mut right = vec![0.0_f32; 256];
/// left[0] = 1.0;
/// processor.process(&mut [&mut left[..], &mut right[..]]);
/// assert!(left.iter().chain(&right).all(|x| x.is_finite()));
/// # Ok::<(), chasm_engine::SpecError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ChasmProcessor<S: Sample = f32> {
    spec: Option<ProcessSpec>,
    config: EngineConfig,
    initial: ChasmParams,
    current: ChasmParams,

    input_gain: SmoothedParam<S>,
    output_gain: SmoothedParam<S>,
    mix: SmoothedParam<S>,
    delay_ms: SmoothedParam<S>,
    brightness_db: SmoothedParam<S>,
    character: SmoothedParam<S>,
    low_cut_hz: SmoothedParam<S>,
    high_cut_hz: SmoothedParam<S>,
    width_percent: SmoothedParam<S>,
    haas_ms: SmoothedParam<S>,

    chains: [SchroederAllpassChain<S>; 2],
    low_cut: CutFilter<S>,
    high_cut: CutFilter<S>,
    brightness: BrightnessEq<S>,
    haas: HaasEffect<S>,
    enhancer: StereoEnhancer<S>,
    loudness: LoudnessStage<S>,
    brick_wall: BrickWallLimiter<S>,
    smooth_limiter: SmoothLimiter<S>,

    dry: StereoBuffer<S>,
    wet: StereoBuffer<S>,
}

impl<S: Sample> ChasmProcessor<S> {
    /// Unprepared processor with the default [`EngineConfig`].
    ///
    /// [`process`](Self::process) leaves audio untouched until
    /// [`prepare`](Self::prepare) has run.
    pub fn new() -> Self {
        let defaults = ChasmParams::default();
        let mut processor = Self {
            spec: None,
            config: EngineConfig::default(),
            initial: defaults,
            current: defaults,

            input_gain: SmoothedParam::new(S::ONE),
            output_gain: SmoothedParam::new(S::ONE),
            mix: SmoothedParam::new(S::HALF),
            delay_ms: SmoothedParam::new(to_sample(defaults.delay_ms)),
            brightness_db: SmoothedParam::new(S::ZERO),
            character: SmoothedParam::new(to_sample(defaults.character)),
            low_cut_hz: SmoothedParam::new(to_sample(defaults.low_cut_hz)),
            high_cut_hz: SmoothedParam::new(to_sample(defaults.high_cut_hz)),
            width_percent: SmoothedParam::new(to_sample(defaults.width_percent)),
            haas_ms: SmoothedParam::new(S::ZERO),

            chains: [SchroederAllpassChain::new(), SchroederAllpassChain::new()],
            low_cut: CutFilter::new(CutKind::LowCut),
            high_cut: CutFilter::new(CutKind::HighCut),
            brightness: BrightnessEq::new(),
            haas: HaasEffect::new(),
            enhancer: StereoEnhancer::new(),
            loudness: LoudnessStage::new(),
            brick_wall: BrickWallLimiter::new(),
            smooth_limiter: SmoothLimiter::new(),

            dry: StereoBuffer::default(),
            wet: StereoBuffer::default(),
        };
        processor.configure_limiter(OutputLimiter::Off);
        processor
    }

    /// Unprepared processor with a validated configuration.
    pub fn with_config(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut processor = Self::new();
        processor.configure_limiter(config.output_limiter);
        processor.config = config;
        Ok(processor)
    }

    /// Allocate buffers and delay lines for `spec` and settle every stage on
    /// `params`, which also become the values [`reset`](Self::reset) returns
    /// to.
    pub fn prepare(&mut self, spec: &ProcessSpec, params: &ChasmParams) {
        let sample_rate = spec.sample_rate();
        tracing::info!(
            sample_rate,
            max_block_size = spec.max_block_size(),
            channels = spec.channels(),
            "preparing chasm processor"
        );

        self.spec = Some(*spec);
        self.initial = Self::checked(params);
        let p = self.initial;

        self.input_gain.prepare(sample_rate, GAIN_SMOOTHING_MS);
        self.output_gain.prepare(sample_rate, GAIN_SMOOTHING_MS);
        for smoother in [
            &mut self.mix,
            &mut self.delay_ms,
            &mut self.brightness_db,
            &mut self.character,
            &mut self.low_cut_hz,
            &mut self.high_cut_hz,
            &mut self.width_percent,
        ] {
            smoother.prepare(sample_rate, CONTROL_SMOOTHING_MS);
        }
        self.haas_ms.prepare(sample_rate, HAAS_SMOOTHING_MS);

        for chain in &mut self.chains {
            chain.prepare(sample_rate, to_sample(p.delay_ms), to_sample(p.character));
        }
        self.low_cut.prepare(sample_rate);
        self.high_cut.prepare(sample_rate);
        self.brightness.prepare(sample_rate);
        self.haas.prepare(sample_rate, to_sample(p.haas_ms));
        self.enhancer.prepare(sample_rate, to_sample(p.width_percent));
        self.loudness.prepare(
            sample_rate,
            db_to_linear(to_sample(p.loudness_input_gain_db)),
            db_to_linear(to_sample(p.loudness_boost_db)),
        );
        self.smooth_limiter.prepare(sample_rate);
        self.configure_limiter(self.config.output_limiter);

        // Mono specs still get a right buffer so stereo blocks never allocate
        self.dry.resize(2, spec.max_block_size());
        self.wet.resize(2, spec.max_block_size());

        self.reset();
    }

    /// Set new control targets in user units.
    ///
    /// Values are clamped to their ranges; NaN and infinities are replaced
    /// by defaults. Gains and mix ramp over 1 ms, the rest over 5 ms.
    ///
    /// # Real-time use
    ///
    /// Steady controls never log. A non-finite control emits a `warn!` event
    /// and a loudness mode change emits a `debug!` event. When this runs on
    /// the audio callback, install a subscriber that does not block on I/O
    /// (or filter these targets out); otherwise call it from the control
    /// thread between blocks.
    pub fn update(&mut self, params: &ChasmParams) {
        let p = Self::checked(params);
        self.current = p;

        self.input_gain.set_target(db_to_linear(to_sample(p.input_gain_db)));
        self.output_gain
            .set_target(db_to_linear(to_sample(p.output_gain_db)));
        self.mix
            .set_target(percent_to_normalized(to_sample(p.mix_percent)));
        self.delay_ms.set_target(to_sample(p.delay_ms));
        self.brightness_db.set_target(to_sample(p.brightness_db));
        self.character.set_target(to_sample(p.character));
        self.low_cut_hz.set_target(to_sample(p.low_cut_hz));
        self.high_cut_hz.set_target(to_sample(p.high_cut_hz));
        self.width_percent.set_target(to_sample(p.width_percent));
        self.haas_ms.set_target(to_sample(p.haas_ms));

        self.loudness
            .set_input_gain(db_to_linear(to_sample(p.loudness_input_gain_db)));
        self.loudness
            .set_boost(db_to_linear(to_sample(p.loudness_boost_db)));
        self.loudness.set_mode_index(p.loudness_mode);
    }

    /// Return to the values given to [`prepare`](Self::prepare) and clear all
    /// filter, delay and envelope state.
    pub fn reset(&mut self) {
        tracing::debug!("resetting chasm processor");
        let p = self.initial;
        self.update(&p);

        for smoother in [
            &mut self.input_gain,
            &mut self.output_gain,
            &mut self.mix,
            &mut self.delay_ms,
            &mut self.brightness_db,
            &mut self.character,
            &mut self.low_cut_hz,
            &mut self.high_cut_hz,
            &mut self.width_percent,
            &mut self.haas_ms,
        ] {
            smoother.snap_to_target();
        }

        self.push_control_targets();
        for chain in &mut self.chains {
            Effect::reset(chain);
        }
        self.low_cut.reset();
        self.high_cut.reset();
        self.low_cut.set_cutoff(self.low_cut_hz.get());
        self.high_cut.set_cutoff(self.high_cut_hz.get());
        StereoEffect::reset(&mut self.brightness);
        StereoEffect::reset(&mut self.haas);
        StereoEffect::reset(&mut self.enhancer);
        StereoEffect::reset(&mut self.loudness);
        StereoEffect::reset(&mut self.smooth_limiter);

        self.dry.clear();
        self.wet.clear();
    }

    /// Replace the values [`reset`](Self::reset) returns to, then reset.
    pub fn reset_with(&mut self, params: &ChasmParams) {
        self.initial = Self::checked(params);
        self.reset();
    }

    /// Switch the output limiter.
    pub fn set_output_limiter(&mut self, limiter: OutputLimiter) -> Result<(), ConfigError> {
        let config = EngineConfig {
            output_limiter: limiter,
            ..self.config.clone()
        };
        config.validate()?;
        tracing::debug!(?limiter, "output limiter changed");
        self.configure_limiter(limiter);
        self.config = config;
        Ok(())
    }

    /// Process host channel slices in place (one slice is mono, two or more
    /// are stereo over the first two).
    pub fn process(&mut self, channels: &mut [&mut [S]]) {
        if let Some(mut block) = AudioBlock::from_channels(channels) {
            self.process_block(&mut block);
        }
    }

    /// Process a block in place.
    ///
    /// Blocks longer than the prepared maximum are split into chunks of that
    /// size. Before [`prepare`](Self::prepare) the block is left unchanged.
    pub fn process_block(&mut self, block: &mut AudioBlock<'_, S>) {
        let Some(spec) = self.spec else {
            return;
        };
        let max_block = spec.max_block_size();

        let len = block.len();
        let (left, mut right) = block.split_mut();
        let mut start = 0;
        while start < len {
            let end = (start + max_block).min(len);
            let mut chunk = match right.as_deref_mut() {
                Some(right) => AudioBlock::stereo(&mut left[start..end], &mut right[start..end]),
                None => AudioBlock::mono(&mut left[start..end]),
            };
            self.process_chunk(&mut chunk);
            start = end;
        }
    }

    /// Whether [`prepare`](Self::prepare) has run.
    pub fn is_prepared(&self) -> bool {
        self.spec.is_some()
    }

    /// Spec from the last [`prepare`](Self::prepare).
    pub fn spec(&self) -> Option<&ProcessSpec> {
        self.spec.as_ref()
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Sanitized controls from the last update.
    pub fn params(&self) -> &ChasmParams {
        &self.current
    }

    /// Sanitized controls [`reset`](Self::reset) returns to.
    pub fn initial_params(&self) -> &ChasmParams {
        &self.initial
    }

    /// Whether the loudness stage is switched in.
    pub fn loudness_enabled(&self) -> bool {
        self.loudness.is_enabled()
    }

    fn checked(params: &ChasmParams) -> ChasmParams {
        for control in params.non_finite() {
            tracing::warn!(
                control = control.name(),
                "non-finite control value replaced with default"
            );
        }
        params.sanitized()
    }

    fn configure_limiter(&mut self, limiter: OutputLimiter) {
        self.brick_wall.set_enabled(false);
        self.smooth_limiter.set_enabled(false);
        match limiter {
            OutputLimiter::Off => {}
            OutputLimiter::BrickWall { ceiling } => {
                self.brick_wall.set_ceiling(S::from_f64(ceiling));
                self.brick_wall.set_enabled(true);
            }
            OutputLimiter::Smooth { ceiling_db } => {
                self.smooth_limiter.set_ceiling_db(S::from_f64(ceiling_db));
                self.smooth_limiter.set_enabled(true);
            }
        }
    }

    fn push_control_targets(&mut self) {
        let delay_ms = self.delay_ms.get();
        let character = self.character.get();
        for chain in &mut self.chains {
            chain.set_delay_ms(delay_ms);
            chain.set_character(character);
        }
        self.brightness.set_brightness(self.brightness_db.get());
        self.enhancer.set_width(self.width_percent.get());
        self.haas.set_delay_ms(self.haas_ms.get());
    }

    fn process_chunk(&mut self, block: &mut AudioBlock<'_, S>) {
        let len = block.len().min(self.dry.capacity());
        if len == 0 {
            return;
        }
        let stereo = block.is_stereo();
        let interval = self.config.control_interval.max(1);

        self.dry.copy_from(block);

        for i in 0..len {
            let input_gain = self.input_gain.advance();
            self.delay_ms.advance();
            self.brightness_db.advance();
            self.character.advance();
            self.width_percent.advance();
            self.haas_ms.advance();

            let low_cut_hz = self.low_cut_hz.advance();
            let high_cut_hz = self.high_cut_hz.advance();
            self.low_cut.set_cutoff(low_cut_hz);
            self.high_cut.set_cutoff(high_cut_hz);

            if i % interval == 0 {
                self.push_control_targets();
            }

            let left = self.chains[0].process(self.dry.left[i] * input_gain);
            let left = self.low_cut.process(0, left);
            self.wet.left[i] = self.high_cut.process(0, left);

            if stereo {
                let right = self.chains[1].process(self.dry.right[i] * input_gain);
                let right = self.low_cut.process(1, right);
                self.wet.right[i] = self.high_cut.process(1, right);
            }
        }

        let mut wet = if stereo {
            AudioBlock::stereo(&mut self.wet.left[..len], &mut self.wet.right[..len])
        } else {
            AudioBlock::mono(&mut self.wet.left[..len])
        };
        self.brightness.process_block(&mut wet);
        self.haas.process_block(&mut wet);
        self.enhancer.process_block(&mut wet);
        self.loudness.process_block(&mut wet);

        let (out_left, mut out_right) = block.split_mut();
        for i in 0..len {
            let mix = self.mix.advance();
            let dry_gain = S::ONE - mix;
            let output_gain = self.output_gain.advance();

            out_left[i] = (self.dry.left[i] * dry_gain + self.wet.left[i] * mix) * output_gain;
            if let Some(out_right) = out_right.as_deref_mut() {
                out_right[i] =
                    (self.dry.right[i] * dry_gain + self.wet.right[i] * mix) * output_gain;
            }
        }

        match self.config.output_limiter {
            OutputLimiter::Off => {}
            OutputLimiter::BrickWall { .. } => self.brick_wall.process_block(block),
            OutputLimiter::Smooth { .. } => self.smooth_limiter.process_block(block),
        }
    }
}

impl<S: Sample> Default for ChasmProcessor<S> {
    fn default() -> Self {
        Self::new()
    }
}
