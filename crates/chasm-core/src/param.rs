//! Parameter handling with smoothing for zipper-free changes.
//!
//! Audio parameters (gain, mix, filter cutoff) need smooth transitions to
//! avoid audible "zipper noise" when values change. [`SmoothedParam`] is a
//! one-pole exponential ramp advanced once per sample.
//!
//! ## Usage
//!
//! ```rust
//! use chasm_core::SmoothedParam;
//!
//! let mut gain = SmoothedParam::<f32>::new(1.0);
//! gain.prepare(48000.0, 10.0); // 10ms smoothing
//!
//! // Set new target - smoothing happens automatically
//! gain.set_target(0.5);
//!
//! // In audio callback, get smoothed value each sample
//! for _ in 0..480 {
//!     let smoothed_gain = gain.advance();
//!     // Use smoothed_gain for processing...
//! }
//! ```

use crate::Sample;

/// A parameter with built-in exponential smoothing.
///
/// Written from the control side via [`set_target`](Self::set_target), read on
/// the audio side with [`advance`](Self::advance). The current value moves
/// geometrically toward the target and never overshoots it.
#[derive(Debug, Clone)]
pub struct SmoothedParam<S: Sample = f32> {
    /// Current smoothed value
    current: S,
    /// Target value we're smoothing towards
    target: S,
    /// Smoothing coefficient in `(0, 1]` (1 = instant)
    coeff: S,
    sample_rate: f64,
    smoothing_time_ms: f64,
}

impl<S: Sample> SmoothedParam<S> {
    /// Create a new smoothed parameter with initial value.
    ///
    /// Smoothing is disabled (instant changes) until [`prepare`](Self::prepare).
    pub fn new(initial: S) -> Self {
        Self {
            current: initial,
            target: initial,
            coeff: S::ONE,
            sample_rate: 44100.0,
            smoothing_time_ms: 0.0,
        }
    }

    /// Create a prepared parameter in one step.
    pub fn with_config(initial: S, sample_rate: f64, smoothing_time_ms: f64) -> Self {
        let mut param = Self::new(initial);
        param.prepare(sample_rate, smoothing_time_ms);
        param
    }

    /// Configure sample rate and smoothing time, recomputing the coefficient.
    ///
    /// Current and target values are left untouched.
    pub fn prepare(&mut self, sample_rate: f64, smoothing_time_ms: f64) {
        self.sample_rate = sample_rate;
        self.smoothing_time_ms = smoothing_time_ms;
        self.recalculate_coeff();
    }

    /// Set the target value (parameter will smooth towards this).
    #[inline]
    pub fn set_target(&mut self, target: S) {
        self.target = target;
    }

    /// Set both current and target to `value`.
    #[inline]
    pub fn reset(&mut self, value: S) {
        self.target = value;
        self.current = value;
    }

    /// Skip ahead to the target value immediately.
    #[inline]
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
    }

    /// Get the next smoothed value (advances by one sample).
    ///
    /// Call this exactly once per sample.
    #[inline]
    pub fn advance(&mut self) -> S {
        // y[n] = y[n-1] + coeff * (target - y[n-1])
        self.current += self.coeff * (self.target - self.current);
        self.current
    }

    /// Fill `output` with successive smoothed values toward `target`.
    pub fn fill(&mut self, output: &mut [S], target: S) {
        self.set_target(target);
        for sample in output.iter_mut() {
            *sample = self.advance();
        }
    }

    /// Get the current smoothed value without advancing.
    #[inline]
    pub fn get(&self) -> S {
        self.current
    }

    /// Get the target value.
    #[inline]
    pub fn target(&self) -> S {
        self.target
    }

    /// Smoothing coefficient in `(0, 1]`.
    #[inline]
    pub fn coefficient(&self) -> S {
        self.coeff
    }

    /// Configured smoothing time in milliseconds.
    pub fn smoothing_time_ms(&self) -> f64 {
        self.smoothing_time_ms
    }

    /// `true` once the current value is within `1e-6` of the target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        (self.current - self.target).abs() < S::from_f64(1e-6)
    }

    /// `coeff = 1 - exp(-1 / (tau * sample_rate))` with `tau` in seconds.
    ///
    /// After 5 tau the value is within 0.7% of the target. A zero smoothing
    /// time gives coeff = 1 (instant).
    fn recalculate_coeff(&mut self) {
        if self.smoothing_time_ms <= 0.0 || self.sample_rate <= 0.0 {
            self.coeff = S::ONE;
        } else {
            let samples = self.smoothing_time_ms * 0.001 * self.sample_rate;
            self.coeff = S::from_f64(1.0 - libm::exp(-1.0 / samples));
        }
    }
}

impl<S: Sample> Default for SmoothedParam<S> {
    fn default() -> Self {
        Self::new(S::ZERO)
    }
}
