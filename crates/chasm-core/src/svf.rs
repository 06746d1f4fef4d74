//! State variable filter (highpass / lowpass).
//!
//! # Topology
//!
//! Topology-Preserving Transform (TPT) SVF after Zavalishin, "The Art of VA
//! Filter Design" (2012). Trapezoidal integration keeps the analog prototype's
//! response and stays stable while the cutoff is swept.
//!
//! One set of coefficients is shared by every channel; each channel keeps its
//! own pair of integrator states, so left and right never bleed into each
//! other.
//!
//! # Reference
//!
//! Zavalishin, "The Art of VA Filter Design", rev. 2.1.2 (2018), Chapter 3.

use crate::Sample;
use crate::math::flush_denormal;

/// Maximum number of independent channel states.
pub const MAX_CHANNELS: usize = 2;

/// Butterworth Q.
pub const BUTTERWORTH_Q: f64 = 0.707;

/// Which output the filter produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TptType {
    /// Passes frequencies above the cutoff.
    #[default]
    Highpass,
    /// Passes frequencies below the cutoff.
    Lowpass,
}

#[derive(Debug, Clone, Copy, Default)]
struct ChannelState<S: Sample> {
    ic1eq: S,
    ic2eq: S,
}

/// Two-pole (12 dB/oct) TPT state variable filter.
///
/// ## Parameters
///
/// - `cutoff`: Hz, clamped to `0..sample_rate/2 - 1`
/// - `resonance`: Q factor (default 0.707)
///
/// # Example
///
/// ```rust
/// use chasm_core::{TptFilter, TptType};
///
/// let mut hp = TptFilter::<f32>::new(TptType::Highpass);
/// hp.prepare(48000.0);
/// hp.set_cutoff(200.0);
///
/// let left = hp.process(0, 0.5);
/// let right = hp.process(1, -0.5);
/// assert_eq!(left, -right);
/// ```
#[derive(Debug, Clone)]
pub struct TptFilter<S: Sample = f32> {
    kind: TptType,
    state: [ChannelState<S>; MAX_CHANNELS],
    g: S,
    k: S,
    sample_rate: f64,
    cutoff: f64,
    resonance: f64,
}

impl<S: Sample> TptFilter<S> {
    /// Create a filter at 44.1 kHz, cutoff 1 kHz, Butterworth Q.
    pub fn new(kind: TptType) -> Self {
        let mut filter = Self {
            kind,
            state: [ChannelState::default(); MAX_CHANNELS],
            g: S::ZERO,
            k: S::ONE,
            sample_rate: 44100.0,
            cutoff: 1000.0,
            resonance: BUTTERWORTH_Q,
        };
        filter.update_coefficients();
        filter
    }

    /// Set the sample rate, re-clamp the cutoff and clear state.
    pub fn prepare(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.set_cutoff(self.cutoff);
        self.reset();
    }

    /// Filter type.
    pub fn kind(&self) -> TptType {
        self.kind
    }

    /// Change the filter type. State is kept.
    pub fn set_kind(&mut self, kind: TptType) {
        self.kind = kind;
    }

    /// Set cutoff frequency in Hz.
    pub fn set_cutoff(&mut self, freq: f64) {
        let max = (self.sample_rate * 0.5 - 1.0).max(0.0);
        self.cutoff = if freq.is_nan() { 0.0 } else { freq.clamp(0.0, max) };
        self.update_coefficients();
    }

    /// Current (clamped) cutoff in Hz.
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Set resonance as a Q factor (floored at 0.1).
    pub fn set_resonance(&mut self, q: f64) {
        self.resonance = q.max(0.1);
        self.update_coefficients();
    }

    /// Current Q factor.
    pub fn resonance(&self) -> f64 {
        self.resonance
    }

    /// Process one sample on `channel`.
    ///
    /// Channels beyond [`MAX_CHANNELS`] pass through untouched.
    #[inline]
    pub fn process(&mut self, channel: usize, input: S) -> S {
        let Some(state) = self.state.get_mut(channel) else {
            return input;
        };

        let g = self.g;
        let k = self.k;

        let v3 = input - state.ic2eq;
        let v1 = (g * v3 + state.ic1eq) / (S::ONE + g * (g + k));
        let v2 = state.ic2eq + g * v1;

        let two = S::from_f64(2.0);
        state.ic1eq = flush_denormal(two * v1 - state.ic1eq);
        state.ic2eq = flush_denormal(two * v2 - state.ic2eq);

        match self.kind {
            TptType::Lowpass => v2,
            TptType::Highpass => input - k * v1 - v2,
        }
    }

    /// Clear every channel's integrator state.
    pub fn reset(&mut self) {
        self.state = [ChannelState::default(); MAX_CHANNELS];
    }

    fn update_coefficients(&mut self) {
        // g = tan(pi * fc / fs), k = 1/Q
        self.g = S::from_f64(libm::tan(
            core::f64::consts::PI * self.cutoff / self.sample_rate,
        ));
        self.k = S::from_f64(1.0 / self.resonance);
    }
}
