//! Mathematical utility functions for DSP.
//!
//! All functions are allocation-free, generic over [`Sample`] and usable in
//! `no_std` builds.
//!
//! # Level Conversions
//!
//! - [`db_to_linear`] / [`linear_to_db`] - Convert between dB and linear gain
//!
//! # Control Mappings
//!
//! Host controls arrive either in user units or as normalized `0..=1` values:
//!
//! | Function | Mapping |
//! |----------|---------|
//! | [`percent_to_normalized`] | `p / 100`, clamped to `0..=1` |
//! | [`normalized_to_delay_ms`] | `1 + 99·n²` (1 to 100 ms) |
//! | [`normalized_to_q`] | `0.1·100^n` (0.1 to 10) |
//!
//! # Waveshaping
//!
//! - [`soft_clip`] - `tanh`
//! - [`hard_clip`] - Clamp to `±threshold`

use crate::Sample;

/// Magnitudes below this are flushed to zero by [`flush_denormal`].
pub const DENORMAL_THRESHOLD: f64 = 1e-30;

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use chasm_core::db_to_linear;
///
/// assert_eq!(db_to_linear(0.0_f32), 1.0);
/// assert!((db_to_linear(-6.02_f32) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear<S: Sample>(db: S) -> S {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    let factor = S::from_f64(core::f64::consts::LN_10 / 20.0);
    (db * factor).exp()
}

/// Convert linear gain to decibels.
///
/// Input is floored at `1e-6` (-120 dB) so silence maps to a finite value.
///
/// # Example
/// ```rust
/// use chasm_core::linear_to_db;
///
/// assert!(linear_to_db(1.0_f32).abs() < 1e-6);
/// assert!((linear_to_db(0.0_f64) + 120.0).abs() < 1e-9);
/// ```
#[inline]
pub fn linear_to_db<S: Sample>(linear: S) -> S {
    S::from_f64(20.0) * linear.max(S::from_f64(1e-6)).log10()
}

/// Percent (`0..=100`) to normalized (`0..=1`), clamped.
#[inline]
pub fn percent_to_normalized<S: Sample>(percent: S) -> S {
    (percent / S::from_f64(100.0)).clamp(S::ZERO, S::ONE)
}

/// Normalized (`0..=1`) to percent (`0..=100`), clamped.
#[inline]
pub fn normalized_to_percent<S: Sample>(normalized: S) -> S {
    normalized.clamp(S::ZERO, S::ONE) * S::from_f64(100.0)
}

/// Normalized control to diffusion delay time in milliseconds.
///
/// Quadratic taper: fine resolution at short delays.
#[inline]
pub fn normalized_to_delay_ms<S: Sample>(normalized: S) -> S {
    let n = normalized.clamp(S::ZERO, S::ONE);
    S::ONE + S::from_f64(99.0) * n * n
}

/// Inverse of [`normalized_to_delay_ms`].
#[inline]
pub fn delay_ms_to_normalized<S: Sample>(delay_ms: S) -> S {
    let ms = delay_ms.clamp(S::ONE, S::from_f64(100.0));
    ((ms - S::ONE) / S::from_f64(99.0)).sqrt()
}

/// Normalized control to filter Q, exponential from 0.1 to 10.
#[inline]
pub fn normalized_to_q<S: Sample>(normalized: S) -> S {
    let n = normalized.clamp(S::ZERO, S::ONE);
    S::from_f64(0.1) * S::from_f64(100.0).powf(n)
}

/// Inverse of [`normalized_to_q`].
#[inline]
pub fn q_to_normalized<S: Sample>(q: S) -> S {
    let q = q.clamp(S::from_f64(0.1), S::from_f64(10.0));
    ((q / S::from_f64(0.1)).log10() * S::HALF).clamp(S::ZERO, S::ONE)
}

/// Soft clipping via `tanh`.
#[inline]
pub fn soft_clip<S: Sample>(x: S) -> S {
    x.tanh()
}

/// Hard clip to `[-threshold, threshold]`.
#[inline]
pub fn hard_clip<S: Sample>(x: S, threshold: S) -> S {
    x.clamp(-threshold, threshold)
}

/// Linear interpolation, `t = 0` gives `a`, `t = 1` gives `b`.
#[inline]
pub fn lerp<S: Sample>(a: S, b: S, t: S) -> S {
    a + (b - a) * t
}

/// Flush tiny values to zero.
///
/// Feedback paths decaying toward silence eventually reach subnormal range,
/// which is very slow on most CPUs.
#[inline]
pub fn flush_denormal<S: Sample>(x: S) -> S {
    if x.abs() < S::from_f64(DENORMAL_THRESHOLD) {
        S::ZERO
    } else {
        x
    }
}

/// Relative/absolute float comparison used to skip redundant coefficient
/// rebuilds.
#[inline]
pub fn approx_eq<S: Sample>(a: S, b: S) -> bool {
    if a == b {
        return true;
    }
    let diff = (a - b).abs();
    let scale = a.abs().max(b.abs()).max(S::ONE);
    diff <= S::from_f64(1e-6) * scale
}

/// Milliseconds to (fractional) samples.
#[inline]
pub fn ms_to_samples(ms: f64, sample_rate: f64) -> f64 {
    ms * 0.001 * sample_rate
}
