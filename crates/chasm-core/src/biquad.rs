//! Biquad (bi-quadratic) filter structure.
//!
//! Second-order IIR in Direct Form I. Coefficients live in their own
//! [`BiquadCoefficients`] value so a new design is built off to the side and
//! swapped in as a whole; the filter never sees a half-updated set.
//!
//! Shelf design follows the RBJ Audio EQ Cookbook.

use crate::Sample;
use crate::math::flush_denormal;

/// Normalized biquad coefficients (`a0 = 1`).
///
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients<S: Sample = f32> {
    /// Feedforward `x[n]`
    pub b0: S,
    /// Feedforward `x[n-1]`
    pub b1: S,
    /// Feedforward `x[n-2]`
    pub b2: S,
    /// Feedback `y[n-1]`
    pub a1: S,
    /// Feedback `y[n-2]`
    pub a2: S,
}

impl<S: Sample> BiquadCoefficients<S> {
    /// `y[n] = x[n]`
    pub fn passthrough() -> Self {
        Self {
            b0: S::ONE,
            b1: S::ZERO,
            b2: S::ZERO,
            a1: S::ZERO,
            a2: S::ZERO,
        }
    }

    /// Build from raw cookbook terms, dividing through by `a0`.
    pub fn normalized(b0: S, b1: S, b2: S, a0: S, a1: S, a2: S) -> Self {
        let a0_inv = S::ONE / a0;
        Self {
            b0: b0 * a0_inv,
            b1: b1 * a0_inv,
            b2: b2 * a0_inv,
            a1: a1 * a0_inv,
            a2: a2 * a0_inv,
        }
    }

    /// High shelf.
    ///
    /// # Arguments
    ///
    /// * `frequency` - Corner frequency in Hz
    /// * `q` - Shelf Q
    /// * `gain` - Linear amplitude gain of the shelf (1.0 = flat)
    /// * `sample_rate` - Sample rate in Hz
    pub fn high_shelf(frequency: f64, q: f64, gain: S, sample_rate: f64) -> Self {
        let a = gain.max(S::ZERO).sqrt();
        let a_plus = a + S::ONE;
        let a_minus = a - S::ONE;
        let two = S::from_f64(2.0);

        let omega = S::from_f64(2.0 * core::f64::consts::PI * frequency / sample_rate);
        let cos_omega = omega.cos();
        let beta = omega.sin() * a.sqrt() / S::from_f64(q);
        let a_minus_cos = a_minus * cos_omega;

        Self::normalized(
            a * (a_plus + a_minus_cos + beta),
            a * -two * (a_minus + a_plus * cos_omega),
            a * (a_plus + a_minus_cos - beta),
            a_plus - a_minus_cos + beta,
            two * (a_minus - a_plus * cos_omega),
            a_plus - a_minus_cos - beta,
        )
    }
}

impl<S: Sample> Default for BiquadCoefficients<S> {
    fn default() -> Self {
        Self::passthrough()
    }
}

/// Biquad filter state plus its current coefficient set.
///
/// # Example
///
/// ```rust
/// use chasm_core::{Biquad, BiquadCoefficients};
///
/// let mut shelf = Biquad::<f32>::new();
/// shelf.set_coefficients(BiquadCoefficients::high_shelf(3000.0, 1.2, 2.0, 48000.0));
///
/// let y = shelf.process(0.25);
/// assert!(y.is_finite());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Biquad<S: Sample = f32> {
    coeffs: BiquadCoefficients<S>,
    x1: S,
    x2: S,
    y1: S,
    y2: S,
}

impl<S: Sample> Biquad<S> {
    /// Creates a new biquad with passthrough coefficients.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the coefficient set. Filter state is kept.
    #[inline]
    pub fn set_coefficients(&mut self, coeffs: BiquadCoefficients<S>) {
        self.coeffs = coeffs;
    }

    /// Current coefficient set.
    #[inline]
    pub fn coefficients(&self) -> &BiquadCoefficients<S> {
        &self.coeffs
    }

    /// Processes a single sample.
    #[inline]
    pub fn process(&mut self, input: S) -> S {
        let c = &self.coeffs;
        let output = flush_denormal(
            c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2,
        );

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Clears the filter state without touching coefficients.
    pub fn clear(&mut self) {
        self.x1 = S::ZERO;
        self.x2 = S::ZERO;
        self.y1 = S::ZERO;
        self.y2 = S::ZERO;
    }
}
