//! Sample precision abstraction.
//!
//! Every processor in chasm is generic over [`Sample`], so the same code path
//! runs in single or double precision. Math goes through `libm` so the trait
//! works without `std`.

use core::fmt::Debug;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Floating-point sample type (`f32` or `f64`).
///
/// # Example
///
/// ```rust
/// use chasm_core::Sample;
///
/// fn half<S: Sample>(x: S) -> S {
///     x * S::HALF
/// }
///
/// assert_eq!(half(1.0_f32), 0.5);
/// assert_eq!(half(1.0_f64), 0.5);
/// ```
pub trait Sample:
    Copy
    + Default
    + Debug
    + PartialEq
    + PartialOrd
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
{
    /// Additive identity.
    const ZERO: Self;
    /// Multiplicative identity.
    const ONE: Self;
    /// 0.5
    const HALF: Self;
    /// π
    const PI: Self;

    /// Convert from `f64`, rounding if needed.
    fn from_f64(value: f64) -> Self;
    /// Widen to `f64`.
    fn to_f64(self) -> f64;

    /// Absolute value.
    fn abs(self) -> Self;
    /// Hyperbolic tangent.
    fn tanh(self) -> Self;
    /// Tangent.
    fn tan(self) -> Self;
    /// Sine.
    fn sin(self) -> Self;
    /// Cosine.
    fn cos(self) -> Self;
    /// Natural exponential.
    fn exp(self) -> Self;
    /// Base-10 logarithm.
    fn log10(self) -> Self;
    /// `self` raised to `exponent`.
    fn powf(self, exponent: Self) -> Self;
    /// Square root.
    fn sqrt(self) -> Self;
    /// Largest integer value not greater than `self`.
    fn floor(self) -> Self;
    /// `true` unless NaN or infinite.
    fn is_finite(self) -> bool;

    /// Larger of two values (NaN-ignoring, like `f32::max`).
    fn max(self, other: Self) -> Self;
    /// Smaller of two values (NaN-ignoring, like `f32::min`).
    fn min(self, other: Self) -> Self;

    /// Restrict to `[lo, hi]`.
    ///
    /// Unlike `f32::clamp` this never panics; if `lo > hi` the result is `hi`.
    #[inline]
    fn clamp(self, lo: Self, hi: Self) -> Self {
        self.max(lo).min(hi)
    }
}

macro_rules! impl_sample {
    ($t:ty, $pi:expr, $abs:path, $tanh:path, $tan:path, $sin:path, $cos:path, $exp:path,
     $log10:path, $pow:path, $sqrt:path, $floor:path) => {
        impl Sample for $t {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            const HALF: Self = 0.5;
            const PI: Self = $pi;

            #[inline]
            fn from_f64(value: f64) -> Self {
                value as $t
            }

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn abs(self) -> Self {
                $abs(self)
            }

            #[inline]
            fn tanh(self) -> Self {
                $tanh(self)
            }

            #[inline]
            fn tan(self) -> Self {
                $tan(self)
            }

            #[inline]
            fn sin(self) -> Self {
                $sin(self)
            }

            #[inline]
            fn cos(self) -> Self {
                $cos(self)
            }

            #[inline]
            fn exp(self) -> Self {
                $exp(self)
            }

            #[inline]
            fn log10(self) -> Self {
                $log10(self)
            }

            #[inline]
            fn powf(self, exponent: Self) -> Self {
                $pow(self, exponent)
            }

            #[inline]
            fn sqrt(self) -> Self {
                $sqrt(self)
            }

            #[inline]
            fn floor(self) -> Self {
                $floor(self)
            }

            #[inline]
            fn is_finite(self) -> bool {
                <$t>::is_finite(self)
            }

            #[inline]
            fn max(self, other: Self) -> Self {
                <$t>::max(self, other)
            }

            #[inline]
            fn min(self, other: Self) -> Self {
                <$t>::min(self, other)
            }
        }
    };
}

impl_sample!(
    f32,
    core::f32::consts::PI,
    libm::fabsf,
    libm::tanhf,
    libm::tanf,
    libm::sinf,
    libm::cosf,
    libm::expf,
    libm::log10f,
    libm::powf,
    libm::sqrtf,
    libm::floorf
);

impl_sample!(
    f64,
    core::f64::consts::PI,
    libm::fabs,
    libm::tanh,
    libm::tan,
    libm::sin,
    libm::cos,
    libm::exp,
    libm::log10,
    libm::pow,
    libm::sqrt,
    libm::floor
);
