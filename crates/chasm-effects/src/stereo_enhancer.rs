//! Mid/side stereo width.
//!
//! ```text
//! mid  = (L + R) / 2
//! side = (L - R) / 2 · width / 100
//! L'   = mid + side
//! R'   = mid - side
//! ```
//!
//! 0% collapses to mono, 100% is unity, 200% doubles the side signal.

use chasm_core::{AudioBlock, Sample, SmoothedParam, StereoEffect};

/// Widest setting, in percent.
pub const MAX_WIDTH_PERCENT: f64 = 200.0;

const WIDTH_SMOOTHING_MS: f64 = 20.0;

/// Smoothed mid/side width control. Mono blocks are left untouched.
///
/// # Example
///
/// ```rust
/// use chasm_core::{AudioBlock, StereoEffect};
/// use chasm_effects::StereoEnhancer;
///
/// let mut width = StereoEnhancer::<f32>::new();
/// width.prepare(48000.0, 0.0);
///
/// let mut left = [1.0_f32; 4];
/// let mut right = [0.0_f32; 4];
/// width.process_block(&mut AudioBlock::stereo(&mut left, &mut right));
/// assert_eq!(left, right);
/// ```
#[derive(Debug, Clone)]
pub struct StereoEnhancer<S: Sample = f32> {
    width: SmoothedParam<S>,
}

impl<S: Sample> StereoEnhancer<S> {
    /// Unity width, no smoothing until prepared.
    pub fn new() -> Self {
        Self {
            width: SmoothedParam::new(S::from_f64(100.0)),
        }
    }

    /// Configure smoothing for `sample_rate` and settle on `initial_width`.
    pub fn prepare(&mut self, sample_rate: f64, initial_width: S) {
        self.width.prepare(sample_rate, WIDTH_SMOOTHING_MS);
        self.set_width(initial_width);
        self.width.snap_to_target();
    }

    /// Set the width target in percent, clamped to `[0, 200]`.
    pub fn set_width(&mut self, percent: S) {
        self.width
            .set_target(percent.clamp(S::ZERO, S::from_f64(MAX_WIDTH_PERCENT)));
    }

    /// Width target in percent.
    pub fn width(&self) -> S {
        self.width.target()
    }

    /// Widen one stereo frame, advancing the smoother.
    #[inline]
    pub fn process_frame(&mut self, left: S, right: S) -> (S, S) {
        let side_gain = self.width.advance() / S::from_f64(100.0);
        let mid = (left + right) * S::HALF;
        let side = (left - right) * S::HALF * side_gain;
        (mid + side, mid - side)
    }
}

impl<S: Sample> Default for StereoEnhancer<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Sample> StereoEffect<S> for StereoEnhancer<S> {
    fn process_block(&mut self, block: &mut AudioBlock<'_, S>) {
        let (left, Some(right)) = block.split_mut() else {
            return;
        };

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            (*l, *r) = self.process_frame(*l, *r);
        }
    }

    fn reset(&mut self) {
        self.width.snap_to_target();
    }
}
