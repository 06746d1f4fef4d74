//! Low-cut and high-cut filters with exact bypass.
//!
//! Each is a second-order TPT state variable filter at Butterworth Q. The
//! cutoff is fed from a smoothed control every sample, so the filter keeps
//! the last value it applied and only redesigns when the control moves.
//!
//! At the ends of their ranges (low-cut at or below 1 Hz, high-cut at or
//! above 19999 Hz) the filters are switched out entirely: the signal passes
//! through bit-for-bit instead of through a filter parked near DC or Nyquist.

use chasm_core::svf::BUTTERWORTH_Q;
use chasm_core::{Sample, TptFilter, TptType, approx_eq};

/// A low-cut at or below this frequency is bypassed.
pub const LOW_CUT_BYPASS_HZ: f64 = 1.0;

/// A high-cut at or above this frequency is bypassed.
pub const HIGH_CUT_BYPASS_HZ: f64 = 19999.0;

/// Which end of the spectrum the filter removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutKind {
    /// Highpass: removes content below the cutoff.
    LowCut,
    /// Lowpass: removes content above the cutoff.
    HighCut,
}

/// Cutoff-cached TPT filter with an active flag.
///
/// # Example
///
/// ```rust
/// use chasm_effects::{CutFilter, CutKind};
///
/// let mut low_cut = CutFilter::<f32>::new(CutKind::LowCut);
/// low_cut.prepare(48000.0);
///
/// low_cut.set_cutoff(0.0);
/// assert!(!low_cut.is_active());
/// assert_eq!(low_cut.process(0, 0.25), 0.25);
///
/// low_cut.set_cutoff(120.0);
/// assert!(low_cut.is_active());
/// ```
#[derive(Debug, Clone)]
pub struct CutFilter<S: Sample = f32> {
    kind: CutKind,
    filter: TptFilter<S>,
    last_cutoff: Option<S>,
    active: bool,
}

impl<S: Sample> CutFilter<S> {
    /// Inactive filter of the given kind.
    pub fn new(kind: CutKind) -> Self {
        let tpt_type = match kind {
            CutKind::LowCut => TptType::Highpass,
            CutKind::HighCut => TptType::Lowpass,
        };
        let mut filter = TptFilter::new(tpt_type);
        filter.set_resonance(BUTTERWORTH_Q);

        Self {
            kind,
            filter,
            last_cutoff: None,
            active: false,
        }
    }

    /// Prepare for `sample_rate`, clear state and forget the applied cutoff.
    pub fn prepare(&mut self, sample_rate: f64) {
        self.filter.prepare(sample_rate);
        self.last_cutoff = None;
    }

    /// Apply a cutoff in Hz.
    ///
    /// Values approximately equal to the last applied one are ignored.
    /// Otherwise the filter is redesigned (cutoff clamped to
    /// `[0, sample_rate / 2 - 1]`) and the active flag recomputed from the
    /// requested value. Returns `true` when a redesign happened.
    pub fn set_cutoff(&mut self, cutoff_hz: S) -> bool {
        if matches!(self.last_cutoff, Some(last) if approx_eq(cutoff_hz, last)) {
            return false;
        }

        let hz = cutoff_hz.to_f64();
        self.filter.set_cutoff(hz);
        self.active = match self.kind {
            CutKind::LowCut => hz > LOW_CUT_BYPASS_HZ,
            CutKind::HighCut => hz < HIGH_CUT_BYPASS_HZ,
        };
        self.last_cutoff = Some(cutoff_hz);
        true
    }

    /// Cutoff the filter is designed for, after clamping.
    pub fn cutoff(&self) -> f64 {
        self.filter.cutoff()
    }

    /// Whether the filter is switched in.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Filter kind.
    pub fn kind(&self) -> CutKind {
        self.kind
    }

    /// Filter one sample on `channel` (0 or 1). Passes through when inactive.
    #[inline]
    pub fn process(&mut self, channel: usize, input: S) -> S {
        if self.active {
            self.filter.process(channel, input)
        } else {
            input
        }
    }

    /// Clear filter state and force the next [`set_cutoff`](Self::set_cutoff)
    /// to redesign.
    pub fn reset(&mut self) {
        self.filter.reset();
        self.last_cutoff = None;
    }
}
