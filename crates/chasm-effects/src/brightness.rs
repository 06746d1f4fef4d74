//! Brightness control: a single high shelf at 3 kHz.
//!
//! The diffusion chain smears transients and dulls the top end; the shelf
//! gives it back (or takes more away). Coefficients are rebuilt as a complete
//! set and swapped in whole, so the filters never run on a half-updated
//! design.

use chasm_core::{AudioBlock, Biquad, BiquadCoefficients, Sample, StereoEffect, db_to_linear};

/// Shelf corner frequency in Hz.
pub const SHELF_FREQUENCY_HZ: f64 = 3000.0;

/// Shelf Q.
pub const SHELF_Q: f64 = 1.2;

/// Brightness range is `±MAX_BRIGHTNESS_DB`.
pub const MAX_BRIGHTNESS_DB: f64 = 12.0;

/// High-shelf EQ with independent left/right filter state.
///
/// Mono blocks run through the left filter only.
#[derive(Debug, Clone)]
pub struct BrightnessEq<S: Sample = f32> {
    filters: [Biquad<S>; 2],
    sample_rate: f64,
    brightness_db: S,
}

impl<S: Sample> BrightnessEq<S> {
    /// Flat shelf at 44.1 kHz.
    pub fn new() -> Self {
        Self {
            filters: [Biquad::new(), Biquad::new()],
            sample_rate: 44100.0,
            brightness_db: S::ZERO,
        }
    }

    /// Redesign for `sample_rate` at the current brightness and clear state.
    pub fn prepare(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.install(self.brightness_db);
        self.reset();
    }

    /// Set the shelf gain in dB, clamped to `±12`.
    ///
    /// Repeating the current value is free.
    pub fn set_brightness(&mut self, brightness_db: S) {
        let limit = S::from_f64(MAX_BRIGHTNESS_DB);
        let clamped = brightness_db.clamp(-limit, limit);
        if clamped != self.brightness_db {
            self.install(clamped);
        }
    }

    /// Shelf gain in dB.
    pub fn brightness_db(&self) -> S {
        self.brightness_db
    }

    /// Coefficients currently in use.
    pub fn coefficients(&self) -> BiquadCoefficients<S> {
        *self.filters[0].coefficients()
    }

    fn install(&mut self, brightness_db: S) {
        self.brightness_db = brightness_db;
        let coeffs = BiquadCoefficients::high_shelf(
            SHELF_FREQUENCY_HZ,
            SHELF_Q,
            db_to_linear(brightness_db),
            self.sample_rate,
        );
        for filter in &mut self.filters {
            filter.set_coefficients(coeffs);
        }
    }
}

impl<S: Sample> Default for BrightnessEq<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Sample> StereoEffect<S> for BrightnessEq<S> {
    fn process_block(&mut self, block: &mut AudioBlock<'_, S>) {
        let [left_filter, right_filter] = &mut self.filters;
        let (left, right) = block.split_mut();

        for sample in left.iter_mut() {
            *sample = left_filter.process(*sample);
        }
        if let Some(right) = right {
            for sample in right.iter_mut() {
                *sample = right_filter.process(*sample);
            }
        }
    }

    fn reset(&mut self) {
        for filter in &mut self.filters {
            filter.clear();
        }
    }
}
