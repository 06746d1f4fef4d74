//! Haas widening: a short smoothed delay on the right channel.
//!
//! Delays below ~40 ms are heard as a shift of the stereo image rather than
//! as an echo. The delay is an [`AllpassFilter`] held at zero feedback, which
//! reduces it to a pure fractional delay line.

use chasm_core::{AllpassFilter, AudioBlock, Sample, SmoothedParam, StereoEffect};

/// Longest Haas delay in milliseconds.
pub const MAX_HAAS_MS: f64 = 50.0;

const HAAS_SMOOTHING_MS: f64 = 20.0;

/// Right-channel delay for stereo blocks. Mono blocks are left untouched.
///
/// The delay never drops below one sample, so a setting of 0 ms still
/// offsets the right channel by a single sample.
#[derive(Debug, Clone)]
pub struct HaasEffect<S: Sample = f32> {
    delay: AllpassFilter<S>,
    delay_ms: SmoothedParam<S>,
}

impl<S: Sample> HaasEffect<S> {
    /// Unprepared effect.
    pub fn new() -> Self {
        Self {
            delay: AllpassFilter::new(),
            delay_ms: SmoothedParam::new(S::ZERO),
        }
    }

    /// Allocate the delay line and settle on `initial_delay_ms`.
    pub fn prepare(&mut self, sample_rate: f64, initial_delay_ms: S) {
        self.delay.prepare(sample_rate, MAX_HAAS_MS);
        self.delay_ms.prepare(sample_rate, HAAS_SMOOTHING_MS);
        self.set_delay_ms(initial_delay_ms);
        self.delay_ms.snap_to_target();
    }

    /// Set the delay target in milliseconds, clamped to `[0, 50]`.
    pub fn set_delay_ms(&mut self, delay_ms: S) {
        self.delay_ms
            .set_target(delay_ms.clamp(S::ZERO, S::from_f64(MAX_HAAS_MS)));
    }

    /// Delay target in milliseconds.
    pub fn delay_ms(&self) -> S {
        self.delay_ms.target()
    }
}

impl<S: Sample> Default for HaasEffect<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Sample> StereoEffect<S> for HaasEffect<S> {
    fn process_block(&mut self, block: &mut AudioBlock<'_, S>) {
        let (_, Some(right)) = block.split_mut() else {
            return;
        };

        for sample in right.iter_mut() {
            let delay_ms = self.delay_ms.advance();
            self.delay.set_delay_ms(delay_ms.to_f64());
            *sample = self.delay.process(*sample);
        }
    }

    fn reset(&mut self) {
        // Allpass reset also returns feedback to zero
        self.delay.reset();
        self.delay_ms.snap_to_target();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f64 = 48000.0;

    #[test]
    fn test_right_channel_is_delayed() {
        let mut haas = HaasEffect::<f64>::new();
        haas.prepare(SAMPLE_RATE, 1.0);

        let mut left = vec![0.0; 128];
        let mut right = vec![0.0; 128];
        left[0] = 1.0;
        right[0] = 1.0;
        haas.process_block(&mut AudioBlock::stereo(&mut left, &mut right));

        assert_eq!(left[0], 1.0);
        assert_eq!(right[0], 0.0);
        // 1 ms at 48 kHz
        assert!((right[48] - 1.0).abs() < 1e-9, "right[48] = {}", right[48]);
    }

    #[test]
    fn test_zero_setting_still_delays_one_sample() {
        let mut haas = HaasEffect::<f32>::new();
        haas.prepare(SAMPLE_RATE, 0.0);

        let mut left = [0.0_f32; 4];
        let mut right = [1.0, 2.0, 3.0, 4.0];
        haas.process_block(&mut AudioBlock::stereo(&mut left, &mut right));
        assert_eq!(right, [0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_mono_untouched() {
        let mut haas = HaasEffect::<f32>::new();
        haas.prepare(SAMPLE_RATE, 20.0);
        let mut mono = [0.3_f32; 16];
        haas.process_block(&mut AudioBlock::mono(&mut mono));
        assert_eq!(mono, [0.3; 16]);
    }

    #[test]
    fn test_delay_clamped() {
        let mut haas = HaasEffect::<f32>::new();
        haas.prepare(SAMPLE_RATE, 0.0);
        haas.set_delay_ms(80.0);
        assert_eq!(haas.delay_ms(), 50.0);
        haas.set_delay_ms(-3.0);
        assert_eq!(haas.delay_ms(), 0.0);
    }

    #[test]
    fn test_reset_clears_and_settles() {
        let mut haas = HaasEffect::<f32>::new();
        haas.prepare(SAMPLE_RATE, 5.0);
        haas.set_delay_ms(30.0);

        let mut left = [0.0_f32; 64];
        let mut right = [1.0_f32; 64];
        haas.process_block(&mut AudioBlock::stereo(&mut left, &mut right));
        haas.reset();

        let mut right = [0.0_f32; 2048];
        let mut left = [0.0_f32; 2048];
        haas.process_block(&mut AudioBlock::stereo(&mut left, &mut right));
        assert!(right.iter().all(|&x| x == 0.0));
        assert_eq!(haas.delay_ms(), 30.0);
    }
}
