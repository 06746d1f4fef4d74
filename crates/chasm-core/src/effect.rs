//! Processing traits.
//!
//! Two shapes of processor appear in chasm:
//!
//! - [`Effect`]: mono, sample-at-a-time. Used inside the per-sample loop
//!   (diffusion chains, per-channel compressors).
//! - [`StereoEffect`]: whole-block processing over an [`AudioBlock`]. Used for
//!   the post-pass stages that see both channels at once (brightness, Haas,
//!   width, loudness, limiting).
//!
//! Neither trait allocates, and both are object-safe.

use crate::{AudioBlock, Sample};

/// Mono sample-by-sample processor.
///
/// # Example
///
/// ```rust
/// use chasm_core::Effect;
///
/// struct Gain(f32);
///
/// impl Effect for Gain {
///     fn process(&mut self, input: f32) -> f32 {
///         input * self.0
///     }
///
///     fn reset(&mut self) {}
/// }
///
/// let mut gain = Gain(0.5);
/// let mut buffer = [1.0, 2.0];
/// gain.process_block_inplace(&mut buffer);
/// assert_eq!(buffer, [0.5, 1.0]);
/// ```
pub trait Effect<S: Sample = f32> {
    /// Process one sample.
    fn process(&mut self, input: S) -> S;

    /// Process a buffer in place. The default calls [`process`](Self::process)
    /// per sample.
    fn process_block_inplace(&mut self, buffer: &mut [S]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Clear internal state (delay lines, envelopes) without changing
    /// parameters.
    fn reset(&mut self);

    /// Latency introduced by the processor, in samples.
    fn latency_samples(&self) -> usize {
        0
    }
}

/// Block processor over mono or stereo views.
///
/// Implementations decide what to do with mono blocks; stereo-only stages
/// leave them untouched.
pub trait StereoEffect<S: Sample = f32> {
    /// Process the block in place.
    fn process_block(&mut self, block: &mut AudioBlock<'_, S>);

    /// Clear internal state and settle any smoothed parameters on their
    /// targets.
    fn reset(&mut self);
}
