//! Chasm Effects - the processing stages of the chasm chain
//!
//! Built on chasm-core primitives, each stage generic over
//! [`Sample`](chasm_core::Sample):
//!
//! - [`SchroederAllpassChain`] - Four series allpasses with smoothed delay and
//!   character
//! - [`BrightnessEq`] - 3 kHz high shelf, ±12 dB
//! - [`CutFilter`] - Low-cut / high-cut TPT filters with exact bypass
//! - [`HaasEffect`] - Right-channel delay for stereo widening
//! - [`StereoEnhancer`] - Mid/side width, 0–200%
//! - [`Compressor`] - Hard-knee peak compressor
//! - [`LoudnessStage`] - Compressor → tanh drive → compressor, three modes
//! - [`SmoothLimiter`] / [`BrickWallLimiter`] - Output safety stages
//!
//! Mono stages implement [`Effect`](chasm_core::Effect); stages that see the
//! whole block implement [`StereoEffect`](chasm_core::StereoEffect).
//!
//! ## Example
//!
//! ```rust
//! use chasm_core::{AudioBlock, Effect, StereoEffect};
//! use chasm_effects::{BrightnessEq, SchroederAllpassChain};
//!
//! let mut chain = SchroederAllpassChain::<f32>::new();
//! chain.prepare(48000.0, 30.0, 2.0);
//! let mut eq = BrightnessEq::new();
//! eq.prepare(48000.0);
//! eq.set_brightness(4.0);
//!
//! let mut block = [0.0_f32; 256];
//! block[0] = 1.0;
//! chain.process_block_inplace(&mut block);
//! eq.process_block(&mut AudioBlock::mono(&mut block));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod brightness;
pub mod compressor;
pub mod cut_filter;
pub mod haas;
pub mod limiter;
pub mod loudness;
pub mod schroeder;
pub mod stereo_enhancer;

// Re-export main types at crate root
pub use brightness::BrightnessEq;
pub use compressor::{Compressor, CompressorSettings};
pub use cut_filter::{CutFilter, CutKind};
pub use haas::HaasEffect;
pub use limiter::{BrickWallLimiter, SmoothLimiter};
pub use loudness::{LoudnessMode, LoudnessStage};
pub use schroeder::SchroederAllpassChain;
pub use stereo_enhancer::StereoEnhancer;
