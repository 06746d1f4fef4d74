//! Chasm Core - DSP primitives for the chasm processing chain
//!
//! The building blocks shared by every chasm stage, written for real-time use:
//! nothing here allocates outside of a `prepare`/`resize` call.
//!
//! # Core Abstractions
//!
//! ## Sample Precision
//!
//! - [`Sample`] - Implemented for `f32` and `f64`; every type below is generic
//!   over it and defaults to `f32`
//!
//! ## Processing Traits
//!
//! - [`Effect`] - Mono, sample-at-a-time
//! - [`StereoEffect`] - Whole blocks over an [`AudioBlock`]
//!
//! ## Parameter Smoothing
//!
//! - [`SmoothedParam`] - One-pole exponential ramp, advanced once per sample
//!
//! ## Filters and Delays
//!
//! - [`DelayLine`] - Circular buffer with linearly interpolated reads
//! - [`AllpassFilter`] - Schroeder allpass on a fractional delay
//! - [`Biquad`] / [`BiquadCoefficients`] - Direct Form I with RBJ shelf design
//! - [`TptFilter`] - Highpass/lowpass TPT state variable filter with
//!   per-channel state
//!
//! ## Dynamics
//!
//! - [`EnvelopeFollower`] - Peak detector with attack/release
//!
//! ## Buffers
//!
//! - [`AudioBlock`] - Borrowed mono/stereo view
//! - [`StereoBuffer`] - Owned scratch storage
//!
//! ## Utilities
//!
//! Level, percent, delay and Q mappings plus clipping helpers in [`math`].
//!
//! # no_std Support
//!
//! Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! chasm-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use chasm_core::{AllpassFilter, SmoothedParam};
//!
//! let mut feedback = SmoothedParam::<f32>::with_config(0.5, 48000.0, 10.0);
//! let mut allpass = AllpassFilter::new();
//! allpass.prepare(48000.0, 50.0);
//! allpass.set_delay_ms(12.3);
//!
//! feedback.set_target(0.7);
//! for _ in 0..480 {
//!     allpass.set_feedback(feedback.advance());
//!     let _ = allpass.process(0.0);
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod allpass;
pub mod biquad;
pub mod buffer;
pub mod delay;
pub mod effect;
pub mod envelope;
pub mod math;
pub mod param;
pub mod sample;
pub mod svf;

// Re-export main types at crate root
pub use allpass::AllpassFilter;
pub use biquad::{Biquad, BiquadCoefficients};
pub use buffer::{AudioBlock, StereoBuffer};
pub use delay::DelayLine;
pub use effect::{Effect, StereoEffect};
pub use envelope::EnvelopeFollower;
pub use math::{
    approx_eq, db_to_linear, delay_ms_to_normalized, flush_denormal, hard_clip, lerp,
    linear_to_db, ms_to_samples, normalized_to_delay_ms, normalized_to_percent, normalized_to_q,
    percent_to_normalized, q_to_normalized, soft_clip,
};
pub use param::SmoothedParam;
pub use sample::Sample;
pub use svf::{TptFilter, TptType};
