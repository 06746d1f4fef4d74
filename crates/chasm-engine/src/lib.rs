//! Chasm Engine - the complete diffusion processor
//!
//! Wraps the chasm-effects stages into one block processor with dry/wet mix,
//! gain staging, parameter smoothing and an optional output limiter.
//!
//! - [`ChasmProcessor`] - prepare / update / process / reset
//! - [`ChasmParams`] - every control in user units, serde-friendly
//! - [`SharedParams`] - lock-free control store for a UI or host thread
//! - [`EngineConfig`] - control interval and output limiter, loadable from TOML
//! - [`ProcessSpec`] - validated sample rate, block size and channel count
//!
//! ## Example
//!
//! ```rust
//! use chasm_engine::{ChasmParams, ChasmProcessor, EngineConfig, ProcessSpec};
//!
//! let config = EngineConfig::from_toml_str("[output_limiter]\nkind = \"smooth\"\nceiling_db = -0.5")?;
//! let mut processor = ChasmProcessor::<f32>::with_config(config)?;
//! processor.prepare(&ProcessSpec::new(44100.0, 512, 2)?, &ChasmParams::default());
//!
//! processor.update(&ChasmParams {
//!     delay_ms: 45.0,
//!     character: 3.0,
//!     loudness_mode: 1,
//!     ..ChasmParams::default()
//! });
//!
//! let mut left = vec![0.25_f32; 512];
//! let mut right = vec![-0.25_f32; 512];
//! processor.process(&mut [&mut left[..], &mut right[..]]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod params;
pub mod processor;
pub mod shared;
pub mod spec;

pub use config::{EngineConfig, OutputLimiter};
pub use error::{ConfigError, SpecError};
pub use params::{ChasmParams, Control, ParamRange};
pub use processor::ChasmProcessor;
pub use shared::SharedParams;
pub use spec::ProcessSpec;
