//! Engine configuration.
//!
//! Settings that shape the processor itself rather than its sound controls:
//! how often control-rate work runs and which safety limiter (if any) sits
//! after the output gain.
//!
//! # TOML Format
//!
//! ```toml
//! control_interval = 32
//!
//! [output_limiter]
//! kind = "smooth"
//! ceiling_db = -0.3
//! ```
//!
//! Every field is optional; an empty document gives [`EngineConfig::default`].

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Default number of samples between control-rate updates.
pub const DEFAULT_CONTROL_INTERVAL: usize = 32;

/// Safety stage applied after the output gain.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputLimiter {
    /// No limiting; the output is exactly the mixed signal times output gain.
    #[default]
    Off,
    /// Hard clamp at a linear ceiling in `(0, 1]` (applied clamped to
    /// `[0.1, 1]`).
    BrickWall {
        /// Linear ceiling.
        ceiling: f64,
    },
    /// Soft clip, envelope limiter and compressor under a ceiling in dBFS.
    Smooth {
        /// Ceiling in dB, at most 0.
        ceiling_db: f64,
    },
}

/// Processor configuration.
///
/// # Example
///
/// ```rust
/// use chasm_engine::{EngineConfig, OutputLimiter};
///
/// let config = EngineConfig::from_toml_str(
///     "control_interval = 16\n[output_limiter]\nkind = \"brick_wall\"\nceiling = 0.9\n",
/// )?;
/// assert_eq!(config.control_interval, 16);
/// assert_eq!(config.output_limiter, OutputLimiter::BrickWall { ceiling: 0.9 });
/// # Ok::<(), chasm_engine::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Samples between pushes of smoothed delay, character, brightness,
    /// width and Haas values into the stages.
    pub control_interval: usize,
    /// Safety limiter after the output gain.
    pub output_limiter: OutputLimiter,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            control_interval: DEFAULT_CONTROL_INTERVAL,
            output_limiter: OutputLimiter::Off,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check the interval and limiter ceiling.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.control_interval == 0 {
            return Err(ConfigError::InvalidControlInterval);
        }

        match self.output_limiter {
            OutputLimiter::Off => {}
            OutputLimiter::BrickWall { ceiling } => {
                if !ceiling.is_finite() || ceiling <= 0.0 || ceiling > 1.0 {
                    return Err(ConfigError::limiter_ceiling(ceiling, "must be in (0, 1]"));
                }
            }
            OutputLimiter::Smooth { ceiling_db } => {
                if !ceiling_db.is_finite() || ceiling_db > 0.0 {
                    return Err(ConfigError::limiter_ceiling(
                        ceiling_db,
                        "must be a finite level at or below 0 dB",
                    ));
                }
            }
        }

        Ok(())
    }
}
