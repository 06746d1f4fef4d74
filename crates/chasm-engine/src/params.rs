//! User-facing controls.
//!
//! [`ChasmParams`] carries every control in the units a host or UI shows
//! (dB, percent, Hz, ms, mode index). The processor converts units itself.
//!
//! | Control | Range | Default |
//! |---------|-------|---------|
//! | Input gain | -48 to +24 dB | 0 dB |
//! | Output gain | -48 to +24 dB | 0 dB |
//! | Mix | 0–100 % | 50 % |
//! | Delay | 1–100 ms | 30 ms |
//! | Brightness | -12 to +12 dB | 0 dB |
//! | Character | 0.1–10 | 1.0 |
//! | Low cut | 0–20000 Hz | 0 Hz (off) |
//! | High cut | 0–20000 Hz | 20000 Hz (off) |
//! | Width | 0–200 % | 100 % |
//! | Loudness input gain | -24 to +24 dB | 0 dB |
//! | Loudness boost | -24 to +24 dB | 0 dB |
//! | Loudness mode | 0–3 | 0 (disabled) |
//! | Haas | 0–50 ms | 0 ms |

use serde::{Deserialize, Serialize};

/// Range and default of one control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    /// Smallest legal value.
    pub min: f32,
    /// Largest legal value.
    pub max: f32,
    /// Value used when nothing else is known.
    pub default: f32,
}

impl ParamRange {
    const fn new(min: f32, max: f32, default: f32) -> Self {
        Self { min, max, default }
    }

    /// Clamp into range; non-finite values become the default.
    pub fn sanitize(&self, value: f32) -> f32 {
        if value.is_finite() {
            value.clamp(self.min, self.max)
        } else {
            self.default
        }
    }
}

/// Identifies one control, for index-based access from hosts and
/// [`SharedParams`](crate::SharedParams).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    /// Input gain in dB.
    InputGainDb,
    /// Output gain in dB.
    OutputGainDb,
    /// Dry/wet mix in percent.
    MixPercent,
    /// Diffusion base delay in ms.
    DelayMs,
    /// Brightness shelf gain in dB.
    BrightnessDb,
    /// Diffusion character.
    Character,
    /// Low-cut frequency in Hz.
    LowCutHz,
    /// High-cut frequency in Hz.
    HighCutHz,
    /// Stereo width in percent.
    WidthPercent,
    /// Loudness input gain in dB.
    LoudnessInputGainDb,
    /// Loudness boost in dB.
    LoudnessBoostDb,
    /// Loudness mode index.
    LoudnessMode,
    /// Haas delay in ms.
    HaasMs,
}

impl Control {
    /// Every control, in index order.
    pub const ALL: [Control; 13] = [
        Control::InputGainDb,
        Control::OutputGainDb,
        Control::MixPercent,
        Control::DelayMs,
        Control::BrightnessDb,
        Control::Character,
        Control::LowCutHz,
        Control::HighCutHz,
        Control::WidthPercent,
        Control::LoudnessInputGainDb,
        Control::LoudnessBoostDb,
        Control::LoudnessMode,
        Control::HaasMs,
    ];

    /// Number of controls.
    pub const COUNT: usize = Self::ALL.len();

    /// Position in [`ALL`](Self::ALL).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Control at `index`.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Stable identifier, matching the serialized field name.
    pub fn name(self) -> &'static str {
        match self {
            Control::InputGainDb => "input_gain_db",
            Control::OutputGainDb => "output_gain_db",
            Control::MixPercent => "mix_percent",
            Control::DelayMs => "delay_ms",
            Control::BrightnessDb => "brightness_db",
            Control::Character => "character",
            Control::LowCutHz => "low_cut_hz",
            Control::HighCutHz => "high_cut_hz",
            Control::WidthPercent => "width_percent",
            Control::LoudnessInputGainDb => "loudness_input_gain_db",
            Control::LoudnessBoostDb => "loudness_boost_db",
            Control::LoudnessMode => "loudness_mode",
            Control::HaasMs => "haas_ms",
        }
    }

    /// Legal range and default.
    pub fn range(self) -> ParamRange {
        match self {
            Control::InputGainDb | Control::OutputGainDb => ParamRange::new(-48.0, 24.0, 0.0),
            Control::MixPercent => ParamRange::new(0.0, 100.0, 50.0),
            Control::DelayMs => ParamRange::new(1.0, 100.0, 30.0),
            Control::BrightnessDb => ParamRange::new(-12.0, 12.0, 0.0),
            Control::Character => ParamRange::new(0.1, 10.0, 1.0),
            Control::LowCutHz => ParamRange::new(0.0, 20000.0, 0.0),
            Control::HighCutHz => ParamRange::new(0.0, 20000.0, 20000.0),
            Control::WidthPercent => ParamRange::new(0.0, 200.0, 100.0),
            Control::LoudnessInputGainDb | Control::LoudnessBoostDb => {
                ParamRange::new(-24.0, 24.0, 0.0)
            }
            Control::LoudnessMode => ParamRange::new(0.0, 3.0, 0.0),
            Control::HaasMs => ParamRange::new(0.0, 50.0, 0.0),
        }
    }
}

/// Every control of the processor in user units.
///
/// Missing fields deserialize to their defaults, so partial documents work:
///
/// ```rust
/// use chasm_engine::ChasmParams;
///
/// let params: ChasmParams = toml::from_str("mix_percent = 100.0\nloudness_mode = 2").unwrap();
/// assert_eq!(params.mix_percent, 100.0);
/// assert_eq!(params.loudness_mode, 2);
/// assert_eq!(params.delay_ms, 30.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChasmParams {
    /// Input gain in dB.
    pub input_gain_db: f32,
    /// Output gain in dB.
    pub output_gain_db: f32,
    /// Dry/wet mix in percent (0 = dry only, 100 = wet only).
    pub mix_percent: f32,
    /// Diffusion base delay in ms.
    pub delay_ms: f32,
    /// Brightness shelf gain in dB.
    pub brightness_db: f32,
    /// Diffusion character; sets the allpass feedback.
    pub character: f32,
    /// Low-cut frequency in Hz. At or below 1 Hz the filter is bypassed.
    pub low_cut_hz: f32,
    /// High-cut frequency in Hz. At or above 19999 Hz the filter is bypassed.
    pub high_cut_hz: f32,
    /// Stereo width in percent.
    pub width_percent: f32,
    /// Loudness input gain in dB.
    pub loudness_input_gain_db: f32,
    /// Loudness boost in dB.
    pub loudness_boost_db: f32,
    /// Loudness mode: 0 disabled, 1 Clean, 2 Further, 3 Crunchy.
    pub loudness_mode: i32,
    /// Haas delay in ms.
    pub haas_ms: f32,
}

impl Default for ChasmParams {
    fn default() -> Self {
        let mut params = Self {
            input_gain_db: 0.0,
            output_gain_db: 0.0,
            mix_percent: 0.0,
            delay_ms: 0.0,
            brightness_db: 0.0,
            character: 0.0,
            low_cut_hz: 0.0,
            high_cut_hz: 0.0,
            width_percent: 0.0,
            loudness_input_gain_db: 0.0,
            loudness_boost_db: 0.0,
            loudness_mode: 0,
            haas_ms: 0.0,
        };
        for control in Control::ALL {
            params.set(control, control.range().default);
        }
        params
    }
}

impl ChasmParams {
    /// Read a control as `f32` (the mode index converts exactly).
    pub fn get(&self, control: Control) -> f32 {
        match control {
            Control::InputGainDb => self.input_gain_db,
            Control::OutputGainDb => self.output_gain_db,
            Control::MixPercent => self.mix_percent,
            Control::DelayMs => self.delay_ms,
            Control::BrightnessDb => self.brightness_db,
            Control::Character => self.character,
            Control::LowCutHz => self.low_cut_hz,
            Control::HighCutHz => self.high_cut_hz,
            Control::WidthPercent => self.width_percent,
            Control::LoudnessInputGainDb => self.loudness_input_gain_db,
            Control::LoudnessBoostDb => self.loudness_boost_db,
            Control::LoudnessMode => self.loudness_mode as f32,
            Control::HaasMs => self.haas_ms,
        }
    }

    /// Write a control. The mode index is rounded to the nearest integer
    /// (non-finite becomes 0). No clamping happens here.
    pub fn set(&mut self, control: Control, value: f32) {
        match control {
            Control::InputGainDb => self.input_gain_db = value,
            Control::OutputGainDb => self.output_gain_db = value,
            Control::MixPercent => self.mix_percent = value,
            Control::DelayMs => self.delay_ms = value,
            Control::BrightnessDb => self.brightness_db = value,
            Control::Character => self.character = value,
            Control::LowCutHz => self.low_cut_hz = value,
            Control::HighCutHz => self.high_cut_hz = value,
            Control::WidthPercent => self.width_percent = value,
            Control::LoudnessInputGainDb => self.loudness_input_gain_db = value,
            Control::LoudnessBoostDb => self.loudness_boost_db = value,
            Control::LoudnessMode => {
                self.loudness_mode = if value.is_finite() { value.round() as i32 } else { 0 };
            }
            Control::HaasMs => self.haas_ms = value,
        }
    }

    /// Controls holding NaN or infinity.
    pub fn non_finite(&self) -> impl Iterator<Item = Control> + '_ {
        Control::ALL
            .into_iter()
            .filter(|&control| !self.get(control).is_finite())
    }

    /// Copy with every control clamped to its range and non-finite values
    /// replaced by defaults.
    ///
    /// The loudness mode is kept as given: negative indices and indices
    /// above 3 have their own meaning (disabled and Crunchy).
    pub fn sanitized(&self) -> Self {
        let mut clean = *self;
        for control in Control::ALL {
            if control != Control::LoudnessMode {
                clean.set(control, control.range().sanitize(self.get(control)));
            }
        }
        clean
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_ranges() {
        let params = ChasmParams::default();
        assert_eq!(params.mix_percent, 50.0);
        assert_eq!(params.delay_ms, 30.0);
        assert_eq!(params.character, 1.0);
        assert_eq!(params.high_cut_hz, 20000.0);
        assert_eq!(params.width_percent, 100.0);
        assert_eq!(params.loudness_mode, 0);
        for control in Control::ALL {
            assert_eq!(params.get(control), control.range().default, "{}", control.name());
        }
    }

    #[test]
    fn test_index_roundtrip() {
        for (i, control) in Control::ALL.into_iter().enumerate() {
            assert_eq!(control.index(), i);
            assert_eq!(Control::from_index(i), Some(control));
        }
        assert_eq!(Control::from_index(Control::COUNT), None);
    }

    #[test]
    fn test_sanitized_clamps_and_replaces() {
        let params = ChasmParams {
            mix_percent: 180.0,
            delay_ms: f32::NAN,
            character: 0.0,
            width_percent: f32::NEG_INFINITY,
            loudness_mode: 7,
            ..ChasmParams::default()
        };
        assert_eq!(params.non_finite().count(), 2);

        let clean = params.sanitized();
        assert_eq!(clean.mix_percent, 100.0);
        assert_eq!(clean.delay_ms, 30.0);
        assert_eq!(clean.character, 0.1);
        assert_eq!(clean.width_percent, 100.0);
        assert_eq!(clean.loudness_mode, 7);
        assert_eq!(clean.non_finite().count(), 0);
    }

    #[test]
    fn test_mode_set_rounds() {
        let mut params = ChasmParams::default();
        params.set(Control::LoudnessMode, 2.4);
        assert_eq!(params.loudness_mode, 2);
        params.set(Control::LoudnessMode, f32::NAN);
        assert_eq!(params.loudness_mode, 0);
    }

    #[test]
    fn test_names_unique() {
        let mut names: Vec<_> = Control::ALL.iter().map(|c| c.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Control::COUNT);
    }
}
