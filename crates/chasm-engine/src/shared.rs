//! Lock-free control store shared between a host/UI thread and the audio
//! thread.
//!
//! One `AtomicU32` per [`Control`] holds the `f32` bit pattern of the value
//! in user units. The writer calls [`SharedParams::set`]; the audio thread
//! takes a [`snapshot`](SharedParams::snapshot) once per block and hands it
//! to [`ChasmProcessor::update`](crate::ChasmProcessor::update).
//!
//! Each slot is independent and accessed with `Relaxed` ordering. A snapshot
//! taken while a writer is mid-update may mix old and new controls; the
//! smoothers absorb that as a ramp shifted by one block.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::params::{ChasmParams, Control};

/// Atomic `f32` slots, one per control.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use chasm_engine::{ChasmParams, Control, SharedParams};
///
/// let shared = Arc::new(SharedParams::new(&ChasmParams::default()));
/// let ui = Arc::clone(&shared);
/// std::thread::spawn(move || ui.set(Control::MixPercent, 75.0))
///     .join()
///     .unwrap();
/// assert_eq!(shared.snapshot().mix_percent, 75.0);
/// ```
#[derive(Debug)]
pub struct SharedParams {
    values: [AtomicU32; Control::COUNT],
}

impl SharedParams {
    /// Store seeded from `params`.
    pub fn new(params: &ChasmParams) -> Self {
        Self {
            values: std::array::from_fn(|i| {
                let value = Control::from_index(i).map_or(0.0, |c| params.get(c));
                AtomicU32::new(value.to_bits())
            }),
        }
    }

    /// Write one control.
    #[inline]
    pub fn set(&self, control: Control, value: f32) {
        self.values[control.index()].store(value.to_bits(), Ordering::Relaxed);
    }

    /// Read one control.
    #[inline]
    pub fn get(&self, control: Control) -> f32 {
        f32::from_bits(self.values[control.index()].load(Ordering::Relaxed))
    }

    /// Write every control from `params`.
    pub fn store(&self, params: &ChasmParams) {
        for control in Control::ALL {
            self.set(control, params.get(control));
        }
    }

    /// Read every control into a [`ChasmParams`].
    pub fn snapshot(&self) -> ChasmParams {
        let mut params = ChasmParams::default();
        for control in Control::ALL {
            params.set(control, self.get(control));
        }
        params
    }
}

impl Default for SharedParams {
    fn default() -> Self {
        Self::new(&ChasmParams::default())
    }
}
