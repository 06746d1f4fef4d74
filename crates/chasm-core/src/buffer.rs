//! Audio buffers.
//!
//! [`AudioBlock`] is a borrowed mono or stereo view handed to block
//! processors. [`StereoBuffer`] owns scratch storage sized once at prepare
//! time and lends [`AudioBlock`] views into it.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::Sample;

/// Mutable mono or stereo view over channel slices of equal length.
///
/// # Example
///
/// ```rust
/// use chasm_core::AudioBlock;
///
/// let mut left = [0.5_f32; 4];
/// let mut right = [-0.5_f32; 4];
/// let mut block = AudioBlock::stereo(&mut left, &mut right);
///
/// assert!(block.is_stereo());
/// let (l, r) = block.split_mut();
/// l[0] = r.map_or(0.0, |r| r[0]);
/// assert_eq!(left[0], -0.5);
/// ```
#[derive(Debug)]
pub struct AudioBlock<'a, S: Sample = f32> {
    left: &'a mut [S],
    right: Option<&'a mut [S]>,
}

impl<'a, S: Sample> AudioBlock<'a, S> {
    /// Single-channel view.
    pub fn mono(left: &'a mut [S]) -> Self {
        Self { left, right: None }
    }

    /// Two-channel view. The longer slice is truncated to the shorter length.
    pub fn stereo(left: &'a mut [S], right: &'a mut [S]) -> Self {
        let len = left.len().min(right.len());
        Self {
            left: &mut left[..len],
            right: Some(&mut right[..len]),
        }
    }

    /// View over host channel slices: one channel gives mono, two or more
    /// give stereo over the first two. `None` when there are no channels.
    pub fn from_channels<'b>(channels: &'a mut [&'b mut [S]]) -> Option<Self>
    where
        'b: 'a,
    {
        match channels {
            [] => None,
            [left] => Some(Self::mono(left)),
            [left, right, ..] => Some(Self::stereo(left, right)),
        }
    }

    /// Samples per channel.
    #[inline]
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// `true` when the block holds no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// `true` for two-channel views.
    #[inline]
    pub fn is_stereo(&self) -> bool {
        self.right.is_some()
    }

    /// 1 or 2.
    #[inline]
    pub fn num_channels(&self) -> usize {
        if self.is_stereo() { 2 } else { 1 }
    }

    /// Left (or only) channel.
    #[inline]
    pub fn left(&self) -> &[S] {
        self.left
    }

    /// Right channel, if stereo.
    #[inline]
    pub fn right(&self) -> Option<&[S]> {
        self.right.as_deref()
    }

    /// Both channels mutably at once.
    #[inline]
    pub fn split_mut(&mut self) -> (&mut [S], Option<&mut [S]>) {
        (&mut *self.left, self.right.as_deref_mut())
    }

    /// Channel `index` mutably, `None` when out of range.
    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> Option<&mut [S]> {
        match index {
            0 => Some(&mut *self.left),
            1 => self.right.as_deref_mut(),
            _ => None,
        }
    }
}

/// Owned one- or two-channel scratch buffer.
///
/// Allocates in [`resize`](Self::resize) only.
#[derive(Debug, Clone, Default)]
pub struct StereoBuffer<S: Sample = f32> {
    /// Left channel samples.
    pub left: Vec<S>,
    /// Right channel samples (unused when mono).
    pub right: Vec<S>,
    channels: usize,
}

impl<S: Sample> StereoBuffer<S> {
    /// Zeroed buffer with `channels` (clamped to 1..=2) of `block_size` samples.
    pub fn new(channels: usize, block_size: usize) -> Self {
        let mut buffer = Self::default();
        buffer.resize(channels, block_size);
        buffer
    }

    /// Reallocate and zero.
    pub fn resize(&mut self, channels: usize, block_size: usize) {
        self.channels = channels.clamp(1, 2);
        self.left.clear();
        self.left.resize(block_size, S::ZERO);
        self.right.clear();
        let right_len = if self.channels == 2 { block_size } else { 0 };
        self.right.resize(right_len, S::ZERO);
    }

    /// Number of active channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Samples per channel.
    pub fn capacity(&self) -> usize {
        self.left.len()
    }

    /// Zero all samples.
    pub fn clear(&mut self) {
        self.left.fill(S::ZERO);
        self.right.fill(S::ZERO);
    }

    /// Copy the first `len` samples of a block in. Channels missing from
    /// `block` are zeroed.
    pub fn copy_from(&mut self, block: &AudioBlock<'_, S>) {
        let len = block.len().min(self.capacity());
        self.left[..len].copy_from_slice(&block.left()[..len]);
        if self.channels == 2 {
            match block.right() {
                Some(right) => self.right[..len].copy_from_slice(&right[..len]),
                None => self.right[..len].fill(S::ZERO),
            }
        }
    }

    /// View over the first `len` samples (clamped to capacity).
    pub fn block_mut(&mut self, len: usize) -> AudioBlock<'_, S> {
        let len = len.min(self.capacity());
        if self.channels == 2 {
            AudioBlock::stereo(&mut self.left[..len], &mut self.right[..len])
        } else {
            AudioBlock::mono(&mut self.left[..len])
        }
    }
}
