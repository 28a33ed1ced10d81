//! Accumulator-domain processing.
//!
//! A [`DspStage`] is handed the mixer's 32-bit accumulator after the sources
//! have been summed and before the result is clipped to 16 bits. Stages work
//! in place and must not allocate once their state is prepared.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::boxed::Box;

/// Channel arrangement of an accumulator or PCM block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChannelLayout {
    /// One sample per frame.
    Mono,
    /// Two samples per frame, interleaved `[L, R]`.
    #[default]
    Stereo,
}

impl ChannelLayout {
    /// Layout for a stereo flag as passed by DSP hosts.
    pub const fn from_stereo(is_stereo: bool) -> Self {
        if is_stereo { Self::Stereo } else { Self::Mono }
    }

    /// Number of samples per frame.
    pub const fn channels(self) -> usize {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
        }
    }

    /// Whether frames are interleaved stereo.
    pub const fn is_stereo(self) -> bool {
        matches!(self, Self::Stereo)
    }

    /// Number of whole frames contained in `samples` samples.
    pub const fn frames(self, samples: usize) -> usize {
        samples / self.channels()
    }
}

/// In-place processor over a block of accumulator samples.
///
/// `frames` counts frames, not samples: a stereo block of `frames` frames
/// spans `2 * frames` entries of `buffer`. Implementations process at most
/// `min(frames, buffer.len() / channels)` frames.
///
/// ## Real-Time Safety
///
/// `process` runs on the audio thread. It must not block and must not
/// allocate except on the cold transitions the implementation documents.
pub trait DspStage: Send {
    /// Process `frames` frames of `buffer` in place.
    fn process(&mut self, buffer: &mut [i32], frames: usize, layout: ChannelLayout);

    /// Notify the stage of the negotiated output sample rate.
    fn set_sample_rate(&mut self, _sample_rate: u32) {}

    /// Drop all internal state (echo tails, histories).
    fn reset(&mut self);
}

/// The empty stage passes the accumulator through untouched.
impl DspStage for () {
    fn process(&mut self, _buffer: &mut [i32], _frames: usize, _layout: ChannelLayout) {}

    fn reset(&mut self) {}
}

impl<D: DspStage + ?Sized> DspStage for Box<D> {
    fn process(&mut self, buffer: &mut [i32], frames: usize, layout: ChannelLayout) {
        (**self).process(buffer, frames, layout);
    }

    fn set_sample_rate(&mut self, sample_rate: u32) {
        (**self).set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}

/// Saturate an accumulator sample to 16-bit PCM.
#[inline]
pub fn clip16(sample: i32) -> i16 {
    sample.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}
