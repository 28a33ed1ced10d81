//! Integer mixing front end.
//!
//! The output device pulls 16-bit blocks through the [`Mixer`] contract:
//! fill exactly `out.len()` samples, never block. [`DspMixer`] is the usual
//! implementation: a [`SampleSource`] sums into a 32-bit accumulator, a
//! [`DspStage`] runs over the accumulator in place, and the result is
//! saturated to `i16`.
//!
//! ```text
//! source ──accumulate──▶ [i32; n] ──DspStage──▶ [i32; n] ──clip16──▶ [i16; n]
//! ```
//!
//! The accumulator is allocated once by [`DspMixer::new`] and requests
//! larger than it are served in chunks, so [`Mixer::mix`] never allocates.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;

use crate::dsp::{ChannelLayout, DspStage, clip16};

/// Producer of 16-bit PCM blocks for an output device.
///
/// ## Contract
///
/// `mix` must write every entry of `out` (interleaved when the stream is
/// stereo) and must not block or allocate.
pub trait Mixer: Send {
    /// Fill `out` with the next `out.len()` samples.
    fn mix(&mut self, out: &mut [i16]);

    /// Called once the output sample rate is known.
    fn set_sample_rate(&mut self, _sample_rate: u32) {}

    /// Release any state held for playback.
    fn stop(&mut self) {}
}

impl<M: Mixer + ?Sized> Mixer for Box<M> {
    fn mix(&mut self, out: &mut [i16]) {
        (**self).mix(out);
    }

    fn set_sample_rate(&mut self, sample_rate: u32) {
        (**self).set_sample_rate(sample_rate);
    }

    fn stop(&mut self) {
        (**self).stop();
    }
}

/// Anything that adds PCM into a mixing accumulator.
///
/// Sources add (`+=`) rather than overwrite so several can share one
/// accumulator. Values are in 16-bit scale; headroom comes from `i32`.
pub trait SampleSource: Send {
    /// Add the next `acc.len()` samples of `layout` audio into `acc`.
    fn accumulate(&mut self, acc: &mut [i32], layout: ChannelLayout);

    /// Called once the output sample rate is known.
    fn set_sample_rate(&mut self, _sample_rate: u32) {}

    /// Whether the source has nothing more to play.
    fn is_finished(&self) -> bool {
        false
    }
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn accumulate(&mut self, acc: &mut [i32], layout: ChannelLayout) {
        (**self).accumulate(acc, layout);
    }

    fn set_sample_rate(&mut self, sample_rate: u32) {
        (**self).set_sample_rate(sample_rate);
    }

    fn is_finished(&self) -> bool {
        (**self).is_finished()
    }
}

/// Source → DSP stage → 16-bit clip.
pub struct DspMixer<S, D> {
    source: S,
    stage: D,
    layout: ChannelLayout,
    accumulator: Vec<i32>,
}

impl<S: SampleSource, D: DspStage> DspMixer<S, D> {
    /// Build a mixer whose accumulator holds up to `chunk_samples` samples.
    ///
    /// The chunk is rounded down to whole frames and is at least one frame.
    pub fn new(source: S, stage: D, layout: ChannelLayout, chunk_samples: usize) -> Self {
        let channels = layout.channels();
        let chunk = (chunk_samples / channels).max(1) * channels;
        Self {
            source,
            stage,
            layout,
            accumulator: vec![0; chunk],
        }
    }

    /// Channel layout of the produced PCM.
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    /// Samples processed per DSP invocation.
    pub fn chunk_samples(&self) -> usize {
        self.accumulator.len()
    }

    /// The wrapped source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The wrapped DSP stage.
    pub fn stage(&self) -> &D {
        &self.stage
    }

    /// Whether the source has finished.
    pub fn is_finished(&self) -> bool {
        self.source.is_finished()
    }
}

impl<S: SampleSource, D: DspStage> Mixer for DspMixer<S, D> {
    fn mix(&mut self, out: &mut [i16]) {
        let chunk = self.accumulator.len();
        for block in out.chunks_mut(chunk) {
            let acc = &mut self.accumulator[..block.len()];
            acc.fill(0);
            self.source.accumulate(acc, self.layout);
            let frames = self.layout.frames(acc.len());
            self.stage.process(acc, frames, self.layout);
            for (o, &a) in block.iter_mut().zip(acc.iter()) {
                *o = clip16(a);
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: u32) {
        self.source.set_sample_rate(sample_rate);
        self.stage.set_sample_rate(sample_rate);
    }

    fn stop(&mut self) {
        self.stage.reset();
    }
}
