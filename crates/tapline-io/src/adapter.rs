//! Float output adapter.
//!
//! Audio devices pull interleaved `f32` stereo; the mixer produces `i16`.
//! [`OutputAdapter`] sits between them on the audio thread:
//!
//! 1. skip the block if the negotiated format is not `f32` stereo
//! 2. `count = min(scratch capacity, dest.len())`
//! 3. the mixer fills `scratch[..count]`
//! 4. `dest[i] = scratch[i] / (32768 * 256 / volume)`
//!
//! The volume lives in the divisor: at [`UNITY_VOLUME`] the divisor is
//! exactly `32768.0`, the plain 16-bit normalisation. A volume of zero emits
//! explicit silence instead of dividing by an infinite divisor. Entries of
//! `dest` past `count` are left untouched.
//!
//! The scratch buffer is sized by [`OutputAdapter::negotiate`] and only
//! reallocated when the negotiated size changes.

use std::sync::Arc;

use tapline_core::{Mixer, SharedParam};

use crate::format::OutputFormat;
use crate::{Error, Result};

/// Volume giving a divisor of exactly `32768.0`.
pub const UNITY_VOLUME: i16 = 256;

/// Build the shared volume parameter: default [`UNITY_VOLUME`], any `i16`.
pub fn volume_param() -> SharedParam {
    SharedParam::new(
        i32::from(UNITY_VOLUME),
        i32::from(i16::MIN),
        i32::from(i16::MAX),
    )
}

/// Bridges a 16-bit [`Mixer`] to a float device buffer.
pub struct OutputAdapter<M> {
    mixer: M,
    format: Option<OutputFormat>,
    scratch: Vec<i16>,
    volume: Arc<SharedParam>,
}

impl<M: Mixer> OutputAdapter<M> {
    /// Wrap `mixer`, reading the gain from `volume` on every render.
    ///
    /// Nothing renders until [`negotiate`](Self::negotiate) succeeds.
    pub fn new(mixer: M, volume: Arc<SharedParam>) -> Self {
        Self {
            mixer,
            format: None,
            scratch: Vec::new(),
            volume,
        }
    }

    /// Record the device format and size the scratch buffer for
    /// `buffer_frames` frames.
    ///
    /// An unsupported format is recorded (so renders skip) and reported as
    /// [`Error::UnsupportedFormat`]. The mixer is told the sample rate.
    pub fn negotiate(&mut self, format: OutputFormat, buffer_frames: usize) -> Result<()> {
        self.format = Some(format);
        if !format.is_supported() {
            return Err(Error::UnsupportedFormat(format.to_string()));
        }

        let samples = buffer_frames * usize::from(format.channels);
        if samples != self.scratch.len() {
            let mut scratch = Vec::new();
            if scratch.try_reserve_exact(samples).is_err() {
                self.scratch = Vec::new();
                return Err(Error::Allocation { samples });
            }
            scratch.resize(samples, 0);
            self.scratch = scratch;
        }

        self.mixer.set_sample_rate(format.sample_rate);
        tracing::debug!(%format, buffer_frames, "output format negotiated");
        Ok(())
    }

    /// Fill up to `min(capacity, dest.len())` samples of `dest`.
    ///
    /// Real-time safe: no allocation, no locking.
    pub fn render(&mut self, dest: &mut [f32]) {
        if !self.format.is_some_and(|f| f.is_supported()) {
            return;
        }

        let count = self.scratch.len().min(dest.len());
        if count == 0 {
            return;
        }
        let scratch = &mut self.scratch[..count];
        self.mixer.mix(scratch);

        let dest = &mut dest[..count];
        let volume = self.volume.get();
        if volume == 0 {
            dest.fill(0.0);
            return;
        }

        let scale = 32768.0f32 * 256.0 / volume as f32;
        for (d, &s) in dest.iter_mut().zip(scratch.iter()) {
            *d = f32::from(s) / scale;
        }
    }

    /// Set the gain numerator; applies from the next render.
    pub fn set_volume(&self, volume: i16) {
        self.volume.set(i32::from(volume));
    }

    /// Current gain numerator.
    pub fn volume(&self) -> i16 {
        self.volume.get() as i16
    }

    /// Samples rendered per call at most.
    pub fn capacity(&self) -> usize {
        self.scratch.len()
    }

    /// The wrapped mixer.
    pub fn mixer(&self) -> &M {
        &self.mixer
    }

    /// Tell the mixer playback has stopped.
    pub fn stop(&mut self) {
        self.mixer.stop();
    }
}
