//! WAV file playback source.

use std::path::Path;

use hound::{SampleFormat, WavReader};
use tapline_core::{ChannelLayout, SampleSource};

use crate::Result;

/// WAV encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavEncoding {
    /// Linear PCM (integer samples).
    Pcm,
    /// IEEE 754 floating-point samples.
    IeeeFloat,
}

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Total number of frames.
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Sample encoding.
    pub encoding: WavEncoding,
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let num_frames = u64::from(reader.len()) / u64::from(spec.channels.max(1));

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs: num_frames as f64 / f64::from(spec.sample_rate.max(1)),
        encoding: match spec.sample_format {
            SampleFormat::Float => WavEncoding::IeeeFloat,
            SampleFormat::Int => WavEncoding::Pcm,
        },
    })
}

/// A WAV file decoded to 16-bit stereo frames in memory.
///
/// Mono files are duplicated to both channels; files with more than two
/// channels keep the first two. When mixed into a mono accumulator the two
/// channels are averaged. The file's own sample rate is reported by
/// [`sample_rate`](Self::sample_rate) and is not resampled.
#[derive(Debug, Clone)]
pub struct WavSource {
    frames: Vec<[i16; 2]>,
    sample_rate: u32,
    position: usize,
    looping: bool,
}

impl WavSource {
    /// Load and decode `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = WavReader::open(path.as_ref())?;
        let spec = reader.spec();
        let channels = usize::from(spec.channels.max(1));

        let samples: Vec<i16> = match spec.sample_format {
            SampleFormat::Float => reader
                .into_samples::<f32>()
                .map(|s| s.map(|v| (v * 32768.0).clamp(-32768.0, 32767.0) as i16))
                .collect::<std::result::Result<_, _>>()?,
            SampleFormat::Int => {
                let shift = i32::from(spec.bits_per_sample) - 16;
                reader
                    .into_samples::<i32>()
                    .map(|s| {
                        s.map(|v| {
                            let v = if shift >= 0 { v >> shift } else { v << -shift };
                            tapline_core::clip16(v)
                        })
                    })
                    .collect::<std::result::Result<_, _>>()?
            }
        };

        let frames = samples
            .chunks_exact(channels)
            .map(|frame| {
                if channels == 1 {
                    [frame[0], frame[0]]
                } else {
                    [frame[0], frame[1]]
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            path = %path.as_ref().display(),
            frames = frames.len(),
            sample_rate = spec.sample_rate,
            "wav source loaded"
        );

        Ok(Self {
            frames,
            sample_rate: spec.sample_rate,
            position: 0,
            looping: false,
        })
    }

    /// Build a source from already decoded stereo frames.
    pub fn from_frames(frames: Vec<[i16; 2]>, sample_rate: u32) -> Self {
        Self {
            frames,
            sample_rate,
            position: 0,
            looping: false,
        }
    }

    /// Restart from the beginning when the end is reached.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Sample rate of the file.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length in frames.
    pub fn len_frames(&self) -> usize {
        self.frames.len()
    }

    fn next_frame(&mut self) -> Option<[i16; 2]> {
        if self.position >= self.frames.len() {
            if !self.looping || self.frames.is_empty() {
                return None;
            }
            self.position = 0;
        }
        let frame = self.frames[self.position];
        self.position += 1;
        Some(frame)
    }
}

impl SampleSource for WavSource {
    fn accumulate(&mut self, acc: &mut [i32], layout: ChannelLayout) {
        for slot in acc.chunks_exact_mut(layout.channels()) {
            let Some([l, r]) = self.next_frame() else {
                return;
            };
            match slot {
                [mono] => *mono += (i32::from(l) + i32::from(r)) >> 1,
                [left, right] => {
                    *left += i32::from(l);
                    *right += i32::from(r);
                }
                _ => {}
            }
        }
    }

    fn is_finished(&self) -> bool {
        !self.looping && self.position >= self.frames.len()
    }
}
