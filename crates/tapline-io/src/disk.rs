//! Disk saver: render a mixer straight to a WAV file.

use std::path::Path;

use hound::{SampleFormat, WavWriter};
use tapline_core::Mixer;

use crate::{Error, Result};

/// Frames rendered per mixer call.
const BLOCK_FRAMES: usize = 1024;

/// Layout of the recorded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskFormat {
    /// Frames per second.
    pub sample_rate: u32,
    /// Interleaved channels produced by the mixer (1 or 2).
    pub channels: u16,
    /// 16 for integer PCM, 32 for IEEE float.
    pub bits_per_sample: u16,
}

impl Default for DiskFormat {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 2,
            bits_per_sample: 16,
        }
    }
}

impl From<DiskFormat> for hound::WavSpec {
    fn from(format: DiskFormat) -> Self {
        hound::WavSpec {
            channels: format.channels,
            sample_rate: format.sample_rate,
            bits_per_sample: format.bits_per_sample,
            sample_format: if format.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Pull `frames` frames from `mixer` and write them to `path`.
///
/// The mixer is told the sample rate first and stopped once the file is
/// finalised. `progress` receives the running frame count after each block.
/// Returns the number of frames written.
pub fn record_to_wav<M, P>(
    mixer: &mut M,
    path: P,
    format: DiskFormat,
    frames: u64,
    mut progress: impl FnMut(u64),
) -> Result<u64>
where
    M: Mixer + ?Sized,
    P: AsRef<Path>,
{
    if !matches!(format.bits_per_sample, 16 | 32) || !matches!(format.channels, 1 | 2) {
        return Err(Error::UnsupportedFormat(format!(
            "{}-bit x{} WAV",
            format.bits_per_sample, format.channels
        )));
    }

    let mut writer = WavWriter::create(path.as_ref(), format.into())?;
    mixer.set_sample_rate(format.sample_rate);

    let channels = usize::from(format.channels);
    let mut block = vec![0i16; BLOCK_FRAMES * channels];
    let mut written = 0u64;

    while written < frames {
        let n = (frames - written).min(BLOCK_FRAMES as u64) as usize;
        let samples = &mut block[..n * channels];
        mixer.mix(samples);

        if format.bits_per_sample == 32 {
            for &s in samples.iter() {
                writer.write_sample(f32::from(s) / 32768.0)?;
            }
        } else {
            for &s in samples.iter() {
                writer.write_sample(s)?;
            }
        }

        written += n as u64;
        progress(written);
    }

    writer.finalize()?;
    mixer.stop();

    tracing::info!(
        path = %path.as_ref().display(),
        frames = written,
        bits = format.bits_per_sample,
        "recording written"
    );
    Ok(written)
}
