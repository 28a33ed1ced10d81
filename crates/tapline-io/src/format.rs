//! Negotiated device output format.

use std::fmt;

/// Sample encoding of a device buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// Normalised 32-bit float in `[-1.0, 1.0)`.
    F32,
    /// Signed 16-bit integer.
    I16,
}

/// Format agreed with the audio device when the stream is opened.
///
/// The adapter renders only interleaved `f32` with two channels; any other
/// combination is accepted for negotiation but renders nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFormat {
    /// Sample encoding.
    pub sample_format: SampleFormat,
    /// Interleaved channel count.
    pub channels: u16,
    /// Frames per second.
    pub sample_rate: u32,
}

impl OutputFormat {
    /// Channel count the adapter renders.
    pub const CHANNELS: u16 = 2;

    /// The one format the adapter renders: `f32`, stereo, at `sample_rate`.
    pub const fn float_stereo(sample_rate: u32) -> Self {
        Self {
            sample_format: SampleFormat::F32,
            channels: Self::CHANNELS,
            sample_rate,
        }
    }

    /// Whether the adapter can render this format.
    pub fn is_supported(&self) -> bool {
        self.sample_format == SampleFormat::F32 && self.channels == Self::CHANNELS
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let enc = match self.sample_format {
            SampleFormat::F32 => "f32",
            SampleFormat::I16 => "i16",
        };
        write!(f, "{} x{} @ {} Hz", enc, self.channels, self.sample_rate)
    }
}
