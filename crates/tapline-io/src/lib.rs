//! Audio output layer for tapline.
//!
//! This crate provides:
//!
//! - **Output adaptation**: [`OutputAdapter`] turns a 16-bit [`Mixer`] into
//!   the interleaved `f32` stereo blocks an audio device asks for, folding
//!   the volume into the normalisation divisor
//! - **Playback**: [`Player`] drives an adapter from an [`AudioBackend`]
//!   stream with a synchronous stop
//! - **Backends**: [`CpalBackend`] for real devices, device listing via
//!   [`list_output_devices`]
//! - **WAV**: [`WavSource`] for playing files, [`record_to_wav`] for
//!   rendering a mixer to disk
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tapline_core::{ChannelLayout, DspMixer, SharedParam};
//! use tapline_effects::{ReverbStage, reverb_amount_param};
//! use tapline_io::{BackendStreamConfig, CpalBackend, OutputAdapter, Player, WavSource};
//!
//! let reverb = Arc::new(reverb_amount_param());
//! let volume = Arc::new(tapline_io::volume_param());
//!
//! let source = WavSource::open("song.wav")?;
//! let stage = ReverbStage::new(44100, Arc::clone(&reverb));
//! let mixer = DspMixer::new(source, stage, ChannelLayout::Stereo, 2048);
//!
//! let mut player = Player::new(OutputAdapter::new(mixer, volume), BackendStreamConfig::default());
//! player.start_playing(&CpalBackend::new())?;
//! reverb.set(8);
//! // ...
//! player.stop_playing();
//! ```
//!
//! [`Mixer`]: tapline_core::Mixer

pub mod adapter;
pub mod backend;
pub mod cpal_backend;
mod devices;
mod disk;
mod format;
mod player;
mod wav;

pub use adapter::{OutputAdapter, UNITY_VOLUME, volume_param};
pub use backend::{AudioBackend, BackendStreamConfig, ErrorCallback, OutputCallback, StreamHandle};
pub use cpal_backend::CpalBackend;
pub use devices::{AudioDevice, default_output_device, list_output_devices, select_device};
pub use disk::{DiskFormat, record_to_wav};
pub use format::{OutputFormat, SampleFormat};
pub use player::Player;
pub use wav::{WavEncoding, WavInfo, WavSource, read_wav_info};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested output format is not supported.
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// A buffer could not be allocated.
    #[error("Failed to allocate {samples} sample buffer")]
    Allocation {
        /// Number of samples requested.
        samples: usize,
    },
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
