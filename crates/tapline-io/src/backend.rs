//! Pluggable audio output backend.
//!
//! [`AudioBackend`] keeps the playback pipeline independent of the platform
//! audio API. [`CpalBackend`](crate::CpalBackend) drives real devices; tests
//! drive [`Player`](crate::Player) from a plain thread.
//!
//! ```text
//! Player ──OutputCallback──▶ AudioBackend ──▶ device
//!    ▲                            │
//!    └──────── StreamHandle ◀─────┘   (drop = stream stopped)
//! ```
//!
//! Callbacks are boxed so the trait stays object safe, and the stream handle
//! is type-erased so backend types never reach application code.

use crate::{AudioDevice, Result};

/// Configuration for opening an output stream.
#[derive(Debug, Clone)]
pub struct BackendStreamConfig {
    /// Requested sample rate in Hz.
    pub sample_rate: u32,
    /// Preferred buffer size in frames.
    pub buffer_size: u32,
    /// Number of interleaved channels.
    pub channels: u16,
    /// Optional device name filter (system default if `None`).
    pub device_name: Option<String>,
}

impl Default for BackendStreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            buffer_size: 1024,
            channels: 2,
            device_name: None,
        }
    }
}

/// Type-erased audio stream handle.
///
/// The stream runs while this handle exists. Dropping it must stop the
/// stream and return only once the backend will no longer invoke the
/// output callback.
pub struct StreamHandle {
    _inner: Box<dyn Send>,
}

impl StreamHandle {
    /// Wrap a backend-specific stream object.
    pub fn new<T: Send + 'static>(stream: T) -> Self {
        Self {
            _inner: Box::new(stream),
        }
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle").finish_non_exhaustive()
    }
}

/// Output callback, run on the audio thread.
///
/// Receives interleaved `f32` samples `[L0, R0, L1, R1, ...]` to fill.
pub type OutputCallback = Box<dyn FnMut(&mut [f32]) + Send>;

/// Called with a message when the stream reports an error.
pub type ErrorCallback = Box<dyn FnMut(&str) + Send>;

/// Platform audio output.
pub trait AudioBackend: Send {
    /// Short backend name (e.g. "cpal").
    fn name(&self) -> &str;

    /// All output devices.
    fn list_devices(&self) -> Result<Vec<AudioDevice>>;

    /// The system default output device, if any.
    fn default_output_device(&self) -> Result<Option<AudioDevice>>;

    /// Open and start an output stream.
    ///
    /// The returned [`StreamHandle`] keeps the stream alive.
    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        callback: OutputCallback,
        error_callback: ErrorCallback,
    ) -> Result<StreamHandle>;

    /// Rate the backend will actually run `config` at.
    fn actual_sample_rate(&self, config: &BackendStreamConfig) -> u32 {
        config.sample_rate
    }
}
