//! cpal-based output backend.
//!
//! [`CpalBackend`] opens `f32` output streams on the platform's default host
//! (ALSA, CoreAudio, WASAPI).
//!
//! ```rust,ignore
//! use tapline_io::{AudioBackend, BackendStreamConfig, CpalBackend};
//!
//! let backend = CpalBackend::new();
//! let stream = backend.build_output_stream(
//!     &BackendStreamConfig::default(),
//!     Box::new(|buffer: &mut [f32]| buffer.fill(0.0)),
//!     Box::new(|err| eprintln!("audio error: {}", err)),
//! )?;
//! // Plays until `stream` is dropped.
//! ```

use cpal::Host;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::backend::{AudioBackend, BackendStreamConfig, ErrorCallback, OutputCallback, StreamHandle};
use crate::devices::device_name;
use crate::{AudioDevice, Error, Result};

/// cpal output backend on the default host.
pub struct CpalBackend {
    host: Host,
}

impl CpalBackend {
    /// Connect to the platform's default audio host.
    pub fn new() -> Self {
        let host = cpal::default_host();
        tracing::info!(host = host.id().name(), "cpal backend initialized");
        Self { host }
    }

    /// Output device named `name`, or the default.
    ///
    /// An exact name wins; otherwise the first case-insensitive substring match.
    fn find_output_device(&self, name: Option<&str>) -> Result<cpal::Device> {
        let Some(search) = name else {
            return self.host.default_output_device().ok_or(Error::NoDevice);
        };

        let mut devices: Vec<(String, cpal::Device)> = self
            .host
            .output_devices()
            .map_err(|e| Error::Stream(e.to_string()))?
            .filter_map(|d| device_name(&d).ok().map(|n| (n, d)))
            .collect();
        let names: Vec<&str> = devices.iter().map(|(n, _)| n.as_str()).collect();
        match match_device_name(&names, search) {
            Some(index) => Ok(devices.swap_remove(index).1),
            None => Err(Error::DeviceNotFound(format!(
                "no output device matching '{}'",
                search
            ))),
        }
    }
}

/// Index of the device `search` refers to: exact name first, then the first
/// case-insensitive substring match.
fn match_device_name(names: &[&str], search: &str) -> Option<usize> {
    if let Some(exact) = names.iter().position(|&n| n == search) {
        return Some(exact);
    }
    let needle = search.to_lowercase();
    names
        .iter()
        .position(|n| n.to_lowercase().contains(needle.as_str()))
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for CpalBackend {
    fn name(&self) -> &'static str {
        "cpal"
    }

    fn list_devices(&self) -> Result<Vec<AudioDevice>> {
        crate::devices::list_output_devices()
    }

    fn default_output_device(&self) -> Result<Option<AudioDevice>> {
        crate::devices::default_output_device()
    }

    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        mut callback: OutputCallback,
        mut error_callback: ErrorCallback,
    ) -> Result<StreamHandle> {
        let device = self.find_output_device(config.device_name.as_deref())?;

        let stream_config = cpal::StreamConfig {
            channels: config.channels,
            sample_rate: config.sample_rate,
            buffer_size: cpal::BufferSize::Fixed(config.buffer_size),
        };

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    callback(data);
                },
                move |err| {
                    error_callback(&err.to_string());
                },
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(
            channels = config.channels,
            sample_rate = config.sample_rate,
            buffer_frames = config.buffer_size,
            "output stream started"
        );

        Ok(StreamHandle::new(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpal_backend_name() {
        let backend = CpalBackend::new();
        assert_eq!(backend.name(), "cpal");
    }

    #[test]
    fn test_exact_name_beats_earlier_substring() {
        let names = ["sysdefault:CARD=PCH", "default", "hdmi:CARD=HDMI"];
        assert_eq!(match_device_name(&names, "default"), Some(1));
    }

    #[test]
    fn test_substring_fallback_is_case_insensitive() {
        let names = ["Built-in Output", "USB Audio"];
        assert_eq!(match_device_name(&names, "usb"), Some(1));
        assert_eq!(match_device_name(&names, "hdmi"), None);
    }

    #[test]
    fn test_cpal_backend_list_devices() {
        let backend = CpalBackend::new();
        // Availability depends on the machine; only the call must not fail hard.
        let _ = backend.list_devices();
    }
}
