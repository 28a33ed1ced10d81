//! Output device discovery via cpal.

use cpal::Device;
use cpal::traits::{DeviceTrait, HostTrait};

use crate::{Error, Result};

const FALLBACK_RATE: u32 = 44100;

/// Device name via `description()` (cpal 0.17+).
pub(crate) fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Output device information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
    /// Whether this is the host's default output.
    pub is_default: bool,
}

fn describe(device: &Device, default_name: Option<&str>) -> Option<AudioDevice> {
    let name = device_name(device).ok()?;
    let default_sample_rate = device
        .default_output_config()
        .map(|c| c.sample_rate())
        .unwrap_or(FALLBACK_RATE);
    let is_default = default_name == Some(name.as_str());
    Some(AudioDevice {
        name,
        default_sample_rate,
        is_default,
    })
}

/// List output devices on the default host.
pub fn list_output_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let default_name = host
        .default_output_device()
        .and_then(|d| device_name(&d).ok());

    let devices = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?;

    Ok(devices
        .filter_map(|d| describe(&d, default_name.as_deref()))
        .collect())
}

/// The default host's default output device.
pub fn default_output_device() -> Result<Option<AudioDevice>> {
    let host = cpal::default_host();
    Ok(host.default_output_device().and_then(|d| {
        describe(&d, None).map(|mut dev| {
            dev.is_default = true;
            dev
        })
    }))
}

/// Pick a device by index, exact name, or unique case-insensitive substring.
pub fn select_device<'a>(devices: &'a [AudioDevice], query: &str) -> Result<&'a AudioDevice> {
    if let Ok(index) = query.parse::<usize>() {
        return devices.get(index).ok_or_else(|| {
            Error::DeviceNotFound(format!(
                "output device index {} (only {} devices available)",
                index,
                devices.len()
            ))
        });
    }

    if let Some(exact) = devices.iter().find(|d| d.name == query) {
        return Ok(exact);
    }

    let needle = query.to_lowercase();
    let matches: Vec<_> = devices
        .iter()
        .filter(|d| d.name.to_lowercase().contains(&needle))
        .collect();

    match matches.as_slice() {
        [] => Err(Error::DeviceNotFound(format!(
            "no output device matching '{}'",
            query
        ))),
        [one] => Ok(one),
        many => Err(Error::DeviceNotFound(format!(
            "'{}' is ambiguous: {}",
            query,
            many.iter()
                .map(|d| d.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}
